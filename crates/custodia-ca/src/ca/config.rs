//! CA配置管理
//!
//! 提供CA配置结构和默认值管理

use serde::{Deserialize, Serialize};

/// CA配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaConfig {
    /// CA名称
    pub name: String,
    /// 国家
    pub country: String,
    /// 省/州
    pub state: String,
    /// 城市
    pub locality: String,
    /// 组织
    pub organization: String,
    /// 组织单位
    pub organizational_unit: Option<String>,
    /// CA证书有效期（天）
    pub validity_days: u32,
    /// 单张签发证书允许的最大有效期（天）
    pub max_cert_validity_days: u32,
    /// 下次CRL更新的缓冲时间（小时）
    pub crl_next_update_hours: u32,
}

impl Default for CaConfig {
    fn default() -> Self {
        Self {
            name: "Custodia Root CA".to_string(),
            country: "US".to_string(),
            state: "California".to_string(),
            locality: "San Francisco".to_string(),
            organization: "Custodia PKI".to_string(),
            organizational_unit: Some("Certificate Authority".to_string()),
            validity_days: 3650,         // 10年
            max_cert_validity_days: 825, // 约27个月
            crl_next_update_hours: 24,   // CRL刷新窗口1天
        }
    }
}

impl CaConfig {
    /// 创建根CA配置
    pub fn root_ca(name: &str, organization: &str) -> Self {
        Self {
            name: name.to_string(),
            organization: organization.to_string(),
            ..Default::default()
        }
    }

    /// 设置地理位置信息
    pub fn with_location(mut self, country: &str, state: &str, locality: &str) -> Self {
        self.country = country.to_string();
        self.state = state.to_string();
        self.locality = locality.to_string();
        self
    }

    /// 设置组织单位
    pub fn with_organizational_unit(mut self, ou: &str) -> Self {
        self.organizational_unit = Some(ou.to_string());
        self
    }

    /// 设置有效期
    pub fn with_validity(mut self, ca_days: u32, max_cert_days: u32) -> Self {
        self.validity_days = ca_days;
        self.max_cert_validity_days = max_cert_days;
        self
    }

    /// 设置CRL刷新窗口
    pub fn with_crl_refresh_window(mut self, hours: u32) -> Self {
        self.crl_next_update_hours = hours;
        self
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("CA name cannot be empty".to_string());
        }

        if self.organization.is_empty() {
            return Err("Organization cannot be empty".to_string());
        }

        if self.country.is_empty() {
            return Err("Country cannot be empty".to_string());
        }

        if self.validity_days == 0 {
            return Err("CA validity days must be greater than 0".to_string());
        }

        if self.max_cert_validity_days == 0 {
            return Err("Maximum certificate validity days must be greater than 0".to_string());
        }

        if self.validity_days < self.max_cert_validity_days {
            return Err(
                "CA validity must be longer than the maximum certificate validity".to_string(),
            );
        }

        if self.crl_next_update_hours == 0 {
            return Err("CRL refresh window must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.name, "Custodia Root CA");
        assert_eq!(config.organization, "Custodia PKI");
    }

    #[test]
    fn test_config_validation() {
        let mut config = CaConfig::default();

        // 测试空名称
        config.name = String::new();
        assert!(config.validate().is_err());

        // 测试有效期问题
        config.name = "Test CA".to_string();
        config.validity_days = 30;
        config.max_cert_validity_days = 365;
        assert!(config.validate().is_err());

        // 测试CRL窗口
        config.validity_days = 3650;
        config.max_cert_validity_days = 365;
        config.crl_next_update_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fluent_builder() {
        let config = CaConfig::root_ca("Custom CA", "Custom Org")
            .with_location("DE", "Berlin", "Berlin")
            .with_organizational_unit("Security")
            .with_validity(1825, 90)
            .with_crl_refresh_window(12);

        assert!(config.validate().is_ok());
        assert_eq!(config.name, "Custom CA");
        assert_eq!(config.country, "DE");
        assert_eq!(config.max_cert_validity_days, 90);
        assert_eq!(config.crl_next_update_hours, 12);
    }
}
