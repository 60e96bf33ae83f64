//! End-to-end certificate lifecycle tests
//!
//! Exercises the issuance, revocation, CRL and status paths together,
//! including the concurrency guarantees of the store contract.

use std::{
    collections::HashSet,
    sync::{Arc, Barrier},
    thread,
};

use custodia_ca::{
    build_crl, certificate_detail, issue, list_audit_events, parse_certificate, resolve_status,
    revoke, CaConfig, CaContext, CaError, CertificateState, CertificateStatus, CertificateStore,
    IssueRequest, MemoryCertificateStore,
};
use custodia_key::MemoryKeyCustody;
use x509_cert::der::Decode;

fn test_context() -> CaContext {
    let custody = Arc::new(MemoryKeyCustody::new());
    let config = CaConfig::root_ca("Lifecycle Test CA", "Lifecycle Org")
        .with_location("US", "California", "San Francisco");
    CaContext::initialize(custody, config).unwrap()
}

fn request(cn: &str, validity_days: u32) -> IssueRequest {
    IssueRequest {
        common_name: cn.to_string(),
        organization: "Lifecycle Org".to_string(),
        country: "US".to_string(),
        validity_days,
    }
}

/// Extract the set of revoked serial numbers from a PEM-encoded CRL
fn revoked_serials(crl_pem: &str) -> HashSet<String> {
    let block = pem::parse(crl_pem).unwrap();
    let crl = x509_cert::crl::CertificateList::from_der(block.contents()).unwrap();

    crl.tbs_cert_list
        .revoked_certificates
        .unwrap_or_default()
        .iter()
        .map(|revoked| hex::encode(revoked.serial_number.as_bytes()))
        .collect()
}

#[test]
fn issued_certificate_has_ca_issuer_and_valid_window() {
    let ctx = test_context();
    let store = MemoryCertificateStore::new();

    let issued = issue(&ctx, &store, &request("issuer.example", 30)).unwrap();
    let summary = parse_certificate(issued.certificate_pem.as_bytes()).unwrap();

    assert!(summary.not_before < summary.not_after);
    assert!(!summary.is_ca);
    assert_eq!(summary.serial_number, issued.serial_number);

    // The leaf issuer is the CA subject
    let ca_summary = parse_certificate(ctx.certificate_pem().as_bytes()).unwrap();
    assert_eq!(summary.issuer, ca_summary.subject);
    assert!(summary.issuer.contains("Lifecycle Test CA"));
}

#[test]
fn serial_numbers_are_unique_across_issuances() {
    let ctx = test_context();
    let store = MemoryCertificateStore::new();

    let mut serials = HashSet::new();
    for i in 0 .. 32 {
        let issued = issue(&ctx, &store, &request(&format!("host{i}.example"), 30)).unwrap();
        assert!(serials.insert(issued.serial_number));
    }
}

#[test]
fn full_lifecycle_example() {
    let ctx = test_context();
    let store = MemoryCertificateStore::new();

    // issue CN="test.example" validity_days=30 → serial S
    let issued = issue(&ctx, &store, &request("test.example", 30)).unwrap();
    let serial = issued.serial_number.clone();
    assert_eq!(
        resolve_status(&store, &serial).unwrap(),
        CertificateStatus::Good
    );

    // revoke(S, "keyCompromise") → REVOKED
    let receipt = revoke(&ctx, &store, &serial, "keyCompromise").unwrap();
    assert_eq!(receipt.state, CertificateState::Revoked);

    // status(S) → REVOKED with the recorded reason and timestamp
    match resolve_status(&store, &serial).unwrap() {
        CertificateStatus::Revoked { revoked_at, reason } => {
            assert_eq!(reason, "keyCompromise");
            assert_eq!(revoked_at, receipt.revoked_at);
        }
        other => panic!("expected revoked, got {other:?}"),
    }

    // get_crl() → PEM list containing serial S
    let crl_pem = build_crl(&ctx, &store).unwrap();
    assert!(revoked_serials(&crl_pem).contains(&serial));

    // detail reflects the revocation
    let detail = certificate_detail(&store, &serial).unwrap();
    assert_eq!(detail.state, CertificateState::Revoked);
    assert_eq!(detail.revoked_at, Some(receipt.revoked_at));
}

#[test]
fn crl_contains_exactly_the_revoked_set() {
    let ctx = test_context();
    let store = MemoryCertificateStore::new();

    let mut all = Vec::new();
    for i in 0 .. 6 {
        all.push(
            issue(&ctx, &store, &request(&format!("node{i}.example"), 30))
                .unwrap()
                .serial_number,
        );
    }

    let revoked: HashSet<String> = all.iter().take(3).cloned().collect();
    for serial in &revoked {
        revoke(&ctx, &store, serial, "cessationOfOperation").unwrap();
    }

    let from_crl = revoked_serials(&build_crl(&ctx, &store).unwrap());
    assert_eq!(from_crl, revoked);

    // Repeated generation over an unchanged revocation set yields the
    // same revoked-serial set
    let again = revoked_serials(&build_crl(&ctx, &store).unwrap());
    assert_eq!(again, revoked);
}

#[test]
fn status_of_unknown_serial_is_unknown() {
    let store = MemoryCertificateStore::new();
    assert_eq!(
        resolve_status(&store, "0123456789abcdef").unwrap(),
        CertificateStatus::Unknown
    );
}

#[test]
fn concurrent_revocations_are_linearizable() {
    const WORKERS: usize = 8;

    let ctx = Arc::new(test_context());
    let store = Arc::new(MemoryCertificateStore::new());
    let serial = issue(&ctx, &*store, &request("contended.example", 30))
        .unwrap()
        .serial_number;

    let barrier = Arc::new(Barrier::new(WORKERS));
    let handles: Vec<_> = (0 .. WORKERS)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            let store = Arc::clone(&store);
            let serial = serial.clone();
            let barrier = Arc::clone(&barrier);

            thread::spawn(move || {
                barrier.wait();
                revoke(&ctx, &*store, &serial, "keyCompromise")
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let already_revoked = results
        .iter()
        .filter(|r| matches!(r, Err(CaError::AlreadyRevoked(_))))
        .count();

    // Exactly one caller observes the transition; the rest see AlreadyRevoked
    assert_eq!(successes, 1);
    assert_eq!(already_revoked, WORKERS - 1);

    // Exactly one revocation entry exists afterwards
    assert_eq!(revoked_serials(&build_crl(&ctx, &*store).unwrap()).len(), 1);
}

#[test]
fn audit_trail_covers_issuance_and_revocation() {
    let ctx = test_context();
    let store = MemoryCertificateStore::new();

    let serial = issue(&ctx, &store, &request("audited.example", 30))
        .unwrap()
        .serial_number;
    revoke(&ctx, &store, &serial, "superseded").unwrap();
    let _ = revoke(&ctx, &store, "ffffffffffffffff", "superseded");

    let events = list_audit_events(&store, 10).unwrap();
    assert_eq!(events.len(), 3);

    // Newest first: failed revoke, successful revoke, successful issue
    assert!(!events[0].success);
    assert!(events[1].success);
    assert!(events[2].success);
    assert!(events.iter().all(|e| e.actor == "Lifecycle Test CA"));

    let limited = list_audit_events(&store, 1).unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].target, "ffffffffffffffff");
}

#[test]
fn revoked_leaf_keys_remain_in_custody() {
    let ctx = test_context();
    let store = MemoryCertificateStore::new();

    let serial = issue(&ctx, &store, &request("escrow.example", 30))
        .unwrap()
        .serial_number;
    revoke(&ctx, &store, &serial, "keyCompromise").unwrap();

    // Key escrow: the leaf key stays behind custody even after revocation
    let record = store.find_by_serial(&serial).unwrap().unwrap();
    assert!(ctx.custody().contains(&record.key_label).unwrap());
}
