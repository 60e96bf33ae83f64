pub mod custody;
pub mod error;
pub mod key;

// Re-export core functionality
pub use custody::{
    create_custody, CustodyConfig, FileKeyCustody, KeyCustody, MemoryKeyCustody,
};
pub use error::{Error, Result};
pub use key::{verify_signature, Ed25519Key};
