pub mod config;
pub mod event;
pub mod signature;
pub mod storage;

pub use config::{StorageBackend, StorageConfig};
pub use event::{PushEvent, PushTarget, PusherIdentity, Repository};
pub use signature::{SignatureError, compute_signature, verify_signature};
