//! Common types and errors shared across `record-seal` crates.

pub mod error;
pub mod protocol;

pub use error::SealError;
pub use protocol::{CiphertextBlob, StoredForm};
