//! Structured logging for the sealer.
//!
//! # Telemetry invariants
//!
//! - **No secrets, derived keys, or record plaintext** may appear in any log
//!   field. Log lengths, versions, paths, and error kinds only.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
