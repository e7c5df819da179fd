//! At-rest sealing of text records.
//!
//! [`crypto`] holds the self-contained AES-256-GCM construction and its
//! building blocks. [`record`] wraps it in the stored JSON document and the
//! on-disk store, [`config`] reads the sealing settings from the environment,
//! and [`telemetry`] sets up logging for the binary.

pub mod config;
pub mod crypto;
pub mod record;
pub mod telemetry;
