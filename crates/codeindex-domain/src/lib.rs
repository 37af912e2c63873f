//! Core domain types, ports, and error taxonomy for the code-aware search
//! indexing and retrieval system.
//!
//! This crate has no knowledge of HTTP, the filesystem, or any concrete
//! provider — it defines the vocabulary (`value_objects`), the seams
//! (`ports`), and the failure modes (`error`) that the rest of the
//! workspace builds against.

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
