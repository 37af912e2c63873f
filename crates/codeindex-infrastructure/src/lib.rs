//! # codeindex-infrastructure
//!
//! Ambient concerns shared by every other crate in the workspace:
//! layered configuration (`config`), structured logging (`logging`),
//! error-context extension traits (`error_ext`), and atomic schema
//! backup files (`backup`).
//!
//! None of this is domain logic — it is the plumbing the composition
//! root wires up once at process start and tears down at shutdown.

pub use codeindex_domain::error::{Error, Result};

pub mod backup;
pub mod config;
pub mod error_ext;
pub mod logging;
