//! OData filter clause construction.

mod manager;

pub use manager::{FilterManager, FilterManagerConfig};
