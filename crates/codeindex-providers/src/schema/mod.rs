//! Schema generation and negotiation.

mod builder;
mod negotiator;

pub use builder::{Feature, SchemaBuilder, DEFAULT_DIMENSIONS, PROBE_DIMENSIONS};
pub use negotiator::{NegotiationResult, Negotiator, SchemaDiff};
