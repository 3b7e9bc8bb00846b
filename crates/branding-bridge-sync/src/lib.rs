//! Aggregation and persistence of branding documents.
//!
//! Provides:
//! - `Aggregator` - Build the composite document from parallel reads
//! - `assemble_custom_text` - Current prompt text merged over stock defaults
//! - `Persister` - Write an edited document back in parallel
//! - Gateway backends (memory, CDN text bundle)

pub mod aggregate;
pub mod custom_text;
pub mod gateway;
pub mod persist;

pub use aggregate::{AggregateError, Aggregator};
pub use custom_text::assemble_custom_text;
pub use persist::{PersistError, Persister};
