//! Gateway backends.

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "cdn")]
pub mod cdn;

#[cfg(feature = "memory")]
pub use memory::{MemoryGateway, Operation, StaticBundle};

#[cfg(feature = "cdn")]
pub use cdn::CdnTextBundle;
