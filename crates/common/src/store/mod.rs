//! The remote store contract and its implementations.
//!
//! - **[`RemoteStore`]**: the primitive operations everything else is built on
//! - **[`MemoryStore`]**: shared in-memory store with access-control enforcement
//! - **[`SolidClient`]**: HTTP client for Solid servers

mod dataset;
mod http;
mod jsonld;
mod memory;
mod provider;

pub use dataset::{is_container, parent_container, Binary, Dataset, Term, Thing};
pub use http::{SolidClient, SolidClientConfig};
pub use memory::{MemoryStore, StoreOperation};
pub use provider::{RemoteStore, ResourceWithAcl, StoreError};
