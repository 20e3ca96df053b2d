//! Community resource data: canonical records, source adapters and loading.

pub mod adapter;
pub mod dataset;
pub mod record;
pub mod source;

pub use adapter::{normalize, normalize_all, ExternalRecord, FlatRecord, RestRecord};
pub use record::LocationRecord;
pub use source::{LoadedResources, ResourceOrigin, ResourceSource, SourceError};
