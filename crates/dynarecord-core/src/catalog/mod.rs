//! Entity catalog: metadata descriptors and the registry that interns them.

pub mod metadata;
pub mod registry;

pub use metadata::{EntityMetadata, MetadataBuilder};
pub use registry::{MetadataHandle, MetadataRegistry};
