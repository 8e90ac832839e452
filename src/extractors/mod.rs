// src/extractors/mod.rs
pub mod categorize;
pub mod deadline;
pub mod opportunity;
pub mod record;

// Re-export key extraction types for convenience
pub use categorize::{categorize, OTHER_CATEGORY};
pub use opportunity::{ExtractorConfig, OpportunityExtractor};
pub use record::OpportunityRecord;
