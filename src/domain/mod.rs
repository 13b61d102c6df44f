//! Domain layer for ESLint Muter
//!
//! CDD Principle: Domain Model - Pure types for lint results and batch outcomes
//! - Contains the rule set, per-file outcomes, the batch report and the error taxonomy
//! - Independent of the file system, the async runtime and the linting engine
//! - Expresses the ubiquitous language of rules, suppressions and annotated files

pub mod violations;

// Re-export main domain types for convenience
pub use violations::*;
