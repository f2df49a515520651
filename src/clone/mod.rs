// Bulk repository cloning.

pub mod job;
pub mod layout;
pub mod orchestrator;

pub use job::BatchSummary;
pub use layout::ProjectLayout;
pub use orchestrator::CloneOrchestrator;
