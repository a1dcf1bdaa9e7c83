// Library crate - trade reconciliation and performance metrics

pub mod aggregate;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod records;

// Re-export commonly used types
pub use aggregate::PerformanceSummary;
pub use pipeline::{run_pipeline, run_pipeline_files, PipelineResult};
pub use reconcile::{reconcile, ReconciledOrder};
pub use records::{RawExecution, RawFeeTicket, RawOrder, Side};
