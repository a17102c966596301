pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod plan;

pub use backend::{AnnotationBackend, fetch_all_unannotated};
pub use config::{CommitStrategy, SyncConfig};
pub use engine::{BatchOutcome, CommitReport, LoadedImage, SyncEngine};
pub use error::{BackendError, SyncError};
pub use http::HttpBackend;
pub use plan::{BatchPlan, CommitPlan, plan_batch, plan_reconcile, plan_replace_all};
