pub mod analysis;
pub mod autocomplete;
pub mod cleanup;
pub mod impact;
pub mod ingest;
pub mod repair;
pub mod store;
pub mod validator;

pub use analysis::{
    Bottleneck, CriticalPath, GraphAnalysis, BOTTLENECK_LIMIT, CRITICAL_PATH_LIMIT,
    DEFAULT_PATH_CUTOFF,
};
pub use autocomplete::{
    AutocompleteEngine, AutocompleteReport, AutocompleteRule, Action, Condition, SkippedProposal,
};
pub use cleanup::{cleanup, tidy_unclassified, CleanupReport, CleanupSummary};
pub use impact::{ImpactPropagator, ImpactResult};
pub use ingest::{IngestFailure, IngestReport, RecordKind};
pub use repair::{RepairAction, RepairActionKind, RepairReport, Repairer, REPAIR_PRIORITY};
pub use store::{describe, ArchGraph};
pub use validator::{IssueKind, ValidationIssue, ValidationReport, Validator};

pub use tokio_util::sync::CancellationToken;
