pub mod integrity_checker;
pub mod normalizer;
pub mod parallel_processor;
pub mod transforms;

pub use integrity_checker::{DomainIssue, IntegrityChecker, IntegrityReport, RangeViolation};
pub use normalizer::{inverse_normalize, normalize, Direction, Normalizer};
pub use parallel_processor::{ParallelProcessor, StationBatch};
