mod assessment;
mod config;
mod dataloader;
mod error;
mod group_counter;
mod high_risk;
mod inference;
mod report;
mod scorer;
mod structs;
#[cfg(test)]
mod testing;
mod uniqueness;
mod utils;
pub use assessment::{Assessment, assess_dataset, pairwise_qi_sets};
pub use config::{AssessmentConfig, parse_qi_sets};
pub use dataloader::DatasetLoader;
pub use error::{Result, RiskError};
pub use group_counter::{GroupCounts, count_groups};
pub use high_risk::{DEFAULT_HIGH_RISK_LIMIT, HighRiskRecord, checked_limit, select_high_risk};
pub use inference::{ColumnPiiTags, QuasiIdentifierInference, assess_with_inference};
pub use report::{REPORT_RARE_MAX_K, REPORT_SAFE_ABOVE_K, RiskReport, summarize};
pub use scorer::{MULTI_UNIQUE_MIN_SETS, RiskDecision, RiskLevel, RiskScore, score};
pub use structs::{Dataset, QuasiIdentifierSet, Record, RecordId, Value};
pub use uniqueness::{RARE_MAX_K, SAFE_MIN_K, UniquenessClass, UniquenessResult, classify};
pub use utils::save_json;
