use crate::structs::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    #[error("Quasi-identifier set is empty")]
    EmptyQuasiIdentifierSet,

    #[error("Quasi-identifier set lists column {0:?} more than once")]
    DuplicateQuasiIdentifier(String),

    #[error("Quasi-identifiers not found in dataset: {columns:?} (set {qi_set})")]
    MissingColumns { qi_set: String, columns: Vec<String> },

    #[error("At least one quasi-identifier set is required")]
    NoQuasiIdentifierSets,

    #[error("High-risk limit must be non-negative, got {0}")]
    NegativeLimit(i64),

    #[error("Record id {0} appears more than once")]
    DuplicateRecordId(RecordId),

    #[error("Record {record} has column {column:?} outside the dataset schema")]
    UnknownColumn { record: RecordId, column: String },

    #[error("Row {row} has no usable value in id column {column:?}")]
    MissingRecordId { row: usize, column: String },

    #[error("Risk score refers to record {0}, which is not in the dataset")]
    UnknownRecord(RecordId),

    #[error("Invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, RiskError>;
