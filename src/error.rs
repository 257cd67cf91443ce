use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
    #[error("failed to load {source_name}: {reason}")]
    DataLoad { source_name: String, reason: String },

    #[error("line {line}: invalid {field} value '{value}'")]
    Parse {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("range start {min} is after range end {max}")]
    InvalidRange { min: String, max: String },
}

impl ExplorerError {
    pub fn data_load(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataLoad {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;
