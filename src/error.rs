use thiserror::Error;

/// Classification of a rule violation, as reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    Permission,
    InvalidState,
    Duplicate,
    Validation,
    NotFound,
}

#[derive(Error, Debug)]
pub enum MarketplaceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Duplicate: {0}")]
    Duplicate(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl MarketplaceError {
    pub fn not_found(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns the rejection class for rule violations, `None` for infrastructure faults.
    pub fn rejection(&self) -> Option<RejectionKind> {
        match self {
            Self::NotFound { .. } => Some(RejectionKind::NotFound),
            Self::PermissionDenied(_) => Some(RejectionKind::Permission),
            Self::InvalidState(_) => Some(RejectionKind::InvalidState),
            Self::Duplicate(_) => Some(RejectionKind::Duplicate),
            Self::ValidationError(_) => Some(RejectionKind::Validation),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for MarketplaceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::ValidationError(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MarketplaceError>;
