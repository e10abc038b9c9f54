use thiserror::Error;

/// What kind of record a [LedgerError::NotFound] or [LedgerError::DuplicateKey] is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Wallet,
    Category,
    Contact,
    Transaction,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordKind::Wallet => "wallet",
            RecordKind::Category => "category",
            RecordKind::Contact => "contact",
            RecordKind::Transaction => "transaction",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{kind} '{key}' not found")]
    NotFound { kind: RecordKind, key: String },

    #[error("{kind} '{key}' already exists")]
    DuplicateKey { kind: RecordKind, key: String },

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl LedgerError {
    pub fn not_found(kind: RecordKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub fn duplicate(kind: RecordKind, key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            kind,
            key: key.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
