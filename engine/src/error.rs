//! Error types for the Circulate engine.

use crate::{Isbn, LoanId, MemberId, RowKey, TableName};
use thiserror::Error;

/// All possible errors from the storage layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("table not found: {0}")]
    TableNotFound(TableName),

    #[error("corrupt row in '{table}' at '{key}': {detail}")]
    CorruptRow {
        table: TableName,
        key: RowKey,
        detail: String,
    },

    #[error("row not serializable: {0}")]
    InvalidRow(String),

    #[error("transaction already open")]
    NestedTransaction,

    #[error("no open transaction")]
    NoOpenTransaction,

    #[error("transaction still open")]
    UncommittedTransaction,

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// All possible errors from the circulation domain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Lookup errors
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("book not found: {0}")]
    BookNotFound(Isbn),

    #[error("no active loan with id: {0}")]
    LoanNotFoundOrClosed(LoanId),

    // Policy errors
    #[error("member {0} is inactive")]
    MemberInactive(MemberId),

    #[error("member {member_id} already has {limit} active loans")]
    LoanLimitExceeded { member_id: MemberId, limit: u32 },

    #[error("no copies of '{0}' available")]
    BookUnavailable(Isbn),

    #[error("'{0}' has copies on loan")]
    CopiesOnLoan(Isbn),

    #[error("member {0} has outstanding loans")]
    OutstandingLoans(MemberId),

    // Registration errors
    #[error("book already registered: {0}")]
    DuplicateIsbn(Isbn),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("validation failed: {0}")]
    Validation(String),

    // Integrity and storage errors
    #[error("inconsistent records: {0}")]
    InconsistentState(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl From<garde::Report> for Error {
    fn from(report: garde::Report) -> Self {
        Error::Validation(report.to_string())
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, Error>;
