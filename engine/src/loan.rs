//! Loan - one copy of a book lent to one member.

use crate::{Isbn, LoanId, MemberId, RowKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Table holding loans, keyed by numeric id.
pub const TABLE: &str = "loans";

/// Row key for a loan id.
pub fn key(id: LoanId) -> RowKey {
    id.to_string()
}

/// Lifecycle state of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Returned,
}

/// One copy of a book lent to one member.
///
/// A loan is created `Active` and closes exactly once: `returned_on`,
/// `status`, and `fine` are written together on return and never change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub checked_out_on: NaiveDate,
    /// Expected return date; the fine clock starts the day after
    pub due_on: NaiveDate,
    pub returned_on: Option<NaiveDate>,
    pub status: LoanStatus,
    /// Final fine, authoritative only once the loan is returned
    pub fine: f64,
}

impl Loan {
    /// Check if the loan is still open.
    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Check if an open loan is past due. A returned loan is never overdue.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.is_open() && as_of > self.due_on
    }
}
