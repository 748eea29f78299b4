//! Report - whole-collection counts.

use crate::error::Result;
use crate::store::Store;
use crate::{book, loan, member, Loan, Member};
use serde::{Deserialize, Serialize};

/// Headline counts over the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySummary {
    pub books: usize,
    pub members: usize,
    pub active_members: usize,
    pub loans: usize,
    pub active_loans: usize,
}

/// Count books, members, and loans, split by active status.
pub fn summarize(store: &Store) -> Result<LibrarySummary> {
    let members: Vec<Member> = store.query(member::TABLE)?.decode()?;
    let loans: Vec<Loan> = store.query(loan::TABLE)?.decode()?;

    Ok(LibrarySummary {
        books: store.query(book::TABLE)?.count(),
        members: members.len(),
        active_members: members.iter().filter(|m| m.active).count(),
        loans: loans.len(),
        active_loans: loans.iter().filter(|l| l.is_open()).count(),
    })
}
