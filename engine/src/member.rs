//! Member - a registered borrower.

use crate::{MemberId, RowKey};
use chrono::NaiveDate;
use garde::Validate;
use serde::{Deserialize, Serialize};

/// Table holding members, keyed by numeric id.
pub const TABLE: &str = "members";

/// Row key for a member id.
pub fn key(id: MemberId) -> RowKey {
    id.to_string()
}

/// A registered borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub registered_on: NaiveDate,
    /// Inactive members cannot take out new loans
    pub active: bool,
    /// Count of currently open loans, maintained by the circulation module
    pub loans_outstanding: u32,
}

impl Member {
    /// Check if this member may take out another loan.
    pub fn can_borrow(&self, max_loans: u32) -> bool {
        self.active && self.loans_outstanding < max_loans
    }
}

/// Input for registering a member, validated before an id is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(skip)]
    pub phone: Option<String>,
}

impl NewMember {
    /// Build the stored form. Members start active with no loans.
    pub fn into_member(self, id: MemberId, registered_on: NaiveDate) -> Member {
        Member {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            registered_on,
            active: true,
            loans_outstanding: 0,
        }
    }
}
