//! # Circulate Engine
//!
//! A deterministic loan lifecycle engine for a small library.
//!
//! This crate provides the core logic for a book catalog, a membership
//! register, and the loans connecting them. Every rule lives here with
//! guaranteed determinism - the same inputs always produce the same state.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, terminals, or clocks
//! - **Deterministic**: Same inputs always produce same state
//! - **Transactional**: Multi-row updates commit together or not at all
//! - **Testable**: Pure logic, no mocks needed
//!
//! ## Core Concepts
//!
//! ### Entities
//!
//! Three row types live in the store:
//! - [`Book`] - a catalog entry keyed by ISBN, tracking copy counts
//! - [`Member`] - a registered borrower with an active flag
//! - [`Loan`] - one borrowing, open or returned, with its dates and fine
//!
//! ### Services
//!
//! Operations are free functions over a [`Store`]:
//! - [`catalog`] - register, find, list, and remove books
//! - [`membership`] - register, find, deactivate, and reactivate members
//! - [`circulation`] - check-out, return, fines, and the active-loan board
//! - [`report`] - whole-collection counts
//!
//! ### Transactions
//!
//! [`circulation`] wraps its multi-row updates in a store transaction, so
//! a loan row and the two counters mirroring it never go out of step.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use circulate_engine::{catalog, circulation, library_store, membership};
//! use circulate_engine::{NewBook, NewMember};
//!
//! // 1. Create a store with the library tables
//! let mut store = library_store();
//!
//! // 2. Register a book and a member
//! catalog::register_book(&mut store, NewBook {
//!     isbn: "978-0441172719".into(),
//!     title: "Dune".into(),
//!     author: "Frank Herbert".into(),
//!     category: Some("Science Fiction".into()),
//!     total_copies: 2,
//! }).unwrap();
//!
//! let amina = membership::register_member(&mut store, NewMember {
//!     name: "Amina Diallo".into(),
//!     email: "amina@example.com".into(),
//!     phone: None,
//! }, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()).unwrap();
//!
//! // 3. Lend a copy and take it back
//! let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
//! let loan = circulation::check_out(&mut store, amina.id, "978-0441172719", today).unwrap();
//! assert_eq!(loan.due_on, NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());
//!
//! let returned = circulation::return_book(&mut store, loan.id, loan.due_on).unwrap();
//! assert_eq!(returned.fine, 0.0);
//!
//! // 4. Read the active-loan board
//! assert!(circulation::list_active_loans(&store, today).unwrap().is_empty());
//! ```
//!
//! ## Persistence
//!
//! Use [`Store::export_state`] and [`Store::import_state`] with
//! [`StoreSnapshot`] for persistence. Snapshots are serializable to JSON
//! with deterministic ordering, and refuse to load a format newer than
//! this build understands.

pub mod book;
pub mod catalog;
pub mod circulation;
pub mod error;
pub mod loan;
pub mod member;
pub mod membership;
pub mod report;
pub mod snapshot;
pub mod store;

// Re-export main types at crate root
pub use book::{Book, NewBook};
pub use circulation::{LoanSummary, DAILY_FINE_RATE, LOAN_PERIOD_DAYS, MAX_ACTIVE_LOANS};
pub use error::{Error, Result, StoreError, StoreResult};
pub use loan::{Loan, LoanStatus};
pub use member::{Member, NewMember};
pub use report::LibrarySummary;
pub use snapshot::{SnapshotMetadata, StoreSnapshot, TableSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use store::{Query, Store, Table};

/// Type aliases for clarity
pub type Isbn = String;
pub type MemberId = u64;
pub type LoanId = u64;
pub type TableName = String;
pub type RowKey = String;

/// A store with the three library tables registered.
pub fn library_store() -> Store {
    Store::new([book::TABLE, member::TABLE, loan::TABLE])
}
