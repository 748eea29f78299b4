//! Circulation - the loan lifecycle engine.
//!
//! Owns the borrowing-limit, availability, due-date, and fine rules, and the
//! one real atomicity requirement in the system: a check-out or return moves
//! the loan row, the book's available count, and the member's open-loan
//! count together or not at all.

use crate::error::{Error, Result};
use crate::store::Store;
use crate::{book, loan, member, Book, Isbn, Loan, LoanId, LoanStatus, Member, MemberId};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Maximum simultaneously open loans per member.
pub const MAX_ACTIVE_LOANS: u32 = 3;

/// Days from check-out to expected return.
pub const LOAN_PERIOD_DAYS: u64 = 14;

/// Fine per full day past the expected return date.
pub const DAILY_FINE_RATE: f64 = 10.0;

/// Lend one copy of a book to a member.
///
/// Checks run strictly before any write, in a fixed order: member exists,
/// member active, member under the loan limit, book exists, copy on the
/// shelf. The first failed check reports and nothing is mutated. On success
/// the loan insert and both counter updates commit as one transaction.
pub fn check_out(
    store: &mut Store,
    member_id: MemberId,
    isbn: &str,
    today: NaiveDate,
) -> Result<Loan> {
    let mut member: Member = store
        .get_as(member::TABLE, &member::key(member_id))?
        .ok_or(Error::MemberNotFound(member_id))?;
    // Inactivity reported even when the member is also at the limit
    if !member.active {
        return Err(Error::MemberInactive(member_id));
    }
    if member.loans_outstanding >= MAX_ACTIVE_LOANS {
        return Err(Error::LoanLimitExceeded {
            member_id,
            limit: MAX_ACTIVE_LOANS,
        });
    }

    let mut book: Book = store
        .get_as(book::TABLE, isbn)?
        .ok_or_else(|| Error::BookNotFound(isbn.to_string()))?;
    if !book.is_available() {
        return Err(Error::BookUnavailable(book.isbn));
    }

    store.in_transaction(|store| {
        let id = store.next_id(loan::TABLE)?;
        let loan = Loan {
            id,
            member_id,
            isbn: book.isbn.clone(),
            checked_out_on: today,
            due_on: today + Days::new(LOAN_PERIOD_DAYS),
            returned_on: None,
            status: LoanStatus::Active,
            fine: 0.0,
        };
        store.put(loan::TABLE, &loan::key(id), &loan)?;

        book.available_copies -= 1;
        store.put(book::TABLE, &book.isbn, &book)?;

        member.loans_outstanding += 1;
        store.put(member::TABLE, &member::key(member_id), &member)?;

        Ok(loan)
    })
}

/// Close an open loan, assessing any late fine.
///
/// The loan must be open. There is deliberately no member-activity check on
/// this path, so an inactive member can still bring a book back. The loan
/// close and both counter updates commit as one transaction.
pub fn return_book(store: &mut Store, loan_id: LoanId, today: NaiveDate) -> Result<Loan> {
    let mut loan: Loan = store
        .get_as(loan::TABLE, &loan::key(loan_id))?
        .filter(Loan::is_open)
        .ok_or(Error::LoanNotFoundOrClosed(loan_id))?;

    // A missing member or book here is a data-integrity violation; the
    // catalog and membership guards exist to make this unreachable.
    let mut member: Member = store
        .get_as(member::TABLE, &member::key(loan.member_id))?
        .ok_or_else(|| {
            Error::InconsistentState(format!(
                "loan {} references missing member {}",
                loan_id, loan.member_id
            ))
        })?;
    let mut book: Book = store.get_as(book::TABLE, &loan.isbn)?.ok_or_else(|| {
        Error::InconsistentState(format!(
            "loan {} references missing book '{}'",
            loan_id, loan.isbn
        ))
    })?;

    loan.returned_on = Some(today);
    loan.status = LoanStatus::Returned;
    loan.fine = fine_due(&loan, today);

    store.in_transaction(|store| {
        store.put(loan::TABLE, &loan::key(loan_id), &loan)?;

        book.available_copies = (book.available_copies + 1).min(book.total_copies);
        store.put(book::TABLE, &book.isbn, &book)?;

        member.loans_outstanding = member.loans_outstanding.saturating_sub(1);
        store.put(member::TABLE, &member::key(member.id), &member)?;

        Ok(loan)
    })
}

/// Fine owed on a loan as of a given date. Pure: reads, never writes.
///
/// For a returned loan the fine is fixed by its return date; for an open
/// loan this is the fine that would be owed if it came back on `as_of`.
pub fn fine_due(loan: &Loan, as_of: NaiveDate) -> f64 {
    let reference = loan.returned_on.unwrap_or(as_of);
    let days_late = (reference - loan.due_on).num_days();
    if days_late <= 0 {
        0.0
    } else {
        days_late as f64 * DAILY_FINE_RATE
    }
}

/// Look up a loan by id.
pub fn find_loan(store: &Store, loan_id: LoanId) -> Result<Option<Loan>> {
    Ok(store.get_as(loan::TABLE, &loan::key(loan_id))?)
}

/// Check if any copy of a book is on the shelf.
///
/// Unknown ISBNs read as unavailable rather than an error.
pub fn is_available(store: &Store, isbn: &str) -> Result<bool> {
    let book: Option<Book> = store.get_as(book::TABLE, isbn)?;
    Ok(book.is_some_and(|b| b.is_available()))
}

/// A display row for an open loan, joined with member and book details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub member_name: String,
    pub isbn: Isbn,
    pub book_title: String,
    pub checked_out_on: NaiveDate,
    pub due_on: NaiveDate,
    /// Derived at read time, never stored
    pub overdue: bool,
}

/// All open loans, soonest due first, joined for display.
///
/// An open loan whose member or book is missing surfaces as
/// [`Error::InconsistentState`] rather than being skipped.
pub fn list_active_loans(store: &Store, today: NaiveDate) -> Result<Vec<LoanSummary>> {
    let mut open: Vec<Loan> = store.query(loan::TABLE)?.decode()?;
    open.retain(Loan::is_open);
    open.sort_by(|a, b| a.due_on.cmp(&b.due_on).then(a.id.cmp(&b.id)));

    let mut summaries = Vec::with_capacity(open.len());
    for loan in open {
        let member: Member = store
            .get_as(member::TABLE, &member::key(loan.member_id))?
            .ok_or_else(|| {
                Error::InconsistentState(format!(
                    "loan {} references missing member {}",
                    loan.id, loan.member_id
                ))
            })?;
        let book: Book = store.get_as(book::TABLE, &loan.isbn)?.ok_or_else(|| {
            Error::InconsistentState(format!(
                "loan {} references missing book '{}'",
                loan.id, loan.isbn
            ))
        })?;
        let overdue = loan.is_overdue(today);

        summaries.push(LoanSummary {
            loan_id: loan.id,
            member_id: loan.member_id,
            member_name: member.name,
            isbn: loan.isbn,
            book_title: book.title,
            checked_out_on: loan.checked_out_on,
            due_on: loan.due_on,
            overdue,
        });
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog, library_store, membership, NewBook, NewMember};

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn book_with_copies(isbn: &str, copies: u32) -> NewBook {
        NewBook {
            isbn: isbn.into(),
            title: format!("Title {}", isbn),
            author: "Author".into(),
            category: None,
            total_copies: copies,
        }
    }

    fn member_named(name: &str, email: &str) -> NewMember {
        NewMember {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    /// One member (id 1) and one book ("isbn-a", 2 copies).
    fn seeded_store() -> Store {
        let mut store = library_store();
        catalog::register_book(&mut store, book_with_copies("isbn-a", 2)).unwrap();
        membership::register_member(&mut store, member_named("Amina", "amina@example.com"), march(1))
            .unwrap();
        store
    }

    #[test]
    fn check_out_grants_a_loan() {
        let mut store = seeded_store();

        let loan = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();
        assert_eq!(loan.id, 1);
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.checked_out_on, march(2));
        assert_eq!(loan.due_on, march(16));
        assert!(loan.returned_on.is_none());

        let book = catalog::find_book(&store, "isbn-a").unwrap().unwrap();
        assert_eq!(book.available_copies, 1);
        let member = membership::find_member(&store, 1).unwrap().unwrap();
        assert_eq!(member.loans_outstanding, 1);
    }

    #[test]
    fn check_out_unknown_member() {
        let mut store = seeded_store();
        let result = check_out(&mut store, 99, "isbn-a", march(2));
        assert_eq!(result, Err(Error::MemberNotFound(99)));
    }

    #[test]
    fn check_out_inactive_member() {
        let mut store = seeded_store();
        membership::deactivate_member(&mut store, 1).unwrap();

        let result = check_out(&mut store, 1, "isbn-a", march(2));
        assert_eq!(result, Err(Error::MemberInactive(1)));
    }

    #[test]
    fn inactivity_reported_before_limit() {
        let mut store = seeded_store();
        let mut member = membership::find_member(&store, 1).unwrap().unwrap();
        member.active = false;
        member.loans_outstanding = MAX_ACTIVE_LOANS;
        store
            .put(member::TABLE, &member::key(1), &member)
            .unwrap();

        let result = check_out(&mut store, 1, "isbn-a", march(2));
        assert_eq!(result, Err(Error::MemberInactive(1)));
    }

    #[test]
    fn check_out_at_loan_limit() {
        let mut store = seeded_store();
        for isbn in ["isbn-b", "isbn-c", "isbn-d"] {
            catalog::register_book(&mut store, book_with_copies(isbn, 1)).unwrap();
            check_out(&mut store, 1, isbn, march(2)).unwrap();
        }

        let before = store.export_state().unwrap();
        let result = check_out(&mut store, 1, "isbn-a", march(2));
        assert_eq!(
            result,
            Err(Error::LoanLimitExceeded {
                member_id: 1,
                limit: MAX_ACTIVE_LOANS,
            })
        );
        // Nothing mutated by the rejected attempt
        assert_eq!(store.export_state().unwrap(), before);
    }

    #[test]
    fn check_out_unknown_book() {
        let mut store = seeded_store();
        let result = check_out(&mut store, 1, "no-such-isbn", march(2));
        assert_eq!(result, Err(Error::BookNotFound("no-such-isbn".into())));
    }

    #[test]
    fn check_out_exhausted_book() {
        let mut store = seeded_store();
        membership::register_member(&mut store, member_named("Borja", "borja@example.com"), march(1))
            .unwrap();
        membership::register_member(&mut store, member_named("Chiara", "chiara@example.com"), march(1))
            .unwrap();

        // Both copies go out, leaving available 0 of 2
        check_out(&mut store, 1, "isbn-a", march(2)).unwrap();
        check_out(&mut store, 2, "isbn-a", march(2)).unwrap();

        let before = store.export_state().unwrap();
        let result = check_out(&mut store, 3, "isbn-a", march(2));
        assert_eq!(result, Err(Error::BookUnavailable("isbn-a".into())));
        assert_eq!(store.export_state().unwrap(), before);
    }

    #[test]
    fn return_restores_both_counters() {
        let mut store = seeded_store();
        let before = store.export_state().unwrap();

        let loan = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();
        let closed = return_book(&mut store, loan.id, march(10)).unwrap();

        assert_eq!(closed.status, LoanStatus::Returned);
        assert_eq!(closed.returned_on, Some(march(10)));
        assert_eq!(closed.fine, 0.0);

        let book = catalog::find_book(&store, "isbn-a").unwrap().unwrap();
        assert_eq!(book.available_copies, 2);
        let member = membership::find_member(&store, 1).unwrap().unwrap();
        assert_eq!(member.loans_outstanding, 0);

        // Book and member rows match their pre-loan state exactly
        let after = store.export_state().unwrap();
        assert_eq!(
            after.get_row(book::TABLE, "isbn-a"),
            before.get_row(book::TABLE, "isbn-a")
        );
        assert_eq!(
            after.get_row(member::TABLE, "1"),
            before.get_row(member::TABLE, "1")
        );
    }

    #[test]
    fn return_on_due_date_owes_nothing() {
        let mut store = seeded_store();
        let loan = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();

        let closed = return_book(&mut store, loan.id, march(16)).unwrap();
        assert_eq!(closed.fine, 0.0);
    }

    #[test]
    fn late_return_assesses_fine() {
        let mut store = seeded_store();
        let loan = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();

        // Due March 16, returned March 21: five full days late
        let closed = return_book(&mut store, loan.id, march(21)).unwrap();
        assert_eq!(closed.fine, 50.0);

        // The fine is recoverable by re-reading the loan
        let stored = find_loan(&store, loan.id).unwrap().unwrap();
        assert_eq!(stored.fine, 50.0);
        assert_eq!(stored.returned_on, Some(march(21)));
    }

    #[test]
    fn double_return_rejected() {
        let mut store = seeded_store();
        let loan = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();
        return_book(&mut store, loan.id, march(10)).unwrap();

        let result = return_book(&mut store, loan.id, march(11));
        assert_eq!(result, Err(Error::LoanNotFoundOrClosed(loan.id)));

        // Counters did not move twice
        let book = catalog::find_book(&store, "isbn-a").unwrap().unwrap();
        assert_eq!(book.available_copies, 2);
        let member = membership::find_member(&store, 1).unwrap().unwrap();
        assert_eq!(member.loans_outstanding, 0);
    }

    #[test]
    fn return_unknown_loan() {
        let mut store = seeded_store();
        let result = return_book(&mut store, 99, march(2));
        assert_eq!(result, Err(Error::LoanNotFoundOrClosed(99)));
    }

    #[test]
    fn inactive_member_can_still_return() {
        let mut store = seeded_store();
        let loan = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();

        // Deactivation is blocked while loans are open, so flip the row
        // directly to model an account closed out-of-band
        let mut member = membership::find_member(&store, 1).unwrap().unwrap();
        member.active = false;
        store
            .put(member::TABLE, &member::key(1), &member)
            .unwrap();

        let closed = return_book(&mut store, loan.id, march(10)).unwrap();
        assert_eq!(closed.status, LoanStatus::Returned);
        let member = membership::find_member(&store, 1).unwrap().unwrap();
        assert_eq!(member.loans_outstanding, 0);
        assert!(!member.active);
    }

    #[test]
    fn return_with_missing_member_is_inconsistent() {
        let mut store = seeded_store();
        let loan = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();

        // Remove the member row behind the service guards
        store.remove(member::TABLE, &member::key(1)).unwrap();

        let result = return_book(&mut store, loan.id, march(10));
        assert!(matches!(
            result,
            Err(Error::InconsistentState(detail)) if detail.contains("missing member 1")
        ));
    }

    #[test]
    fn return_with_missing_book_is_inconsistent() {
        let mut store = seeded_store();
        let loan = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();

        store.remove(book::TABLE, "isbn-a").unwrap();

        let result = return_book(&mut store, loan.id, march(10));
        assert!(matches!(
            result,
            Err(Error::InconsistentState(detail)) if detail.contains("missing book 'isbn-a'")
        ));
        // The loan stays open; the violation is reported, not repaired
        assert!(find_loan(&store, loan.id).unwrap().unwrap().is_open());
    }

    #[test]
    fn fine_preview_on_open_loan() {
        let mut store = seeded_store();
        let loan = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();

        assert_eq!(fine_due(&loan, march(10)), 0.0);
        assert_eq!(fine_due(&loan, march(16)), 0.0);
        assert_eq!(fine_due(&loan, march(17)), 10.0);
        assert_eq!(fine_due(&loan, march(26)), 100.0);

        // Previewing never mutates the stored loan
        let stored = find_loan(&store, loan.id).unwrap().unwrap();
        assert_eq!(stored.fine, 0.0);
        assert!(stored.is_open());
    }

    #[test]
    fn fine_fixed_by_return_date() {
        let mut store = seeded_store();
        let loan = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();
        let closed = return_book(&mut store, loan.id, march(18)).unwrap();

        // Once returned, later as-of dates no longer grow the fine
        assert_eq!(closed.fine, 20.0);
        assert_eq!(fine_due(&closed, march(30)), 20.0);
    }

    #[test]
    fn is_available_reads_the_shelf() {
        let mut store = seeded_store();
        assert!(is_available(&store, "isbn-a").unwrap());
        assert!(!is_available(&store, "no-such-isbn").unwrap());

        membership::register_member(&mut store, member_named("Borja", "borja@example.com"), march(1))
            .unwrap();
        check_out(&mut store, 1, "isbn-a", march(2)).unwrap();
        check_out(&mut store, 2, "isbn-a", march(2)).unwrap();
        assert!(!is_available(&store, "isbn-a").unwrap());
    }

    #[test]
    fn active_loans_sorted_by_due_date() {
        let mut store = seeded_store();
        catalog::register_book(&mut store, book_with_copies("isbn-b", 1)).unwrap();
        catalog::register_book(&mut store, book_with_copies("isbn-c", 1)).unwrap();

        // Later check-outs fall due later; list soonest-due first
        let late = check_out(&mut store, 1, "isbn-b", march(8)).unwrap();
        let soon = check_out(&mut store, 1, "isbn-c", march(2)).unwrap();
        let middle = check_out(&mut store, 1, "isbn-a", march(5)).unwrap();

        let board = list_active_loans(&store, march(8)).unwrap();
        let ids: Vec<LoanId> = board.iter().map(|s| s.loan_id).collect();
        assert_eq!(ids, vec![soon.id, middle.id, late.id]);

        assert_eq!(board[0].member_name, "Amina");
        assert_eq!(board[0].book_title, "Title isbn-c");
        assert_eq!(board[0].due_on, march(16));
    }

    #[test]
    fn active_loans_tie_break_by_id() {
        let mut store = seeded_store();
        let first = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();
        let second = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();

        let board = list_active_loans(&store, march(2)).unwrap();
        let ids: Vec<LoanId> = board.iter().map(|s| s.loan_id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn active_loans_derive_overdue_at_read_time() {
        let mut store = seeded_store();
        let loan = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();

        assert!(!list_active_loans(&store, march(16)).unwrap()[0].overdue);
        assert!(list_active_loans(&store, march(17)).unwrap()[0].overdue);

        // Same stored state both times, only the read date differed
        assert_eq!(find_loan(&store, loan.id).unwrap().unwrap().due_on, march(16));
    }

    #[test]
    fn active_loans_exclude_returned() {
        let mut store = seeded_store();
        let kept = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();
        let returned = check_out(&mut store, 1, "isbn-a", march(2)).unwrap();
        return_book(&mut store, returned.id, march(5)).unwrap();

        let board = list_active_loans(&store, march(5)).unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].loan_id, kept.id);
    }

    #[test]
    fn active_loans_surface_missing_references() {
        let mut store = seeded_store();
        check_out(&mut store, 1, "isbn-a", march(2)).unwrap();
        store.remove(book::TABLE, "isbn-a").unwrap();

        let result = list_active_loans(&store, march(5));
        assert!(matches!(result, Err(Error::InconsistentState(_))));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn loan_due_march_16(returned_on: Option<NaiveDate>) -> Loan {
            Loan {
                id: 1,
                member_id: 1,
                isbn: "isbn-a".into(),
                checked_out_on: march(2),
                due_on: march(16),
                returned_on,
                status: match returned_on {
                    Some(_) => LoanStatus::Returned,
                    None => LoanStatus::Active,
                },
                fine: 0.0,
            }
        }

        proptest! {
            #[test]
            fn prop_fine_is_rate_times_whole_days_late(days_late in -30i64..=90) {
                let due = march(16);
                let returned = due + chrono::Duration::days(days_late);
                let loan = loan_due_march_16(Some(returned));

                let expected = if days_late <= 0 {
                    0.0
                } else {
                    days_late as f64 * DAILY_FINE_RATE
                };
                prop_assert_eq!(fine_due(&loan, due), expected);
            }

            #[test]
            fn prop_fine_never_decreases_day_over_day(offset in -30i64..=90) {
                let loan = loan_due_march_16(None);
                let today = march(16) + chrono::Duration::days(offset);
                let tomorrow = today + Days::new(1);

                let fine_today = fine_due(&loan, today);
                let fine_tomorrow = fine_due(&loan, tomorrow);

                prop_assert!(fine_tomorrow >= fine_today);
                // Each additional full day past due adds exactly one day's rate
                if offset >= 0 {
                    prop_assert_eq!(fine_tomorrow - fine_today, DAILY_FINE_RATE);
                }
            }

            #[test]
            fn prop_counters_stay_bounded(
                actions in proptest::collection::vec(
                    (0u8..3, 0u8..2, proptest::bool::ANY),
                    1..25,
                )
            ) {
                let mut store = library_store();
                let today = march(2);

                let member_ids: Vec<MemberId> = (0..3u32)
                    .map(|i| {
                        membership::register_member(
                            &mut store,
                            member_named(
                                &format!("Member {}", i),
                                &format!("member{}@example.com", i),
                            ),
                            today,
                        )
                        .unwrap()
                        .id
                    })
                    .collect();

                let isbns = ["isbn-a", "isbn-b"];
                for isbn in &isbns {
                    catalog::register_book(&mut store, book_with_copies(isbn, 2)).unwrap();
                }

                let mut open: Vec<LoanId> = Vec::new();
                for (m, b, borrow) in actions {
                    if borrow {
                        // Rejections (limit, availability) are expected here
                        if let Ok(loan) =
                            check_out(&mut store, member_ids[m as usize], isbns[b as usize], today)
                        {
                            open.push(loan.id);
                        }
                    } else if let Some(id) = open.pop() {
                        return_book(&mut store, id, today).unwrap();
                    }

                    for &id in &member_ids {
                        let member = membership::find_member(&store, id).unwrap().unwrap();
                        prop_assert!(member.loans_outstanding <= MAX_ACTIVE_LOANS);
                    }
                    for isbn in &isbns {
                        let book = catalog::find_book(&store, isbn).unwrap().unwrap();
                        prop_assert!(book.available_copies <= book.total_copies);
                    }
                }
            }
        }
    }
}
