//! Scripted walkthrough of the lending rules.
//!
//! Runs against a throwaway in-memory store with fixed dates, so the
//! output is identical on every run and the data file is never touched.

use chrono::NaiveDate;
use circulate_engine::{
    catalog, circulation, library_store, membership, report, Error, LoanId, MemberId, NewBook,
    NewMember, Store, MAX_ACTIVE_LOANS,
};

const DUNE: &str = "978-0441172719";
const HYPERION: &str = "978-0553283686";
const NEUROMANCER: &str = "978-0441569595";
const DISPOSSESSED: &str = "978-0061054884";

/// Run the whole walkthrough.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = library_store();

    let seeded_on: NaiveDate = "2026-03-01".parse()?;
    let today: NaiveDate = "2026-03-02".parse()?;
    let winter_day: NaiveDate = "2026-02-14".parse()?;
    let late_return: NaiveDate = "2026-03-05".parse()?;

    println!("Circulate demo: a fixed-date tour of the lending rules");

    banner("1. Seeding the catalog");
    for (isbn, title, author, copies) in [
        (DUNE, "Dune", "Frank Herbert", 3),
        (HYPERION, "Hyperion", "Dan Simmons", 1),
        (NEUROMANCER, "Neuromancer", "William Gibson", 2),
        (DISPOSSESSED, "The Dispossessed", "Ursula K. Le Guin", 2),
    ] {
        let book = catalog::register_book(
            &mut store,
            NewBook {
                isbn: isbn.into(),
                title: title.into(),
                author: author.into(),
                category: Some("Science Fiction".into()),
                total_copies: copies,
            },
        )?;
        println!(
            "✓ {} - {} ({} copies)",
            book.title, book.author, book.total_copies
        );
    }

    banner("2. Registering members");
    let amina = register(&mut store, "Amina Diallo", "amina@example.com", seeded_on)?;
    let borja = register(&mut store, "Borja Iglesias", "borja@example.com", seeded_on)?;
    let chiara = register(&mut store, "Chiara Esposito", "chiara@example.com", seeded_on)?;
    let dalia = register(&mut store, "Dalia Hassan", "dalia@example.com", seeded_on)?;

    banner("3. Available books");
    for book in catalog::list_available(&store)? {
        println!(
            "{:<16} {:<20} {} available",
            book.isbn, book.title, book.available_copies
        );
    }

    banner("4. Granting loans");
    let aminas_dune = lend(&mut store, amina, DUNE, today)?;
    lend(&mut store, amina, NEUROMANCER, today)?;
    lend(&mut store, amina, DISPOSSESSED, today)?;
    lend(&mut store, borja, HYPERION, today)?;

    banner("5. The loan limit in action");
    println!("Amina already has {} open loans.", MAX_ACTIVE_LOANS);
    expect_refusal(circulation::check_out(&mut store, amina, DUNE, today));

    banner("6. No copies on the shelf");
    println!("Hyperion's only copy is out with Borja.");
    expect_refusal(circulation::check_out(&mut store, chiara, HYPERION, today));

    banner("7. Integrity guards");
    println!("Members with open loans cannot be deactivated:");
    expect_refusal(membership::deactivate_member(&mut store, amina));
    println!("Books with copies on loan cannot be removed:");
    expect_refusal(catalog::remove_book(&mut store, HYPERION));

    banner("8. A loan from last month");
    let dalias_loan = lend(&mut store, dalia, DUNE, winter_day)?;

    banner("9. The active-loan board");
    for entry in circulation::list_active_loans(&store, today)? {
        println!(
            "loan {:<4} {:<18} {:<18} due {} {}",
            entry.loan_id,
            entry.member_name,
            entry.book_title,
            entry.due_on,
            if entry.overdue { "OVERDUE" } else { "" }
        );
    }

    banner("10. Returns");
    let returned = circulation::return_book(&mut store, dalias_loan, late_return)?;
    println!(
        "✓ Dalia's copy back on {}, fine due: {:.2}",
        late_return, returned.fine
    );
    let returned = circulation::return_book(&mut store, aminas_dune, today)?;
    println!("✓ Amina's copy back on time, fine due: {:.2}", returned.fine);
    if let Some(member) = membership::find_member(&store, amina)? {
        println!("Amina now has {} loan(s) out.", member.loans_outstanding);
    }

    banner("11. Summary");
    crate::menu::print_summary(&report::summarize(&store)?);

    println!();
    println!("Demo complete.");
    Ok(())
}

fn banner(title: &str) {
    println!();
    println!("==== {} ====", title);
}

fn register(
    store: &mut Store,
    name: &str,
    email: &str,
    on: NaiveDate,
) -> Result<MemberId, Error> {
    let member = membership::register_member(
        store,
        NewMember {
            name: name.into(),
            email: email.into(),
            phone: None,
        },
        on,
    )?;
    println!("✓ {} registered with id {}", member.name, member.id);
    Ok(member.id)
}

fn lend(
    store: &mut Store,
    member_id: MemberId,
    isbn: &str,
    today: NaiveDate,
) -> Result<LoanId, Error> {
    let loan = circulation::check_out(store, member_id, isbn, today)?;
    println!(
        "✓ loan {} for member {}: {} due on {}",
        loan.id, loan.member_id, loan.isbn, loan.due_on
    );
    Ok(loan.id)
}

fn expect_refusal<T>(result: Result<T, Error>) {
    match result {
        Err(err) => println!("✓ refused: {}", err),
        Ok(_) => println!("✗ unexpectedly granted"),
    }
}
