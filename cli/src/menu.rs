//! Interactive menu over the library store.
//!
//! Every engine rejection is shown as a one-line message and the loop
//! continues; only IO failures on the terminal abort the session. When
//! autosave is on, the snapshot file is rewritten after each successful
//! mutation.

use crate::config::Config;
use crate::persist;
use chrono::{Local, NaiveDate};
use circulate_engine::{
    catalog, circulation, membership, report, LibrarySummary, NewBook, NewMember, Store,
    MAX_ACTIVE_LOANS,
};
use std::io::{self, Write};

/// Run the menu loop until the user exits.
pub fn run(store: &mut Store, config: &Config) -> io::Result<()> {
    loop {
        println!();
        println!("==== Circulate ====");
        println!("1. Books");
        println!("2. Members");
        println!("3. Loans");
        println!("4. Report");
        println!("0. Exit");

        let Some(choice) = prompt("Select an option")? else {
            break;
        };
        match choice.as_str() {
            "1" => books_menu(store, config)?,
            "2" => members_menu(store, config)?,
            "3" => loans_menu(store, config)?,
            "4" => match report::summarize(store) {
                Ok(summary) => print_summary(&summary),
                Err(err) => println!("✗ {}", err),
            },
            "0" => break,
            other => println!("✗ unknown option: {}", other),
        }
    }

    println!("Goodbye.");
    Ok(())
}

/// Print the headline counts.
pub fn print_summary(summary: &LibrarySummary) {
    println!();
    println!("---- Library summary ----");
    println!("books:          {}", summary.books);
    println!("members:        {}", summary.members);
    println!("active members: {}", summary.active_members);
    println!("loans:          {}", summary.loans);
    println!("active loans:   {}", summary.active_loans);
}

// Reads one trimmed line; None means stdin was closed, which unwinds
// every menu level as if the user had picked "back".
fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn prompt_id(label: &str) -> io::Result<Option<u64>> {
    let Some(raw) = prompt(label)? else {
        return Ok(None);
    };
    match raw.parse() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            println!("✗ not a number: {}", raw);
            Ok(None)
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn autosave(store: &Store, config: &Config) {
    if !config.autosave {
        return;
    }
    if let Err(err) = persist::save(store, &config.data_path) {
        tracing::warn!(error = %err, "autosave failed");
        println!("✗ autosave failed: {}", err);
    }
}

// ---- Books ----

fn books_menu(store: &mut Store, config: &Config) -> io::Result<()> {
    loop {
        println!();
        println!("---- Books ----");
        println!("1. Register book");
        println!("2. List all books");
        println!("3. List available books");
        println!("4. Find book by ISBN");
        println!("5. Remove book");
        println!("0. Back");

        let Some(choice) = prompt("Select an option")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => register_book(store, config)?,
            "2" => list_books(store),
            "3" => list_available(store),
            "4" => find_book(store)?,
            "5" => remove_book(store, config)?,
            "0" => return Ok(()),
            other => println!("✗ unknown option: {}", other),
        }
    }
}

fn register_book(store: &mut Store, config: &Config) -> io::Result<()> {
    let Some(isbn) = prompt("ISBN")? else {
        return Ok(());
    };
    let Some(title) = prompt("Title")? else {
        return Ok(());
    };
    let Some(author) = prompt("Author")? else {
        return Ok(());
    };
    let Some(category) = prompt("Category (optional)")? else {
        return Ok(());
    };
    let Some(copies) = prompt("Copies (default 1)")? else {
        return Ok(());
    };

    let total_copies = if copies.is_empty() {
        1
    } else {
        match copies.parse() {
            Ok(n) => n,
            Err(_) => {
                println!("✗ not a number: {}", copies);
                return Ok(());
            }
        }
    };

    let new_book = NewBook {
        isbn,
        title,
        author,
        category: (!category.is_empty()).then_some(category),
        total_copies,
    };
    match catalog::register_book(store, new_book) {
        Ok(book) => {
            println!("✓ registered '{}'", book.title);
            autosave(store, config);
        }
        Err(err) => println!("✗ {}", err),
    }
    Ok(())
}

fn list_books(store: &Store) {
    match catalog::list_books(store) {
        Ok(books) if books.is_empty() => println!("no books registered"),
        Ok(books) => {
            println!("{} book(s)", books.len());
            println!("{:<16} {:<32} {:<24} {}", "ISBN", "Title", "Author", "Avail/Total");
            for book in books {
                println!(
                    "{:<16} {:<32} {:<24} {}/{}",
                    book.isbn, book.title, book.author, book.available_copies, book.total_copies
                );
            }
        }
        Err(err) => println!("✗ {}", err),
    }
}

fn list_available(store: &Store) {
    match catalog::list_available(store) {
        Ok(books) if books.is_empty() => println!("no books available right now"),
        Ok(books) => {
            println!("{} book(s) available", books.len());
            for book in books {
                println!(
                    "{:<16} {:<32} {} available",
                    book.isbn, book.title, book.available_copies
                );
            }
        }
        Err(err) => println!("✗ {}", err),
    }
}

fn find_book(store: &Store) -> io::Result<()> {
    let Some(isbn) = prompt("ISBN")? else {
        return Ok(());
    };
    match catalog::find_book(store, &isbn) {
        Ok(Some(book)) => {
            println!("  ISBN:      {}", book.isbn);
            println!("  Title:     {}", book.title);
            println!("  Author:    {}", book.author);
            println!("  Category:  {}", book.category.as_deref().unwrap_or("-"));
            println!("  Copies:    {}/{}", book.available_copies, book.total_copies);
            println!(
                "  Status:    {}",
                if book.is_available() { "available" } else { "all copies out" }
            );
        }
        Ok(None) => println!("✗ no book with ISBN {}", isbn),
        Err(err) => println!("✗ {}", err),
    }
    Ok(())
}

fn remove_book(store: &mut Store, config: &Config) -> io::Result<()> {
    let Some(isbn) = prompt("ISBN")? else {
        return Ok(());
    };
    let book = match catalog::find_book(store, &isbn) {
        Ok(Some(book)) => book,
        Ok(None) => {
            println!("✗ no book with ISBN {}", isbn);
            return Ok(());
        }
        Err(err) => {
            println!("✗ {}", err);
            return Ok(());
        }
    };

    println!("{} - {}", book.title, book.author);
    let Some(answer) = prompt("Remove this book? (y/n)")? else {
        return Ok(());
    };
    if !answer.eq_ignore_ascii_case("y") {
        println!("cancelled");
        return Ok(());
    }

    match catalog::remove_book(store, &isbn) {
        Ok(()) => {
            println!("✓ removed '{}'", book.title);
            autosave(store, config);
        }
        Err(err) => println!("✗ {}", err),
    }
    Ok(())
}

// ---- Members ----

fn members_menu(store: &mut Store, config: &Config) -> io::Result<()> {
    loop {
        println!();
        println!("---- Members ----");
        println!("1. Register member");
        println!("2. List all members");
        println!("3. List active members");
        println!("4. Find member by id");
        println!("5. Deactivate member");
        println!("6. Reactivate member");
        println!("0. Back");

        let Some(choice) = prompt("Select an option")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => register_member(store, config)?,
            "2" => list_members(store),
            "3" => list_active_members(store),
            "4" => find_member(store)?,
            "5" => set_member_active(store, config, false)?,
            "6" => set_member_active(store, config, true)?,
            "0" => return Ok(()),
            other => println!("✗ unknown option: {}", other),
        }
    }
}

fn register_member(store: &mut Store, config: &Config) -> io::Result<()> {
    let Some(name) = prompt("Full name")? else {
        return Ok(());
    };
    let Some(email) = prompt("Email")? else {
        return Ok(());
    };
    let Some(phone) = prompt("Phone (optional)")? else {
        return Ok(());
    };

    let new_member = NewMember {
        name,
        email,
        phone: (!phone.is_empty()).then_some(phone),
    };
    match membership::register_member(store, new_member, today()) {
        Ok(member) => {
            println!("✓ registered {} with id {}", member.name, member.id);
            autosave(store, config);
        }
        Err(err) => println!("✗ {}", err),
    }
    Ok(())
}

fn list_members(store: &Store) {
    match membership::list_members(store) {
        Ok(members) if members.is_empty() => println!("no members registered"),
        Ok(members) => {
            println!("{} member(s)", members.len());
            println!("{:<6} {:<28} {:<28} {:<10} {}", "ID", "Name", "Email", "Status", "Loans");
            for member in members {
                println!(
                    "{:<6} {:<28} {:<28} {:<10} {}",
                    member.id,
                    member.name,
                    member.email,
                    if member.active { "active" } else { "inactive" },
                    member.loans_outstanding
                );
            }
        }
        Err(err) => println!("✗ {}", err),
    }
}

fn list_active_members(store: &Store) {
    match membership::list_active_members(store) {
        Ok(members) if members.is_empty() => println!("no active members"),
        Ok(members) => {
            println!("{} active member(s)", members.len());
            for member in members {
                println!(
                    "{:<6} {:<28} {} loan(s) out",
                    member.id, member.name, member.loans_outstanding
                );
            }
        }
        Err(err) => println!("✗ {}", err),
    }
}

fn find_member(store: &Store) -> io::Result<()> {
    let Some(id) = prompt_id("Member id")? else {
        return Ok(());
    };
    match membership::find_member(store, id) {
        Ok(Some(member)) => {
            println!("  Id:          {}", member.id);
            println!("  Name:        {}", member.name);
            println!("  Email:       {}", member.email);
            println!("  Phone:       {}", member.phone.as_deref().unwrap_or("-"));
            println!("  Registered:  {}", member.registered_on);
            println!(
                "  Status:      {}",
                if member.active { "active" } else { "inactive" }
            );
            println!("  Loans out:   {}", member.loans_outstanding);
            println!(
                "  Can borrow:  {}",
                if member.can_borrow(MAX_ACTIVE_LOANS) { "yes" } else { "no" }
            );
        }
        Ok(None) => println!("✗ no member with id {}", id),
        Err(err) => println!("✗ {}", err),
    }
    Ok(())
}

fn set_member_active(store: &mut Store, config: &Config, active: bool) -> io::Result<()> {
    let Some(id) = prompt_id("Member id")? else {
        return Ok(());
    };
    let result = if active {
        membership::reactivate_member(store, id)
    } else {
        membership::deactivate_member(store, id)
    };
    match result {
        Ok(member) => {
            println!(
                "✓ {} is now {}",
                member.name,
                if member.active { "active" } else { "inactive" }
            );
            autosave(store, config);
        }
        Err(err) => println!("✗ {}", err),
    }
    Ok(())
}

// ---- Loans ----

fn loans_menu(store: &mut Store, config: &Config) -> io::Result<()> {
    loop {
        println!();
        println!("---- Loans ----");
        println!("1. Check out a book");
        println!("2. Return a book");
        println!("3. List active loans");
        println!("0. Back");

        let Some(choice) = prompt("Select an option")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => check_out(store, config)?,
            "2" => return_book(store, config)?,
            "3" => list_active_loans(store),
            "0" => return Ok(()),
            other => println!("✗ unknown option: {}", other),
        }
    }
}

fn check_out(store: &mut Store, config: &Config) -> io::Result<()> {
    let Some(member_id) = prompt_id("Member id")? else {
        return Ok(());
    };
    let Some(isbn) = prompt("ISBN")? else {
        return Ok(());
    };

    match circulation::check_out(store, member_id, &isbn, today()) {
        Ok(loan) => {
            tracing::info!(loan = loan.id, member = member_id, isbn = %loan.isbn, "loan granted");
            println!("✓ loan {} granted, due on {}", loan.id, loan.due_on);
            autosave(store, config);
        }
        Err(err) => println!("✗ {}", err),
    }
    Ok(())
}

fn return_book(store: &mut Store, config: &Config) -> io::Result<()> {
    let Some(loan_id) = prompt_id("Loan id")? else {
        return Ok(());
    };

    match circulation::return_book(store, loan_id, today()) {
        Ok(loan) => {
            tracing::info!(loan = loan.id, fine = loan.fine, "loan closed");
            if loan.fine > 0.0 {
                println!("✓ returned, fine due: {:.2}", loan.fine);
            } else {
                println!("✓ returned on time");
            }
            autosave(store, config);
        }
        Err(err) => println!("✗ {}", err),
    }
    Ok(())
}

fn list_active_loans(store: &Store) {
    match circulation::list_active_loans(store, today()) {
        Ok(board) if board.is_empty() => println!("no active loans"),
        Ok(board) => {
            println!("{} active loan(s)", board.len());
            println!("{:<6} {:<24} {:<30} {:<12} {}", "ID", "Member", "Title", "Due", "Status");
            for entry in board {
                println!(
                    "{:<6} {:<24} {:<30} {:<12} {}",
                    entry.loan_id,
                    entry.member_name,
                    entry.book_title,
                    entry.due_on.to_string(),
                    if entry.overdue { "OVERDUE" } else { "open" }
                );
            }
        }
        Err(err) => println!("✗ {}", err),
    }
}
