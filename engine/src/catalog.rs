//! Catalog service - registration, lookup, and removal of books.

use crate::error::{Error, Result};
use crate::store::Store;
use crate::{book, Book, NewBook};
use garde::Validate;

/// Register a new book in the catalog.
pub fn register_book(store: &mut Store, new_book: NewBook) -> Result<Book> {
    new_book.validate()?;

    if store.contains(book::TABLE, &new_book.isbn)? {
        return Err(Error::DuplicateIsbn(new_book.isbn));
    }

    let book = new_book.into_book();
    store.put(book::TABLE, &book.isbn, &book)?;
    Ok(book)
}

/// Look up a book by ISBN.
pub fn find_book(store: &Store, isbn: &str) -> Result<Option<Book>> {
    Ok(store.get_as(book::TABLE, isbn)?)
}

/// All books, in title order.
pub fn list_books(store: &Store) -> Result<Vec<Book>> {
    let mut books: Vec<Book> = store.query(book::TABLE)?.decode()?;
    books.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.isbn.cmp(&b.isbn)));
    Ok(books)
}

/// Books with at least one copy on the shelf, in title order.
pub fn list_available(store: &Store) -> Result<Vec<Book>> {
    let mut books = list_books(store)?;
    books.retain(Book::is_available);
    Ok(books)
}

/// Remove a book from the catalog.
///
/// Blocked while any copy is on loan, so an active loan can always resolve
/// its book.
pub fn remove_book(store: &mut Store, isbn: &str) -> Result<()> {
    let book = find_book(store, isbn)?.ok_or_else(|| Error::BookNotFound(isbn.to_string()))?;
    if book.copies_on_loan() > 0 {
        return Err(Error::CopiesOnLoan(book.isbn));
    }

    store.remove(book::TABLE, isbn)?;
    Ok(())
}
