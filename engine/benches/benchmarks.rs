//! Performance benchmarks for circulate-engine

use chrono::NaiveDate;
use circulate_engine::{
    catalog, circulation, library_store, membership, Loan, LoanStatus, NewBook, NewMember, Store,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bench_book(i: usize) -> NewBook {
    NewBook {
        isbn: format!("isbn-{:04}", i),
        title: format!("Book {}", i),
        author: "Author".into(),
        category: None,
        total_copies: 3,
    }
}

fn bench_member(i: usize) -> NewMember {
    NewMember {
        name: format!("Member {}", i),
        email: format!("member{}@example.com", i),
        phone: None,
    }
}

fn seeded_store(books: usize, members: usize) -> Store {
    let mut store = library_store();
    for i in 0..books {
        catalog::register_book(&mut store, bench_book(i)).unwrap();
    }
    for i in 0..members {
        membership::register_member(&mut store, bench_member(i), date(2026, 3, 1)).unwrap();
    }
    store
}

fn bench_circulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("circulation");

    // Benchmark a full check-out/return cycle
    group.bench_function("checkout_return_cycle", |b| {
        let mut store = seeded_store(1, 1);
        let today = date(2026, 3, 2);

        b.iter(|| {
            let loan = circulation::check_out(&mut store, 1, "isbn-0000", today).unwrap();
            circulation::return_book(&mut store, black_box(loan.id), today).unwrap()
        })
    });

    // Benchmark the board with 300 open loans
    group.bench_function("list_active_loans", |b| {
        let mut store = seeded_store(100, 100);
        let today = date(2026, 3, 2);

        // Each member borrows three books; each book lends all three copies
        for i in 0..100u64 {
            for step in 0..3u64 {
                let isbn = format!("isbn-{:04}", (i + step) % 100);
                circulation::check_out(&mut store, i + 1, &isbn, today).unwrap();
            }
        }

        b.iter(|| circulation::list_active_loans(black_box(&store), today).unwrap())
    });

    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");

    // Benchmark book registration
    group.bench_function("register_book", |b| {
        let mut store = library_store();
        let mut id = 0usize;

        b.iter(|| {
            id += 1;
            catalog::register_book(&mut store, black_box(bench_book(id)))
        })
    });

    // Benchmark point lookup among 1000 books
    group.bench_function("find_book", |b| {
        let store = seeded_store(1000, 0);
        b.iter(|| catalog::find_book(black_box(&store), black_box("isbn-0500")))
    });

    // Benchmark the availability listing
    group.bench_function("list_available", |b| {
        let store = seeded_store(1000, 0);
        b.iter(|| catalog::list_available(black_box(&store)))
    });

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in [100, 500, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("export", size), size, |b, &size| {
            let store = seeded_store(size, 0);
            b.iter(|| store.export_state())
        });

        group.bench_with_input(BenchmarkId::new("import", size), size, |b, &size| {
            let store = seeded_store(size, 0);
            let snapshot = store.export_state().unwrap();

            b.iter(|| {
                let mut new_store = library_store();
                new_store.import_state(black_box(snapshot.clone()))
            })
        });
    }

    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");

    group.bench_function("loan_to_json", |b| {
        let loan = Loan {
            id: 1,
            member_id: 1,
            isbn: "978-0441172719".into(),
            checked_out_on: date(2026, 3, 2),
            due_on: date(2026, 3, 16),
            returned_on: None,
            status: LoanStatus::Active,
            fine: 0.0,
        };

        b.iter(|| serde_json::to_string(black_box(&loan)))
    });

    group.bench_function("loan_from_json", |b| {
        let json = r#"{"id":1,"memberId":1,"isbn":"978-0441172719","checkedOutOn":"2026-03-02","dueOn":"2026-03-16","returnedOn":null,"status":"active","fine":0.0}"#;

        b.iter(|| serde_json::from_str::<Loan>(black_box(json)))
    });

    group.bench_function("snapshot_to_json", |b| {
        let snapshot = seeded_store(100, 0).export_state().unwrap();

        b.iter(|| black_box(&snapshot).to_json())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_circulation,
    bench_registry,
    bench_snapshot,
    bench_serialization,
);
criterion_main!(benches);
