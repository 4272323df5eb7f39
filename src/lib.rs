//! leafdb stores rows of `(id, username, email)` in a single file, keyed by `id`.
//!
//! The whole table lives in one B-tree leaf node on page 0 of the file.  The layers, bottom up:
//! `pager` caches fixed size pages, `btree` interprets a page as a node, `table` and `cursor`
//! walk the leaf, `execute` runs statements, and `repl` drives it all from lines of input.

pub mod ast;
pub mod btree;
pub mod config;
pub mod cursor;
pub mod execute;
pub mod formatting;
pub mod pager;
pub mod parser;
pub mod pt_to_ast;
pub mod record;
pub mod repl;
pub mod table;

extern crate pest;
#[macro_use]
extern crate pest_derive;

use std::path::Path;

pub use record::Row;
pub use table::Table;

/// Opens the database file at `path`, creating it if needed.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Table, table::Error> {
    Table::open(path)
}

/// Writes every cached page of `table` back to its file.
pub fn close(table: Table) -> Result<(), table::Error> {
    table.close()
}

#[test]
fn test_open_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lib.db");
    let mut table = open(&path).expect("Should have opened database.");
    execute::execute_insert(&mut table, &Row::new(9, "nine", "nine@example.com").unwrap())
        .unwrap();
    close(table).expect("Should have closed database.");
    assert_eq!(
        std::fs::metadata(&path).unwrap().len(),
        pager::PAGE_SIZE as u64
    );
    let mut table = open(&path).unwrap();
    let rows = execute::execute_select(&mut table).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username(), "nine");
}
