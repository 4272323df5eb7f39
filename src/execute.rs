//! Runs prepared statements against the table.

use tracing::debug;

use crate::btree::leaf::LEAF_NODE_MAX_CELLS;
use crate::record::Row;
use crate::table::{Error, Table};

/// Outcome of an insert.  Everything other than `Success` leaves the table unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteResult {
    Success,
    DuplicateKey,
    TableFull,
}

impl std::fmt::Display for ExecuteResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteResult::Success => f.write_str("Executed."),
            ExecuteResult::DuplicateKey => f.write_str("Error: Duplicate key."),
            ExecuteResult::TableFull => f.write_str("Error: Table full."),
        }
    }
}

pub fn execute_insert(table: &mut Table, row: &Row) -> Result<ExecuteResult, Error> {
    let num_cells = table.root_leaf()?.num_cells();
    if num_cells as usize >= LEAF_NODE_MAX_CELLS {
        return Ok(ExecuteResult::TableFull);
    }

    let key_to_insert = row.id();
    let mut cursor = table.find(key_to_insert)?;
    if cursor.key()? == Some(key_to_insert) {
        return Ok(ExecuteResult::DuplicateKey);
    }
    cursor.insert(key_to_insert, row)?;
    debug!(id = key_to_insert, "inserted row");
    Ok(ExecuteResult::Success)
}

/// Returns every row, in ascending id order.
pub fn execute_select(table: &mut Table) -> Result<Vec<Row>, Error> {
    let mut rows = vec![];
    let mut cursor = table.start()?;
    while !cursor.end_of_table() {
        if let Some(row) = cursor.row()? {
            rows.push(row);
        }
        cursor.advance()?;
    }
    Ok(rows)
}

#[cfg(test)]
fn row(id: u32) -> Row {
    Row::new(id, &format!("user{}", id), &format!("person{}@example.com", id)).unwrap()
}

#[cfg(test)]
fn scratch_path() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("Should have made a temp dir.");
    let path = dir.path().join("execute.db");
    (dir, path)
}

#[test]
fn test_insert_and_select_two_rows() {
    let (_dir, path) = scratch_path();
    let mut table = Table::open(&path).unwrap();
    assert_eq!(execute_insert(&mut table, &row(1)).unwrap(), ExecuteResult::Success);
    assert_eq!(execute_insert(&mut table, &row(2)).unwrap(), ExecuteResult::Success);
    assert_eq!(execute_select(&mut table).unwrap(), vec![row(1), row(2)]);
}

#[test]
fn test_select_empty_table() {
    let (_dir, path) = scratch_path();
    let mut table = Table::open(&path).unwrap();
    assert!(execute_select(&mut table).unwrap().is_empty());
}

#[test]
fn test_rows_come_back_sorted() {
    let (_dir, path) = scratch_path();
    let mut table = Table::open(&path).unwrap();
    for id in [8, 3, 12, 1, 5, 0, 9] {
        assert_eq!(execute_insert(&mut table, &row(id)).unwrap(), ExecuteResult::Success);
    }
    let ids: Vec<u32> = execute_select(&mut table)
        .unwrap()
        .iter()
        .map(|r| r.id())
        .collect();
    assert_eq!(ids, vec![0, 1, 3, 5, 8, 9, 12]);
}

#[test]
fn test_duplicate_key_keeps_original_row() {
    let (_dir, path) = scratch_path();
    let mut table = Table::open(&path).unwrap();
    execute_insert(&mut table, &row(1)).unwrap();
    execute_insert(&mut table, &row(2)).unwrap();
    let imposter = Row::new(1, "someone", "else@example.com").unwrap();
    assert_eq!(
        execute_insert(&mut table, &imposter).unwrap(),
        ExecuteResult::DuplicateKey
    );
    assert_eq!(execute_select(&mut table).unwrap(), vec![row(1), row(2)]);
}

#[test]
fn test_table_full() {
    let (_dir, path) = scratch_path();
    let mut table = Table::open(&path).unwrap();
    for id in 0..LEAF_NODE_MAX_CELLS as u32 {
        assert_eq!(execute_insert(&mut table, &row(id)).unwrap(), ExecuteResult::Success);
    }
    assert_eq!(
        execute_insert(&mut table, &row(1000)).unwrap(),
        ExecuteResult::TableFull
    );
    // Even a duplicate reports a full table first.
    assert_eq!(execute_insert(&mut table, &row(0)).unwrap(), ExecuteResult::TableFull);
    assert_eq!(
        table.root_leaf().unwrap().num_cells(),
        LEAF_NODE_MAX_CELLS as u32
    );
    table.close().unwrap();

    let mut table = Table::open(&path).unwrap();
    assert_eq!(
        table.root_leaf().unwrap().num_cells(),
        LEAF_NODE_MAX_CELLS as u32
    );
    let ids: Vec<u32> = execute_select(&mut table).unwrap().iter().map(|r| r.id()).collect();
    assert_eq!(ids, (0..LEAF_NODE_MAX_CELLS as u32).collect::<Vec<u32>>());
}

#[test]
fn test_rows_survive_reopen() {
    let (_dir, path) = scratch_path();
    let mut table = Table::open(&path).unwrap();
    for id in [3, 1, 2] {
        execute_insert(&mut table, &row(id)).unwrap();
    }
    let before = execute_select(&mut table).unwrap();
    table.close().unwrap();

    let mut table = Table::open(&path).unwrap();
    assert_eq!(execute_select(&mut table).unwrap(), before);
    assert_eq!(execute_insert(&mut table, &row(4)).unwrap(), ExecuteResult::Success);
    table.close().unwrap();

    let mut table = Table::open(&path).unwrap();
    let ids: Vec<u32> = execute_select(&mut table)
        .unwrap()
        .iter()
        .map(|r| r.id())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}
