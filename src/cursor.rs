//! A position in the table, used to search for, insert and scan rows.
//!
//! A cursor borrows the table for the one operation that uses it, so it can never outlive the
//! pages it points into.

use crate::pager::PageNum;
use crate::record::Row;
use crate::table::{Error, Table};

pub struct Cursor<'t> {
    table: &'t mut Table,
    page_num: PageNum,
    cell_num: u32,
    // Indicates a position one past the last element.
    end_of_table: bool,
}

impl<'t> Cursor<'t> {
    pub(crate) fn new(
        table: &'t mut Table,
        page_num: PageNum,
        cell_num: u32,
        end_of_table: bool,
    ) -> Cursor<'t> {
        Cursor {
            table,
            page_num,
            cell_num,
            end_of_table,
        }
    }

    pub fn page_num(&self) -> PageNum {
        self.page_num
    }

    pub fn cell_num(&self) -> u32 {
        self.cell_num
    }

    pub fn end_of_table(&self) -> bool {
        self.end_of_table
    }

    /// The key of the cell under the cursor, or `None` past the last cell.
    pub fn key(&mut self) -> Result<Option<u32>, Error> {
        let leaf = self.table.leaf(self.page_num)?;
        if self.cell_num >= leaf.num_cells() {
            return Ok(None);
        }
        Ok(Some(leaf.key(self.cell_num)))
    }

    /// The row in the cell under the cursor, or `None` past the last cell.
    pub fn row(&mut self) -> Result<Option<Row>, Error> {
        let leaf = self.table.leaf(self.page_num)?;
        if self.cell_num >= leaf.num_cells() {
            return Ok(None);
        }
        Ok(Some(leaf.row(self.cell_num)))
    }

    pub fn advance(&mut self) -> Result<(), Error> {
        let num_cells = self.table.leaf(self.page_num)?.num_cells();
        self.cell_num += 1;
        if self.cell_num >= num_cells {
            self.end_of_table = true;
        }
        Ok(())
    }

    /// Inserts `(key, row)` at the cursor position.
    pub fn insert(&mut self, key: u32, row: &Row) -> Result<(), Error> {
        self.table
            .leaf(self.page_num)?
            .insert(self.cell_num, key, row)?;
        Ok(())
    }
}

#[cfg(test)]
fn scratch_table() -> (tempfile::TempDir, Table) {
    let dir = tempfile::tempdir().expect("Should have made a temp dir.");
    let table = Table::open(dir.path().join("cursor.db")).expect("Should have opened table.");
    (dir, table)
}

#[cfg(test)]
fn row(id: u32) -> Row {
    Row::new(id, &format!("user{}", id), &format!("person{}@example.com", id)).unwrap()
}

#[test]
fn test_find_then_insert() {
    let (_dir, mut table) = scratch_table();
    for id in [20, 10, 30] {
        let mut cursor = table.find(id).expect("Should have found position.");
        assert!(cursor.end_of_table() || cursor.key().unwrap() != Some(id));
        cursor.insert(id, &row(id)).expect("Should have inserted.");
    }
    let mut cursor = table.find(20).expect("Should have found position.");
    assert_eq!(cursor.cell_num(), 1);
    assert!(!cursor.end_of_table());
    assert_eq!(cursor.key().unwrap(), Some(20));
    assert_eq!(cursor.row().unwrap(), Some(row(20)));

    let mut cursor = table.find(40).expect("Should have found position.");
    assert_eq!(cursor.cell_num(), 3);
    assert!(cursor.end_of_table());
    assert_eq!(cursor.key().unwrap(), None);
}

#[test]
fn test_advance_reaches_end_of_table() {
    let (_dir, mut table) = scratch_table();
    for id in 1..=3 {
        table.find(id).unwrap().insert(id, &row(id)).unwrap();
    }
    let mut cursor = table.start().expect("Should have gotten cursor.");
    let mut seen = vec![];
    while !cursor.end_of_table() {
        seen.push(cursor.row().unwrap().unwrap().id());
        cursor.advance().unwrap();
    }
    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(cursor.cell_num(), 3);
    assert_eq!(cursor.page_num(), 0);
}
