//! represents the single table stored in a database file.
//!
//! The table is a btree whose root is page 0.  Only a single leaf is supported, so the root is
//! also the only page holding rows.

use std::path::Path;

use tracing::{debug, info};

use crate::btree::leaf::LeafNode;
use crate::cursor::Cursor;
use crate::pager::{self, Page, PageNum, Pager};

pub const ROOT_PAGE_NUM: PageNum = 0;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Pager(#[from] pager::Error),
    #[error("{0}")]
    Btree(#[from] crate::btree::Error),
}

pub struct Table {
    pager: Pager,
    root_page_num: PageNum,
}

impl Table {
    /// Opens the table stored in `path`.  A new or empty file gets an empty root leaf.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Table, Error> {
        let mut pager = Pager::open(path)?;
        if pager.num_pages() == 0 {
            // New database file.  Initialize page 0 as leaf node.
            let mut root = LeafNode::new(pager.get_page(ROOT_PAGE_NUM)?);
            root.initialize();
            root.set_root(true);
            info!("initialized empty root leaf");
        }
        Ok(Table {
            pager,
            root_page_num: ROOT_PAGE_NUM,
        })
    }

    /// Writes every page back to the file and closes it.
    pub fn close(self) -> Result<(), Error> {
        self.pager.close()?;
        Ok(())
    }

    pub fn root_page_num(&self) -> PageNum {
        self.root_page_num
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Borrows page `pn` as a leaf, checking that it is one.
    pub fn leaf(&mut self, pn: PageNum) -> Result<LeafNode<&mut Page>, Error> {
        let leaf = LeafNode::new(self.pager.get_page(pn)?);
        leaf.validate()?;
        Ok(leaf)
    }

    pub fn root_leaf(&mut self) -> Result<LeafNode<&mut Page>, Error> {
        self.leaf(self.root_page_num)
    }

    /// A cursor at the first row of the table.
    pub fn start(&mut self) -> Result<Cursor<'_>, Error> {
        let page_num = self.root_page_num;
        let num_cells = self.leaf(page_num)?.num_cells();
        Ok(Cursor::new(self, page_num, 0, num_cells == 0))
    }

    /// A cursor at the row with id `key`, or at the position where it would be inserted.
    ///
    /// Fails with an unsupported error if the root is not a leaf.
    pub fn find(&mut self, key: u32) -> Result<Cursor<'_>, Error> {
        let page_num = self.root_page_num;
        let leaf = self.leaf(page_num)?;
        let cell_num = leaf.find(key);
        let end_of_table = cell_num == leaf.num_cells();
        debug!(key, page = page_num, cell = cell_num, "found position");
        Ok(Cursor::new(self, page_num, cell_num, end_of_table))
    }
}

#[cfg(test)]
fn scratch_path() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("Should have made a temp dir.");
    let path = dir.path().join("table.db");
    (dir, path)
}

#[test]
fn test_open_initializes_root_leaf() {
    use crate::btree::NodeType;
    let (_dir, path) = scratch_path();
    let mut table = Table::open(&path).expect("Should have opened table.");
    assert_eq!(table.root_page_num(), 0);
    assert_eq!(table.pager().num_pages(), 1);
    let root = table.root_leaf().expect("Should have gotten root leaf.");
    assert_eq!(root.node_type(), Ok(NodeType::Leaf));
    assert!(root.is_root());
    assert_eq!(root.num_cells(), 0);
}

#[test]
fn test_close_writes_one_page() {
    let (_dir, path) = scratch_path();
    let table = Table::open(&path).expect("Should have opened table.");
    table.close().expect("Should have closed table.");
    let len = std::fs::metadata(&path).expect("Should have stat'd file.").len();
    assert_eq!(len, crate::pager::PAGE_SIZE as u64);
}

#[test]
fn test_start_on_empty_table() {
    let (_dir, path) = scratch_path();
    let mut table = Table::open(&path).expect("Should have opened table.");
    let cursor = table.start().expect("Should have gotten cursor.");
    assert!(cursor.end_of_table());
    assert_eq!(cursor.cell_num(), 0);
}

#[test]
fn test_find_on_internal_root_is_unsupported() {
    use crate::btree::{header, Error as BtreeError, NodeType};
    let (_dir, path) = scratch_path();
    let mut table = Table::open(&path).expect("Should have opened table.");
    header::set_node_type(
        &mut table.pager.get_page(0).expect("Should have gotten page")[..],
        NodeType::Internal,
    );
    assert!(matches!(
        table.find(1),
        Err(Error::Btree(BtreeError::TreeDepthExceedsSingleLeaf(_)))
    ));
}
