//! Typed access to a page interpreted as a btree leaf.
//!
//! After the common node header, a leaf has a 4 byte cell count and then the cells, sorted
//! ascending by key.  Each cell is a 4 byte little-endian key followed by a serialized row.

use byteorder::{ByteOrder, LittleEndian};

use super::header::{self, COMMON_NODE_HEADER_SIZE};
use super::{Error, NodeType};
use crate::pager::PAGE_SIZE;
use crate::record::{Row, ROW_SIZE};

pub const LEAF_NODE_NUM_CELLS_SIZE: usize = std::mem::size_of::<u32>();
pub const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const LEAF_NODE_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + LEAF_NODE_NUM_CELLS_SIZE;

pub const LEAF_NODE_KEY_SIZE: usize = std::mem::size_of::<u32>();
pub const LEAF_NODE_KEY_OFFSET: usize = 0;
pub const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;
pub const LEAF_NODE_VALUE_OFFSET: usize = LEAF_NODE_KEY_OFFSET + LEAF_NODE_KEY_SIZE;
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const LEAF_NODE_MAX_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;

fn cell_offset(cell_num: u32) -> usize {
    LEAF_NODE_HEADER_SIZE + cell_num as usize * LEAF_NODE_CELL_SIZE
}

/// A view of one page as a leaf node.  Borrow the page immutably to read, or mutably to also
/// initialize and insert.
pub struct LeafNode<B> {
    page: B,
}

impl<B: AsRef<[u8]>> LeafNode<B> {
    pub fn new(page: B) -> LeafNode<B> {
        LeafNode { page }
    }

    fn bytes(&self) -> &[u8] {
        self.page.as_ref()
    }

    pub fn node_type(&self) -> Result<NodeType, Error> {
        header::node_type(self.bytes())
    }

    pub fn is_root(&self) -> bool {
        header::is_root(self.bytes())
    }

    pub fn num_cells(&self) -> u32 {
        LittleEndian::read_u32(
            &self.bytes()
                [LEAF_NODE_NUM_CELLS_OFFSET..LEAF_NODE_NUM_CELLS_OFFSET + LEAF_NODE_NUM_CELLS_SIZE],
        )
    }

    /// Checks that the page really is a leaf whose cells fit on the page.
    pub fn validate(&self) -> Result<(), Error> {
        if self.node_type()? != NodeType::Leaf {
            return Err(Error::TreeDepthExceedsSingleLeaf("searching an internal node"));
        }
        let n = self.num_cells();
        if n as usize > LEAF_NODE_MAX_CELLS {
            return Err(Error::CellCountOutOfRange(n));
        }
        Ok(())
    }

    pub fn cell(&self, cell_num: u32) -> &[u8] {
        let start = cell_offset(cell_num);
        &self.bytes()[start..start + LEAF_NODE_CELL_SIZE]
    }

    pub fn key(&self, cell_num: u32) -> u32 {
        LittleEndian::read_u32(&self.cell(cell_num)[LEAF_NODE_KEY_OFFSET..LEAF_NODE_VALUE_OFFSET])
    }

    pub fn value(&self, cell_num: u32) -> &[u8] {
        &self.cell(cell_num)[LEAF_NODE_VALUE_OFFSET..]
    }

    pub fn row(&self, cell_num: u32) -> Row {
        Row::deserialize(self.value(cell_num))
    }

    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.num_cells()).map(move |i| self.key(i))
    }

    /// Returns the index of the cell holding `key`, or, if there is none, the index at which it
    /// would have to be inserted to keep the cells sorted.
    pub fn find(&self, key: u32) -> u32 {
        let mut min_index = 0;
        let mut one_past_max_index = self.num_cells();
        while one_past_max_index != min_index {
            let index = min_index + (one_past_max_index - min_index) / 2;
            let key_at_index = self.key(index);
            if key == key_at_index {
                return index;
            }
            if key < key_at_index {
                one_past_max_index = index;
            } else {
                min_index = index + 1;
            }
        }
        min_index
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> LeafNode<B> {
    fn bytes_mut(&mut self) -> &mut [u8] {
        self.page.as_mut()
    }

    /// Makes the page an empty, non-root leaf.
    pub fn initialize(&mut self) {
        header::set_node_type(self.bytes_mut(), NodeType::Leaf);
        header::set_root(self.bytes_mut(), false);
        header::set_parent_pointer(self.bytes_mut(), 0);
        self.set_num_cells(0);
    }

    pub fn set_root(&mut self, is_root: bool) {
        header::set_root(self.bytes_mut(), is_root);
    }

    pub fn set_num_cells(&mut self, n: u32) {
        LittleEndian::write_u32(
            &mut self.bytes_mut()
                [LEAF_NODE_NUM_CELLS_OFFSET..LEAF_NODE_NUM_CELLS_OFFSET + LEAF_NODE_NUM_CELLS_SIZE],
            n,
        );
    }

    pub fn cell_mut(&mut self, cell_num: u32) -> &mut [u8] {
        let start = cell_offset(cell_num);
        &mut self.bytes_mut()[start..start + LEAF_NODE_CELL_SIZE]
    }

    pub fn set_key(&mut self, cell_num: u32, key: u32) {
        LittleEndian::write_u32(
            &mut self.cell_mut(cell_num)[LEAF_NODE_KEY_OFFSET..LEAF_NODE_VALUE_OFFSET],
            key,
        );
    }

    pub fn value_mut(&mut self, cell_num: u32) -> &mut [u8] {
        &mut self.cell_mut(cell_num)[LEAF_NODE_VALUE_OFFSET..]
    }

    /// Inserts `(key, row)` as cell `cell_num`, moving the cells at and after it one slot right.
    ///
    /// The caller picks `cell_num` with `find`, so the cells stay sorted.  A full leaf would have
    /// to be split, which is not supported.
    pub fn insert(&mut self, cell_num: u32, key: u32, row: &Row) -> Result<(), Error> {
        let num_cells = self.num_cells();
        if num_cells as usize >= LEAF_NODE_MAX_CELLS {
            return Err(Error::TreeDepthExceedsSingleLeaf("splitting a full leaf"));
        }
        if cell_num < num_cells {
            let start = cell_offset(cell_num);
            let end = cell_offset(num_cells);
            self.bytes_mut()
                .copy_within(start..end, start + LEAF_NODE_CELL_SIZE);
        }
        self.set_num_cells(num_cells + 1);
        self.set_key(cell_num, key);
        row.serialize(self.value_mut(cell_num));
        Ok(())
    }
}

#[cfg(test)]
fn new_leaf() -> LeafNode<Vec<u8>> {
    let mut leaf = LeafNode::new(vec![0_u8; PAGE_SIZE]);
    leaf.initialize();
    leaf
}

#[cfg(test)]
fn row(id: u32) -> Row {
    Row::new(id, &format!("user{}", id), &format!("person{}@example.com", id)).unwrap()
}

#[test]
fn test_layout_constants() {
    assert_eq!(LEAF_NODE_HEADER_SIZE, 10);
    assert_eq!(LEAF_NODE_CELL_SIZE, 297);
    assert_eq!(LEAF_NODE_SPACE_FOR_CELLS, 4086);
    assert_eq!(LEAF_NODE_MAX_CELLS, 13);
}

#[test]
fn test_initialize_header_bytes() {
    use hex::FromHex;
    let mut leaf = new_leaf();
    leaf.set_root(true);
    let expected: Vec<u8> = Vec::from_hex("01010000000000000000").expect("Invalid Hex String");
    assert_eq!(&leaf.bytes()[..LEAF_NODE_HEADER_SIZE], &expected[..]);
    assert_eq!(leaf.node_type(), Ok(NodeType::Leaf));
    assert_eq!(leaf.num_cells(), 0);
    assert!(leaf.validate().is_ok());
}

#[test]
fn test_cell_bytes() {
    use hex::FromHex;
    let mut leaf = new_leaf();
    leaf.insert(0, 0x0102, &row(0x0102)).unwrap();
    let expected: Vec<u8> = Vec::from_hex("01000000000001000000").expect("Invalid Hex String");
    assert_eq!(&leaf.bytes()[..LEAF_NODE_HEADER_SIZE], &expected[..]);
    // Key, then the row, which repeats the id.
    assert_eq!(&leaf.cell(0)[..8], &[0x02, 0x01, 0, 0, 0x02, 0x01, 0, 0]);
    assert_eq!(leaf.row(0), row(0x0102));
}

#[test]
fn test_find_on_empty_leaf() {
    let leaf = new_leaf();
    assert_eq!(leaf.find(0), 0);
    assert_eq!(leaf.find(42), 0);
}

#[test]
fn test_find_returns_match_or_insertion_point() {
    let mut leaf = new_leaf();
    for (i, k) in [10, 20, 30, 40].iter().enumerate() {
        leaf.insert(i as u32, *k, &row(*k)).unwrap();
    }
    assert_eq!(leaf.find(5), 0);
    assert_eq!(leaf.find(10), 0);
    assert_eq!(leaf.find(15), 1);
    assert_eq!(leaf.find(30), 2);
    assert_eq!(leaf.find(35), 3);
    assert_eq!(leaf.find(40), 3);
    assert_eq!(leaf.find(u32::MAX), 4);
}

#[test]
fn test_insert_keeps_cells_sorted() {
    let mut leaf = new_leaf();
    for k in [5, 1, 9, 3, 7] {
        let at = leaf.find(k);
        leaf.insert(at, k, &row(k)).unwrap();
    }
    assert_eq!(leaf.keys().collect::<Vec<u32>>(), vec![1, 3, 5, 7, 9]);
    for i in 0..leaf.num_cells() {
        assert_eq!(leaf.row(i), row(leaf.key(i)));
    }
}

#[test]
fn test_insert_into_full_leaf() {
    let mut leaf = new_leaf();
    for k in 0..LEAF_NODE_MAX_CELLS as u32 {
        leaf.insert(k, k, &row(k)).unwrap();
    }
    assert_eq!(
        leaf.insert(0, 100, &row(100)),
        Err(Error::TreeDepthExceedsSingleLeaf("splitting a full leaf"))
    );
    assert_eq!(leaf.num_cells(), LEAF_NODE_MAX_CELLS as u32);
    assert_eq!(leaf.key(0), 0);
}

#[test]
fn test_validate_rejects_internal_and_oversized() {
    let mut leaf = new_leaf();
    header::set_node_type(leaf.bytes_mut(), NodeType::Internal);
    assert_eq!(
        leaf.validate(),
        Err(Error::TreeDepthExceedsSingleLeaf("searching an internal node"))
    );
    let mut leaf = new_leaf();
    leaf.set_num_cells(14);
    assert_eq!(leaf.validate(), Err(Error::CellCountOutOfRange(14)));
}
