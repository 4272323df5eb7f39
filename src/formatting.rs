//! formatting prints rows and the diagnostic dumps of the meta-commands.

use std::io::Write;

use crate::btree::header::COMMON_NODE_HEADER_SIZE;
use crate::btree::leaf::{
    LeafNode, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_SPACE_FOR_CELLS,
};
use crate::record::{Row, ROW_SIZE};

pub fn print_row<W: Write>(out: &mut W, row: &Row) -> std::io::Result<()> {
    writeln!(out, "{}", row)
}

pub fn print_constants<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "ROW_SIZE: {}", ROW_SIZE)?;
    writeln!(out, "COMMON_NODE_HEADER_SIZE: {}", COMMON_NODE_HEADER_SIZE)?;
    writeln!(out, "LEAF_NODE_HEADER_SIZE: {}", LEAF_NODE_HEADER_SIZE)?;
    writeln!(out, "LEAF_NODE_CELL_SIZE: {}", LEAF_NODE_CELL_SIZE)?;
    writeln!(out, "LEAF_NODE_SPACE_FOR_CELLS: {}", LEAF_NODE_SPACE_FOR_CELLS)?;
    writeln!(out, "LEAF_NODE_MAX_CELLS: {}", LEAF_NODE_MAX_CELLS)
}

pub fn print_leaf_node<W: Write, B: AsRef<[u8]>>(
    out: &mut W,
    leaf: &LeafNode<B>,
) -> std::io::Result<()> {
    writeln!(out, "leaf (size {})", leaf.num_cells())?;
    for (i, key) in leaf.keys().enumerate() {
        writeln!(out, "  - {} : {}", i, key)?;
    }
    Ok(())
}

#[test]
fn test_print_constants() {
    let mut out = vec![];
    print_constants(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "ROW_SIZE: 293\n\
         COMMON_NODE_HEADER_SIZE: 6\n\
         LEAF_NODE_HEADER_SIZE: 10\n\
         LEAF_NODE_CELL_SIZE: 297\n\
         LEAF_NODE_SPACE_FOR_CELLS: 4086\n\
         LEAF_NODE_MAX_CELLS: 13\n"
    );
}

#[test]
fn test_print_leaf_node() {
    let mut leaf = LeafNode::new(vec![0_u8; crate::pager::PAGE_SIZE]);
    leaf.initialize();
    for k in [3, 1, 2] {
        let at = leaf.find(k);
        leaf.insert(at, k, &Row::new(k, "u", "e").unwrap()).unwrap();
    }
    let mut out = vec![];
    print_leaf_node(&mut out, &leaf).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "leaf (size 3)\n  - 0 : 1\n  - 1 : 2\n  - 2 : 3\n"
    );
}

#[test]
fn test_print_row() {
    let mut out = vec![];
    print_row(&mut out, &Row::new(1, "user1", "person1@example.com").unwrap()).unwrap();
    assert_eq!(out, b"[1, user1, person1@example.com]\n");
}
