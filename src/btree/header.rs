//! header reads and writes the header common to every btree node page.
//!
//! Offset	Size	Description
//! 0	    1	    Node type: 0 for internal, 1 for leaf.
//! 1	    1	    Non-zero if this node is the root of the tree.
//! 2	    4	    Page number of the parent node, little-endian.  Unused for the root.

use super::{Error, NodeType};
use crate::pager::PageNum;
use byteorder::{ByteOrder, LittleEndian};

pub const NODE_TYPE_SIZE: usize = std::mem::size_of::<u8>();
pub const NODE_TYPE_OFFSET: usize = 0;
pub const IS_ROOT_SIZE: usize = std::mem::size_of::<u8>();
pub const IS_ROOT_OFFSET: usize = NODE_TYPE_OFFSET + NODE_TYPE_SIZE;
pub const PARENT_POINTER_SIZE: usize = std::mem::size_of::<u32>();
pub const PARENT_POINTER_OFFSET: usize = IS_ROOT_OFFSET + IS_ROOT_SIZE;
pub const COMMON_NODE_HEADER_SIZE: usize = NODE_TYPE_SIZE + IS_ROOT_SIZE + PARENT_POINTER_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub node_type: NodeType,
    pub is_root: bool,
    pub parent_pointer: PageNum,
}

pub fn node_type(page: &[u8]) -> Result<NodeType, Error> {
    NodeType::try_from(page[NODE_TYPE_OFFSET])
}

pub fn set_node_type(page: &mut [u8], t: NodeType) {
    page[NODE_TYPE_OFFSET] = t.into();
}

pub fn is_root(page: &[u8]) -> bool {
    page[IS_ROOT_OFFSET] != 0
}

pub fn set_root(page: &mut [u8], is_root: bool) {
    page[IS_ROOT_OFFSET] = is_root as u8;
}

pub fn parent_pointer(page: &[u8]) -> PageNum {
    LittleEndian::read_u32(&page[PARENT_POINTER_OFFSET..PARENT_POINTER_OFFSET + PARENT_POINTER_SIZE])
}

pub fn set_parent_pointer(page: &mut [u8], pn: PageNum) {
    LittleEndian::write_u32(
        &mut page[PARENT_POINTER_OFFSET..PARENT_POINTER_OFFSET + PARENT_POINTER_SIZE],
        pn,
    );
}

pub fn check_header(page: &[u8]) -> Result<Header, Error> {
    Ok(Header {
        node_type: node_type(page)?,
        is_root: is_root(page),
        parent_pointer: parent_pointer(page),
    })
}

#[test]
fn test_header_size() {
    assert_eq!(COMMON_NODE_HEADER_SIZE, 6);
}

#[test]
fn test_write_then_check_header() {
    let mut page = [0_u8; 16];
    set_node_type(&mut page, NodeType::Leaf);
    set_root(&mut page, true);
    set_parent_pointer(&mut page, 0x0a0b0c0d);
    assert_eq!(&page[..6], &[0x01, 0x01, 0x0d, 0x0c, 0x0b, 0x0a]);
    assert_eq!(
        check_header(&page),
        Ok(Header {
            node_type: NodeType::Leaf,
            is_root: true,
            parent_pointer: 0x0a0b0c0d,
        })
    );
}

#[test]
fn test_zeroed_page_reads_as_internal() {
    let page = [0_u8; 16];
    assert_eq!(node_type(&page), Ok(NodeType::Internal));
    assert!(!is_root(&page));
}

#[test]
fn test_invalid_node_type() {
    let mut page = [0_u8; 16];
    page[0] = 0x0d;
    assert_eq!(check_header(&page), Err(Error::InvalidNodeType(0x0d)));
}
