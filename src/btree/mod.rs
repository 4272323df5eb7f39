/// Every page of the table is a btree node.  Only leaf nodes are implemented: the table is a
/// single root leaf, and anything that would need a second level is reported as unsupported.
///
/// A node page is divided into regions in the following order
/// 1 The 6 byte common node header (node type, root flag, parent pointer)
/// 2 The node-type specific header (for leaves, the 4 byte cell count)
/// 3 The cells, packed with no padding
/// 4 Unused space to the end of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Internal,
    Leaf,
}

impl From<NodeType> for u8 {
    fn from(t: NodeType) -> u8 {
        match t {
            NodeType::Internal => 0,
            NodeType::Leaf => 1,
        }
    }
}

impl TryFrom<u8> for NodeType {
    type Error = Error;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        match b {
            0 => Ok(NodeType::Internal),
            1 => Ok(NodeType::Leaf),
            b => Err(Error::InvalidNodeType(b)),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Btree: Invalid node type byte: {0}")]
    InvalidNodeType(u8),
    #[error("Btree: Unsupported: tree depth exceeds single leaf ({0}).")]
    TreeDepthExceedsSingleLeaf(&'static str),
    #[error("Btree: Leaf claims {0} cells, more than a page can hold.")]
    CellCountOutOfRange(u32),
}

/// module `header` defines the header common to every node page.
pub mod header;
/// module `leaf` provides typed access to the cells of a leaf page, and searching and inserting
/// within it.
pub mod leaf;
