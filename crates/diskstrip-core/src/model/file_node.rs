/// A single node in the arena-allocated entry tree.
///
/// Nodes are stored in a flat `Vec<FileNode>` owned by [`FileTree`](super::FileTree).
/// Parent-child relationships use indices rather than pointers: the parent
/// link is a plain lookup key used to rebuild paths, never an owner.
use compact_str::CompactString;
use serde::Serialize;

/// Lightweight index into the arena `Vec<FileNode>`.
///
/// Uses `u32` to keep nodes small; supports up to ~4 billion nodes,
/// which is more than enough for any real filesystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Create a new `NodeIndex` from a `usize`, panicking if it exceeds `u32::MAX`.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "NodeIndex overflow");
        Self(index as u32)
    }

    /// Return the index as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Whether an entry is a plain file or a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Directory => "Directory",
        }
    }
}

/// A single file or directory in the tree.
///
/// Children are linked via `first_child` / `next_sibling` in enumeration
/// order; `last_child` makes appending O(1). Files never carry child links.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// File or directory name only (NOT the full path).
    /// The root carries the scan root itself, e.g. `C:`.
    pub name: CompactString,

    pub kind: EntryKind,

    /// Logical size in bytes. Set at discovery for files; for directories
    /// this is overwritten by aggregation with the sum of the children.
    pub size: u64,

    /// Index of the parent node. `None` for the scan root.
    pub parent: Option<NodeIndex>,

    pub first_child: Option<NodeIndex>,
    pub last_child: Option<NodeIndex>,

    /// Next sibling under the same parent.
    pub next_sibling: Option<NodeIndex>,

    /// Total number of descendant *files* (not directories).
    pub descendant_count: u64,
}

impl FileNode {
    /// Create a new file node with the given name and size.
    pub fn new_file(name: CompactString, size: u64, parent: Option<NodeIndex>) -> Self {
        Self {
            name,
            kind: EntryKind::File,
            size,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
            descendant_count: 0,
        }
    }

    /// Create a new, empty directory node.
    pub fn new_dir(name: CompactString, parent: Option<NodeIndex>) -> Self {
        Self {
            name,
            kind: EntryKind::Directory,
            size: 0,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
            descendant_count: 0,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}
