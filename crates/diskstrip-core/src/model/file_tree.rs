/// Arena-backed entry tree with O(n) bottom-up size aggregation.
///
/// All nodes live in a single `Vec<FileNode>`. Relationships between nodes
/// use `NodeIndex` (a thin `u32` wrapper) rather than heap pointers, so the
/// parent link can never become a second owner of a subtree.
use super::file_node::{FileNode, NodeIndex};
use compact_str::CompactString;
use std::path::MAIN_SEPARATOR;

/// The complete tree produced by a scan.
#[derive(Debug, Clone)]
pub struct FileTree {
    /// Arena: every node in a flat, cache-friendly vector.
    pub nodes: Vec<FileNode>,

    /// The scan root. Always index 0.
    pub root: NodeIndex,
}

impl FileTree {
    /// Create a tree containing only a root directory named `root_name`.
    pub fn new(root_name: &str) -> Self {
        Self::with_capacity(root_name, 1)
    }

    /// Create a tree with pre-allocated capacity for `estimated_nodes`.
    pub fn with_capacity(root_name: &str, estimated_nodes: usize) -> Self {
        let mut nodes = Vec::with_capacity(estimated_nodes.max(1));
        nodes.push(FileNode::new_dir(CompactString::new(root_name), None));
        Self {
            nodes,
            root: NodeIndex(0),
        }
    }

    /// Allocate a new node in the arena and return its index.
    ///
    /// The node is not reachable from the root until [`add_child`](Self::add_child)
    /// links it.
    pub fn add_node(&mut self, node: FileNode) -> NodeIndex {
        let idx = NodeIndex::new(self.nodes.len());
        self.nodes.push(node);
        idx
    }

    /// Attach `child` as the last child of `parent`, preserving enumeration order.
    pub fn add_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        debug_assert!(
            self.nodes[parent.idx()].is_dir(),
            "files cannot own children"
        );
        self.nodes[child.idx()].parent = Some(parent);
        self.nodes[child.idx()].next_sibling = None;
        match self.nodes[parent.idx()].last_child {
            Some(last) => self.nodes[last.idx()].next_sibling = Some(child),
            None => self.nodes[parent.idx()].first_child = Some(child),
        }
        self.nodes[parent.idx()].last_child = Some(child);
    }

    /// Compute directory sizes and descendant counts in a single bottom-up pass.
    ///
    /// Children are always allocated after their parent, so iterating in
    /// *reverse* processes every child before its parent: O(n), no recursion.
    /// Directory totals are reset first, so the pass is idempotent.
    ///
    /// Returns the root's total.
    pub fn aggregate_sizes(&mut self) -> u64 {
        for node in self.nodes.iter_mut() {
            if node.is_dir() {
                node.size = 0;
                node.descendant_count = 0;
            }
        }

        for i in (0..self.nodes.len()).rev() {
            let node = &self.nodes[i];
            let Some(parent_idx) = node.parent else {
                continue;
            };
            let size = node.size;
            let files = if node.is_dir() {
                node.descendant_count
            } else {
                1
            };
            let parent = &mut self.nodes[parent_idx.idx()];
            parent.size += size;
            parent.descendant_count += files;
        }

        self.nodes[self.root.idx()].size
    }

    /// Post-order aggregation of the subtree rooted at `index`.
    ///
    /// A file returns its own size; a directory overwrites its size with the
    /// sum of its children's aggregates and returns it.
    pub fn aggregate(&mut self, index: NodeIndex) -> u64 {
        let Some(children) = self.children(index) else {
            return self.nodes[index.idx()].size;
        };

        let mut total = 0u64;
        let mut files = 0u64;
        for child in children {
            total += self.aggregate(child);
            let node = &self.nodes[child.idx()];
            files += if node.is_dir() {
                node.descendant_count
            } else {
                1
            };
        }

        let node = &mut self.nodes[index.idx()];
        node.size = total;
        node.descendant_count = files;
        total
    }

    /// Reconstruct the full path for a node by walking up to the root.
    ///
    /// A root named like a volume (`C:`) gets exactly one separator after it.
    pub fn full_path(&self, index: NodeIndex) -> String {
        let mut segments = Vec::new();
        let mut current = Some(index);
        while let Some(idx) = current {
            segments.push(self.nodes[idx.idx()].name.as_str());
            current = self.nodes[idx.idx()].parent;
        }
        segments.reverse();

        let Some((root, rest)) = segments.split_first() else {
            return MAIN_SEPARATOR.to_string();
        };
        let mut path = root.trim_end_matches(MAIN_SEPARATOR).to_string();
        if rest.is_empty() {
            if path.ends_with(':') || path.is_empty() {
                path.push(MAIN_SEPARATOR);
            }
            return path;
        }
        for segment in rest {
            path.push(MAIN_SEPARATOR);
            path.push_str(segment);
        }
        path
    }

    /// Number of parent hops between `index` and the root.
    pub fn depth(&self, index: NodeIndex) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[index.idx()].parent;
        while let Some(idx) = current {
            depth += 1;
            current = self.nodes[idx.idx()].parent;
        }
        depth
    }

    /// Direct children in enumeration order, or `None` for a file.
    pub fn children(&self, parent: NodeIndex) -> Option<Vec<NodeIndex>> {
        let node = &self.nodes[parent.idx()];
        if !node.is_dir() {
            return None;
        }
        let mut children = Vec::new();
        let mut child = node.first_child;
        while let Some(idx) = child {
            children.push(idx);
            child = self.nodes[idx.idx()].next_sibling;
        }
        Some(children)
    }

    /// Number of direct children (0 for files).
    pub fn child_count(&self, parent: NodeIndex) -> usize {
        let mut count = 0;
        let mut child = self.nodes[parent.idx()].first_child;
        while let Some(idx) = child {
            count += 1;
            child = self.nodes[idx.idx()].next_sibling;
        }
        count
    }

    /// Get the node at the given index.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &FileNode {
        &self.nodes[index.idx()]
    }

    /// The root node.
    #[inline]
    pub fn root_node(&self) -> &FileNode {
        &self.nodes[self.root.idx()]
    }

    /// Total number of nodes in the tree, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds nothing but its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}
