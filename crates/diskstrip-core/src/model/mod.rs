/// Data model for the DiskStrip entry tree.
///
/// Re-exports the arena-allocated tree structure and supporting types.
pub mod file_node;
pub mod file_tree;
pub mod size;
pub mod volume;

pub use file_node::{EntryKind, FileNode, NodeIndex};
pub use file_tree::FileTree;
pub use volume::VolumeTag;
