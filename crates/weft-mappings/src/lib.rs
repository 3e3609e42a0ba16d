//! Multi-namespace symbol mappings for the weft toolchain.

pub mod hash;
pub mod merge;
pub mod namespace;
pub mod remap;
pub mod rename;
pub mod tree;

pub use hash::{hash_tree, hash_trees, to_hex};
pub use merge::{merge_trees, FillPolicy, MergeOptions};
pub use namespace::Namespaces;
pub use remap::remap_descriptor;
pub use rename::{rename_table, RenameTable};
pub use tree::{ArgEntry, ClassEntry, FieldEntry, MappingTree, MethodEntry, VarEntry};
