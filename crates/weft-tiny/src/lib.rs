//! Tiny-V2 text codec for weft mapping trees.
//!
//! One reader/writer pair serves every caller; round trips through
//! [`write_tree`] and [`read_tree`] are byte-for-byte stable.

pub mod escape;
pub mod read;
pub mod write;

pub use read::{read_file, read_tree};
pub use write::{write_file, write_tree};
