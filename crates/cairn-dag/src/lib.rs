//! Merkle DAG construction for Cairn.
//!
//! [`DagBuilder::build`] turns a list of `(path, content)` files into the
//! flat list of blocks a store must hold for the whole tree to be
//! retrievable from its root CID:
//!
//! - every file becomes a raw block
//! - every directory becomes a DAG-PB node with one link per entry, in the
//!   order entries were first seen
//! - blocks are listed children first, so a directory never precedes a block
//!   it links to
//!
//! The directory structure is collected in a [`DirTree`], an arena of
//! directories addressed by [`DirId`].

pub mod builder;
pub mod error;
pub mod tree;

pub use builder::{BuildOutput, DagBuilder, InputFile};
pub use error::{DagError, DagResult};
pub use tree::{DirId, DirTree, Entry};
