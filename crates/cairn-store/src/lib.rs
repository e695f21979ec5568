//! Content-addressed block storage for Cairn.
//!
//! A [`Block`] pairs immutable bytes with the [`Cid`](cairn_types::Cid) that
//! names them. Stores are pure key-value maps from CID to bytes: they never
//! interpret block contents, but they do refuse to hold a block whose bytes
//! do not hash to its CID.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsBlockStore`] -- one file per block under a root directory
//!
//! # Rules
//!
//! 1. Blocks are immutable once written; writing the same block twice is a no-op.
//! 2. `put` verifies the digest before anything is stored.
//! 3. `FsBlockStore` re-verifies on read, so on-disk corruption surfaces as an error.

pub mod block;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use block::Block;
pub use error::{StoreError, StoreResult};
pub use fs::FsBlockStore;
pub use memory::InMemoryBlockStore;
pub use traits::BlockStore;
