//! Foundation types for Cairn.
//!
//! Cairn stores files as a Merkle DAG of immutable, content-addressed
//! blocks. Every other Cairn crate depends on `cairn-types` for the
//! identifier that binds a block to its content.
//!
//! # Key Types
//!
//! - [`Cid`]: content identifier: version, codec, hash algorithm and digest
//! - [`Codec`]: how a block's bytes are interpreted (raw or DAG-PB)
//! - [`HashAlgorithm`]: digest function (SHA-256 only)
//! - [`ContentHasher`]: computes CIDs for raw or DAG-PB content

pub mod cid;
pub mod error;
pub mod hasher;

pub use cid::{Cid, CidVersion, Codec, HashAlgorithm, DIGEST_LEN, V0_PREFIX};
pub use error::{CidError, CidResult};
pub use hasher::ContentHasher;
