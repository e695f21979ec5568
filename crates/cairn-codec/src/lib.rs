//! Binary codecs for Cairn.
//!
//! Everything here is implemented directly over byte slices, with no schema
//! compiler:
//!
//! - [`varint`]: 7-bit-group, little-endian unsigned integers
//! - [`wire`]: tag/length/value records (varint, fixed64, length-delimited)
//! - [`dag_pb`]: directory/file graph nodes and their links
//! - [`unixfs`]: the per-node type metadata carried as inline data
//!
//! Link records always precede the data record in an encoded node. A node's
//! CID is computed over that exact serialization, so the ordering is part of
//! the format.

pub mod dag_pb;
pub mod error;
pub mod unixfs;
pub mod varint;
pub mod wire;

pub use dag_pb::{PbLink, PbNode};
pub use error::{CodecError, CodecResult};
pub use unixfs::{UnixFsData, UnixFsKind, DIRECTORY_MARKER};
pub use wire::{Field, FieldReader, FieldValue, WireType};
