//! CAR block streams for Cairn.
//!
//! A stream is a flat concatenation of records with no header:
//!
//! ```text
//! record := varint(len(body)) body
//! body   := binary CID ++ payload
//! ```
//!
//! The CID is self-delimiting, so the payload is whatever follows it. Its
//! codec selects how the payload is read: raw bytes or a DAG-PB node.
//!
//! - [`CarReader`] -- splits a buffered stream into [`CarRecord`]s (restartable)
//! - [`CarStream`] -- the same over any `std::io::Read`, one pass
//! - [`CarEntry`] -- a record decoded into CID, validated payload and node
//! - [`CarWriter`] -- the inverse: blocks in, stream bytes out

pub mod entry;
pub mod error;
pub mod reader;
pub mod writer;

pub use entry::CarEntry;
pub use error::{CarError, CarResult};
pub use reader::{CarReader, CarRecord, CarStream};
pub use writer::{encode_blocks, record_len, CarWriter};
