//! UnixFS metadata: the inline data that tells a directory node apart from
//! a plain data node.
//!
//! Cairn only ever produces the directory form, whose encoding is the two
//! bytes [`DIRECTORY_MARKER`]. Other kinds are decoded so that externally
//! produced nodes can be inspected.

use crate::error::{CodecError, CodecResult};
use crate::wire::{self, FieldValue};

/// Encoded UnixFS metadata of a directory node: field 1 (type) = 1.
pub const DIRECTORY_MARKER: [u8; 2] = [0x08, 0x01];

const FIELD_TYPE: u64 = 1;
const FIELD_DATA: u64 = 2;
const FIELD_FILE_SIZE: u64 = 3;

/// UnixFS node kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnixFsKind {
    Raw,
    Directory,
    File,
    Metadata,
    Symlink,
    HamtShard,
}

impl UnixFsKind {
    pub fn code(&self) -> u64 {
        match self {
            Self::Raw => 0,
            Self::Directory => 1,
            Self::File => 2,
            Self::Metadata => 3,
            Self::Symlink => 4,
            Self::HamtShard => 5,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Raw),
            1 => Some(Self::Directory),
            2 => Some(Self::File),
            3 => Some(Self::Metadata),
            4 => Some(Self::Symlink),
            5 => Some(Self::HamtShard),
            _ => None,
        }
    }
}

/// Decoded UnixFS metadata record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnixFsData {
    pub kind: UnixFsKind,
    pub data: Option<Vec<u8>>,
    pub file_size: Option<u64>,
}

impl UnixFsData {
    /// Metadata for a directory node.
    pub fn directory() -> Self {
        Self {
            kind: UnixFsKind::Directory,
            data: None,
            file_size: None,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == UnixFsKind::Directory
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        wire::encode_field(&mut out, FIELD_TYPE, FieldValue::Varint(self.kind.code()));
        if let Some(data) = &self.data {
            wire::encode_field(&mut out, FIELD_DATA, FieldValue::Bytes(data));
        }
        if let Some(size) = self.file_size {
            wire::encode_field(&mut out, FIELD_FILE_SIZE, FieldValue::Varint(size));
        }
        out
    }

    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let mut kind = None;
        let mut data = None;
        let mut file_size = None;

        for field in wire::decode_fields(bytes) {
            let field = field?;
            match (field.number, field.value) {
                (FIELD_TYPE, FieldValue::Varint(code)) => {
                    kind = Some(UnixFsKind::from_code(code).ok_or_else(|| {
                        CodecError::MalformedMetadata(format!("unknown node type {code}"))
                    })?);
                }
                (FIELD_DATA, FieldValue::Bytes(b)) => data = Some(b.to_vec()),
                (FIELD_FILE_SIZE, FieldValue::Varint(size)) => file_size = Some(size),
                (FIELD_TYPE | FIELD_DATA | FIELD_FILE_SIZE, other) => {
                    return Err(CodecError::MalformedMetadata(format!(
                        "field {} has wire type {:?}",
                        field.number,
                        other.wire_type()
                    )));
                }
                _ => {}
            }
        }

        let kind =
            kind.ok_or_else(|| CodecError::MalformedMetadata("missing node type".into()))?;
        Ok(Self {
            kind,
            data,
            file_size,
        })
    }
}
