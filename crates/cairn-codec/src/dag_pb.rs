//! DAG-PB nodes: optional inline data plus an ordered list of named,
//! sized, content-addressed links.
//!
//! Wire layout of a node:
//!
//! ```text
//! repeated  field 2 (bytes): PbLink
//! optional  field 1 (bytes): data
//! ```
//!
//! and of a link:
//!
//! ```text
//! field 1 (bytes):  binary CID
//! field 2 (bytes):  UTF-8 name
//! field 3 (varint): size of the referenced block
//! ```
//!
//! Links are written before data and in list order. Decoding keeps links in
//! encounter order; nothing is ever sorted.

use cairn_types::Cid;

use crate::error::{CodecError, CodecResult};
use crate::unixfs::UnixFsData;
use crate::wire::{self, FieldValue};

const NODE_DATA: u64 = 1;
const NODE_LINK: u64 = 2;

const LINK_CID: u64 = 1;
const LINK_NAME: u64 = 2;
const LINK_SIZE: u64 = 3;

/// A named reference from one node to another block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PbLink {
    pub cid: Cid,
    pub name: String,
    /// Byte length of the referenced block.
    pub size: u64,
}

impl PbLink {
    pub fn new(name: impl Into<String>, cid: Cid, size: u64) -> Self {
        Self {
            cid,
            name: name.into(),
            size,
        }
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        wire::encode_field(&mut out, LINK_CID, FieldValue::Bytes(&self.cid.to_bytes()));
        wire::encode_field(&mut out, LINK_NAME, FieldValue::Bytes(self.name.as_bytes()));
        wire::encode_field(&mut out, LINK_SIZE, FieldValue::Varint(self.size));
        out
    }

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let mut cid = None;
        let mut name = None;
        let mut size = None;

        for field in wire::decode_fields(bytes) {
            let field = field?;
            match (field.number, field.value) {
                (LINK_CID, FieldValue::Bytes(b)) => cid = Some(Cid::from_bytes(b)?),
                (LINK_NAME, FieldValue::Bytes(b)) => {
                    let s = std::str::from_utf8(b).map_err(|e| {
                        CodecError::MalformedNode(format!("link name is not UTF-8: {e}"))
                    })?;
                    name = Some(s.to_owned());
                }
                (LINK_SIZE, FieldValue::Varint(v)) => size = Some(v),
                (LINK_CID | LINK_NAME | LINK_SIZE, other) => {
                    return Err(CodecError::MalformedNode(format!(
                        "link field {} has wire type {:?}",
                        field.number,
                        other.wire_type()
                    )));
                }
                _ => {}
            }
        }

        match (cid, name, size) {
            (Some(cid), Some(name), Some(size)) => Ok(Self { cid, name, size }),
            (None, _, _) => Err(CodecError::MalformedNode("link missing cid".into())),
            (_, None, _) => Err(CodecError::MalformedNode("link missing name".into())),
            (_, _, None) => Err(CodecError::MalformedNode("link missing size".into())),
        }
    }
}

/// A DAG-PB node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PbNode {
    pub data: Option<Vec<u8>>,
    pub links: Vec<PbLink>,
}

impl PbNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory node: the UnixFS directory marker as data, one link per entry.
    pub fn directory(links: Vec<PbLink>) -> Self {
        Self {
            data: Some(UnixFsData::directory().encode()),
            links,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for link in &self.links {
            wire::encode_field(&mut out, NODE_LINK, FieldValue::Bytes(&link.encode()));
        }
        if let Some(data) = &self.data {
            wire::encode_field(&mut out, NODE_DATA, FieldValue::Bytes(data));
        }
        out
    }

    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let mut node = Self::new();
        for field in wire::decode_fields(bytes) {
            let field = field?;
            match (field.number, field.value) {
                (NODE_DATA, FieldValue::Bytes(b)) => node.data = Some(b.to_vec()),
                (NODE_LINK, FieldValue::Bytes(b)) => node.links.push(PbLink::decode(b)?),
                (NODE_DATA | NODE_LINK, other) => {
                    return Err(CodecError::MalformedNode(format!(
                        "node field {} has wire type {:?}",
                        field.number,
                        other.wire_type()
                    )));
                }
                _ => {}
            }
        }
        Ok(node)
    }

    /// Decode the inline data as UnixFS metadata, if there is any.
    pub fn unixfs(&self) -> Option<CodecResult<UnixFsData>> {
        self.data.as_deref().map(UnixFsData::decode)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.unixfs(), Some(Ok(meta)) if meta.is_directory())
    }

    /// Look up a link by name. Returns the first match.
    pub fn link(&self, name: &str) -> Option<&PbLink> {
        self.links.iter().find(|l| l.name == name)
    }
}
