use std::collections::HashSet;

use bytes::Bytes;
use cairn_codec::{PbLink, PbNode};
use cairn_store::Block;
use cairn_types::Cid;
use tracing::{debug, info};

use crate::error::DagResult;
use crate::tree::{DirId, DirTree, Entry};

/// One input file: a `/`-separated path and its bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputFile {
    pub path: String,
    pub content: Bytes,
}

impl InputFile {
    pub fn new(path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Result of a build: the root directory's CID and every block under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOutput {
    pub root: Cid,
    /// Unique blocks, children before the directories that link to them.
    /// The root block is always last.
    pub blocks: Vec<Block>,
}

impl BuildOutput {
    /// Sum of all block sizes.
    pub fn total_bytes(&self) -> u64 {
        self.blocks.iter().map(|b| b.size() as u64).sum()
    }
}

/// Builds a Merkle DAG from input files.
pub struct DagBuilder;

impl DagBuilder {
    /// Build the DAG for `files`.
    ///
    /// An empty file list is legal and yields a single empty root directory.
    pub fn build(files: &[InputFile]) -> DagResult<BuildOutput> {
        let mut tree = DirTree::new();
        for file in files {
            tree.insert_file(&file.path, file.content.clone())?;
        }
        Ok(Self::build_tree(&tree))
    }

    /// Convert an assembled tree into blocks.
    pub fn build_tree(tree: &DirTree) -> BuildOutput {
        let mut emitter = Emitter::default();
        let root = emitter.finalize_root(tree);

        info!(
            root = %root.cid,
            blocks = emitter.blocks.len(),
            dirs = tree.dir_count(),
            "built DAG"
        );
        BuildOutput {
            root: root.cid,
            blocks: emitter.blocks,
        }
    }
}

struct Finalized {
    cid: Cid,
    size: u64,
}

#[derive(Default)]
struct Emitter {
    blocks: Vec<Block>,
    seen: HashSet<Cid>,
}

impl Emitter {
    fn emit(&mut self, block: Block) -> Finalized {
        let done = Finalized {
            cid: block.cid,
            size: block.size() as u64,
        };
        if self.seen.insert(block.cid) {
            debug!(cid = %block.cid, size = block.size(), "emitted block");
            self.blocks.push(block);
        }
        done
    }

    /// Post-order walk from the root with an explicit stack of open
    /// subdirectories, so path depth is bounded by memory rather than the
    /// call stack. Children are emitted in link order before the directory
    /// that references them.
    fn finalize_root(&mut self, tree: &DirTree) -> Finalized {
        let mut root = Frame::new(DirTree::ROOT);
        let mut open: Vec<Frame> = Vec::new();
        loop {
            let frame = open.last_mut().unwrap_or(&mut root);

            if let Some((name, entry)) = tree.entries(frame.dir).get(frame.next) {
                frame.next += 1;
                match entry {
                    Entry::File(content) => {
                        let child = self.emit(Block::raw(content.clone()));
                        frame.links.push(PbLink::new(name.as_str(), child.cid, child.size));
                    }
                    Entry::Dir(sub) => open.push(Frame::new(*sub)),
                }
                continue;
            }

            let Some(finished) = open.pop() else {
                let links = std::mem::take(&mut root.links);
                return self.emit(Block::dag_pb(PbNode::directory(links).encode()));
            };
            let done = self.emit(Block::dag_pb(PbNode::directory(finished.links).encode()));
            let parent = open.last_mut().unwrap_or(&mut root);
            let (name, _) = &tree.entries(parent.dir)[parent.next - 1];
            parent.links.push(PbLink::new(name.as_str(), done.cid, done.size));
        }
    }
}

/// A directory being finalized: the next entry to visit and the links so far.
struct Frame {
    dir: DirId,
    next: usize,
    links: Vec<PbLink>,
}

impl Frame {
    fn new(dir: DirId) -> Self {
        Self {
            dir,
            next: 0,
            links: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_codec::DIRECTORY_MARKER;
    use cairn_types::{Codec, ContentHasher};
    use proptest::prelude::*;

    fn node_of(out: &BuildOutput, cid: &Cid) -> PbNode {
        let block = out.blocks.iter().find(|b| b.cid == *cid).unwrap();
        PbNode::decode(&block.data).unwrap()
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    #[test]
    fn nested_directory_example() {
        let out = DagBuilder::build(&[
            InputFile::new("a/b.txt", &b"hi"[..]),
            InputFile::new("a/c.txt", &b"yo"[..]),
        ])
        .unwrap();

        let root = node_of(&out, &out.root);
        assert!(root.is_directory());
        assert_eq!(root.links.len(), 1);
        assert_eq!(root.links[0].name, "a");
        assert_eq!(root.links[0].cid.codec(), Codec::DagPb);

        let a = node_of(&out, &root.links[0].cid);
        assert!(a.is_directory());
        assert_eq!(a.links.len(), 2);
        assert_eq!(a.links[0].name, "b.txt");
        assert_eq!(a.links[0].cid, ContentHasher::RAW.hash(b"hi"));
        assert_eq!(a.links[0].size, 2);
        assert_eq!(a.links[1].name, "c.txt");
        assert_eq!(a.links[1].cid, ContentHasher::RAW.hash(b"yo"));

        // hi, yo, a, root
        assert_eq!(out.blocks.len(), 4);
        assert_eq!(out.blocks.last().unwrap().cid, out.root);
    }

    #[test]
    fn build_is_deterministic() {
        let files = [
            InputFile::new("a/b.txt", &b"hi"[..]),
            InputFile::new("a/c.txt", &b"yo"[..]),
        ];
        let first = DagBuilder::build(&files).unwrap();
        let second = DagBuilder::build(&files).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn link_order_changes_root() {
        let ab = DagBuilder::build(&[
            InputFile::new("b", &b"1"[..]),
            InputFile::new("a", &b"2"[..]),
        ])
        .unwrap();
        let ba = DagBuilder::build(&[
            InputFile::new("a", &b"2"[..]),
            InputFile::new("b", &b"1"[..]),
        ])
        .unwrap();
        assert_ne!(ab.root, ba.root);
        let names: Vec<_> = node_of(&ab, &ab.root)
            .links
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn empty_input_is_empty_root() {
        let out = DagBuilder::build(&[]).unwrap();
        assert_eq!(out.blocks.len(), 1);
        assert_eq!(&out.blocks[0].data[..], &[0x0A, 0x02, 0x08, 0x01]);
        assert_eq!(out.root, ContentHasher::DAG_PB.hash(&[0x0A, 0x02, 0x08, 0x01]));
    }

    #[test]
    fn flat_files_link_from_root() {
        let out = DagBuilder::build(&[
            InputFile::new("index.html", &b"<h1>hi</h1>"[..]),
            InputFile::new("style.css", &b"h1{}"[..]),
        ])
        .unwrap();
        let root = node_of(&out, &out.root);
        assert_eq!(root.data.as_deref(), Some(&DIRECTORY_MARKER[..]));
        assert_eq!(root.links[0].size, 11);
        assert_eq!(root.links[1].size, 4);
        assert_eq!(out.total_bytes(), 11 + 4 + out.blocks[2].size() as u64);
    }

    #[test]
    fn directory_link_size_is_encoded_node_length() {
        let out = DagBuilder::build(&[InputFile::new("d/f", &b"x"[..])]).unwrap();
        let root = node_of(&out, &out.root);
        let d = out.blocks.iter().find(|b| b.cid == root.links[0].cid).unwrap();
        assert_eq!(root.links[0].size, d.size() as u64);
    }

    #[test]
    fn very_deep_path_builds() {
        let depth = 10_000;
        let path = "d/".repeat(depth) + "f";
        let out = DagBuilder::build(&[InputFile::new(path, &b"x"[..])]).unwrap();

        // leaf, one node per `d`, root
        assert_eq!(out.blocks.len(), depth + 2);
        assert_eq!(out.blocks[0].cid, ContentHasher::RAW.hash(b"x"));
        assert_eq!(out.blocks.last().unwrap().cid, out.root);

        let by_cid: std::collections::HashMap<Cid, &Block> =
            out.blocks.iter().map(|b| (b.cid, b)).collect();
        let node = |cid: &Cid| PbNode::decode(&by_cid[cid].data).unwrap();

        let mut cid = out.root;
        for _ in 0..depth {
            let dir = node(&cid);
            assert_eq!(dir.links.len(), 1);
            assert_eq!(dir.links[0].name, "d");
            cid = dir.links[0].cid;
        }
        let innermost = node(&cid);
        assert_eq!(innermost.links[0].name, "f");
    }

    #[test]
    fn mixed_files_and_directories_keep_link_order() {
        let out = DagBuilder::build(&[
            InputFile::new("z.txt", &b"z"[..]),
            InputFile::new("sub/inner.txt", &b"i"[..]),
            InputFile::new("a.txt", &b"a"[..]),
            InputFile::new("sub/deeper/x", &b"x"[..]),
        ])
        .unwrap();

        let root = node_of(&out, &out.root);
        let names: Vec<_> = root.links.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["z.txt", "sub", "a.txt"]);

        let sub = node_of(&out, &root.links[1].cid);
        let names: Vec<_> = sub.links.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["inner.txt", "deeper"]);

        // z, inner, x, deeper, sub, a, root
        let order: Vec<Cid> = out.blocks.iter().map(|b| b.cid).collect();
        assert_eq!(order[0], ContentHasher::RAW.hash(b"z"));
        assert_eq!(order[1], ContentHasher::RAW.hash(b"i"));
        assert_eq!(order[2], ContentHasher::RAW.hash(b"x"));
        assert_eq!(order[4], root.links[1].cid);
        assert_eq!(order[5], ContentHasher::RAW.hash(b"a"));
        assert_eq!(order.len(), 7);
    }

    // -----------------------------------------------------------------------
    // Deduplication
    // -----------------------------------------------------------------------

    #[test]
    fn identical_content_is_one_block() {
        let out = DagBuilder::build(&[
            InputFile::new("x/one.txt", &b"same"[..]),
            InputFile::new("y/two.txt", &b"same"[..]),
        ])
        .unwrap();
        let raw: Vec<_> = out
            .blocks
            .iter()
            .filter(|b| b.cid.codec() == Codec::Raw)
            .collect();
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn identical_subdirectories_are_one_block() {
        let out = DagBuilder::build(&[
            InputFile::new("x/f", &b"same"[..]),
            InputFile::new("y/f", &b"same"[..]),
        ])
        .unwrap();
        // raw f, shared dir, root
        assert_eq!(out.blocks.len(), 3);
        let root = node_of(&out, &out.root);
        assert_eq!(root.links[0].cid, root.links[1].cid);
    }

    #[test]
    fn same_file_twice_collapses() {
        let once = DagBuilder::build(&[InputFile::new("a.txt", &b"v"[..])]).unwrap();
        let twice = DagBuilder::build(&[
            InputFile::new("a.txt", &b"v"[..]),
            InputFile::new("a.txt", &b"v"[..]),
        ])
        .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn structural_errors_propagate() {
        assert!(DagBuilder::build(&[
            InputFile::new("a", &b"1"[..]),
            InputFile::new("a", &b"2"[..]),
        ])
        .is_err());
        assert!(DagBuilder::build(&[InputFile::new("", &b"1"[..])]).is_err());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn arb_files() -> impl Strategy<Value = Vec<InputFile>> {
        proptest::collection::vec(
            (
                proptest::collection::vec("[a-c]{1,2}", 1..4),
                proptest::collection::vec(any::<u8>(), 0..16),
            ),
            0..12,
        )
        .prop_map(|specs| {
            // Prefix files with "f_" and directories with "d_" so no name is both.
            specs
                .into_iter()
                .map(|(segments, content)| {
                    let (file, dirs) = segments.split_last().unwrap();
                    let mut path: Vec<String> = dirs.iter().map(|d| format!("d_{d}")).collect();
                    path.push(format!("f_{file}_{}", hex_of(&content)));
                    InputFile::new(path.join("/"), content)
                })
                .collect()
        })
    }

    fn hex_of(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    proptest! {
        #[test]
        fn children_precede_parents(files in arb_files()) {
            let out = DagBuilder::build(&files).unwrap();
            let mut seen = HashSet::new();
            for block in &out.blocks {
                block.verify().unwrap();
                prop_assert!(seen.insert(block.cid), "duplicate block");
                if block.cid.codec() == Codec::DagPb {
                    for link in PbNode::decode(&block.data).unwrap().links {
                        prop_assert!(seen.contains(&link.cid));
                    }
                }
            }
            prop_assert_eq!(out.blocks.last().unwrap().cid, out.root);
        }
    }
}
