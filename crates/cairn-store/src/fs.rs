//! Filesystem block store.
//!
//! One file per block, named by the block's CID text, fanned out by the
//! next-to-last two characters of that name:
//! `{root}/{text[len-3..len-1]}/{text}`.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use cairn_types::Cid;
use tracing::{debug, error};

use crate::block::Block;
use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

const TMP_EXTENSION: &str = "tmp";

/// Block store rooted at a local directory.
///
/// Writes go to a uniquely named temporary file in the target directory and
/// are moved into place without overwriting, so a block file is either
/// absent or complete and concurrent writers of one block never collide. Every read
/// re-hashes the file and reports a mismatch as [`StoreError::Corrupt`].
#[derive(Debug)]
pub struct FsBlockStore {
    root: PathBuf,
}

impl FsBlockStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn block_path(&self, cid: &Cid) -> PathBuf {
        let text = cid.to_text();
        let shard = &text[text.len() - 3..text.len() - 1];
        self.root.join(shard).join(&text)
    }

    /// Every CID stored under the root, sorted.
    pub fn cids(&self) -> StoreResult<Vec<Cid>> {
        let mut cids = Vec::new();
        for shard in std::fs::read_dir(&self.root)? {
            let shard = shard?;
            if !shard.file_type()?.is_dir() {
                continue;
            }
            for entry in std::fs::read_dir(shard.path())? {
                let entry = entry?;
                let path = entry.path();
                if !entry.file_type()?.is_file()
                    || path.extension().is_some_and(|ext| ext == TMP_EXTENSION)
                {
                    continue;
                }
                let key = entry.file_name().to_string_lossy().into_owned();
                let cid = Cid::from_text(&key)
                    .map_err(|source| StoreError::InvalidKey { key, source })?;
                cids.push(cid);
            }
        }
        cids.sort();
        Ok(cids)
    }
}

impl BlockStore for FsBlockStore {
    fn get(&self, cid: &Cid) -> StoreResult<Option<Block>> {
        let path = self.block_path(cid);
        match std::fs::read(&path) {
            Ok(data) => {
                let block = Block::new(*cid, data);
                if let Err(source) = block.verify() {
                    error!(cid = %cid, path = %path.display(), "block corruption detected on read");
                    return Err(StoreError::Corrupt { cid: *cid, source });
                }
                Ok(Some(block))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn put(&self, block: &Block) -> StoreResult<bool> {
        block.verify().map_err(|source| StoreError::Corrupt {
            cid: block.cid,
            source,
        })?;
        let path = self.block_path(&block.cid);
        if path.exists() {
            return Ok(false);
        }
        let parent = path.parent().unwrap_or(self.root.as_path());
        std::fs::create_dir_all(parent)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(&format!(".{TMP_EXTENSION}"))
            .tempfile_in(parent)?;
        tmp.write_all(&block.data)?;
        if let Err(e) = tmp.persist_noclobber(&path) {
            if e.error.kind() == ErrorKind::AlreadyExists {
                debug!(cid = %block.cid, "block stored concurrently by another writer");
                return Ok(false);
            }
            return Err(StoreError::Io(e.error));
        }

        debug!(cid = %block.cid, path = %path.display(), size = block.size(), "stored block to file");
        Ok(true)
    }

    fn has(&self, cid: &Cid) -> StoreResult<bool> {
        match std::fs::metadata(self.block_path(cid)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn delete(&self, cid: &Cid) -> StoreResult<bool> {
        match std::fs::remove_file(self.block_path(cid)) {
            Ok(()) => {
                debug!(cid = %cid, "deleted block file");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_types::ContentHasher;

    fn temp_store() -> (tempfile::TempDir, FsBlockStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlockStore::open(dir.path().join("blocks")).unwrap();
        (dir, store)
    }

    #[test]
    fn open_creates_root() {
        let (_dir, store) = temp_store();
        assert!(store.root().is_dir());
        assert!(store.cids().unwrap().is_empty());
    }

    #[test]
    fn put_get_roundtrip() {
        let (_dir, store) = temp_store();
        let block = Block::raw(&b"on disk"[..]);
        assert!(store.put(&block).unwrap());
        assert!(store.has(&block.cid).unwrap());
        assert_eq!(store.get(&block.cid).unwrap(), Some(block.clone()));
        assert!(!store.put(&block).unwrap());
    }

    #[test]
    fn file_is_named_by_cid_text() {
        let (_dir, store) = temp_store();
        let block = Block::raw(&b"named"[..]);
        store.put(&block).unwrap();
        let path = store.block_path(&block.cid);
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            block.cid.to_text()
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"named");
    }

    #[test]
    fn missing_block() {
        let (_dir, store) = temp_store();
        let cid = ContentHasher::RAW.hash(b"absent");
        assert!(store.get(&cid).unwrap().is_none());
        assert!(!store.has(&cid).unwrap());
        assert!(!store.delete(&cid).unwrap());
    }

    #[test]
    fn corruption_detected_on_read() {
        let (_dir, store) = temp_store();
        let block = Block::raw(&b"pristine"[..]);
        store.put(&block).unwrap();
        std::fs::write(store.block_path(&block.cid), b"rotten").unwrap();

        let err = store.get(&block.cid).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn put_rejects_corrupt_block() {
        let (_dir, store) = temp_store();
        let block = Block::new(ContentHasher::RAW.hash(b"a"), &b"b"[..]);
        assert!(matches!(
            store.put(&block).unwrap_err(),
            StoreError::Corrupt { .. }
        ));
        assert!(!store.has(&block.cid).unwrap());
    }

    #[test]
    fn delete_removes_file() {
        let (_dir, store) = temp_store();
        let block = Block::raw(&b"bye"[..]);
        store.put(&block).unwrap();
        assert!(store.delete(&block.cid).unwrap());
        assert!(!store.has(&block.cid).unwrap());
    }

    #[test]
    fn cids_lists_every_block() {
        let (_dir, store) = temp_store();
        let blocks = vec![
            Block::raw(&b"one"[..]),
            Block::raw(&b"two"[..]),
            Block::dag_pb(vec![0x0A, 0x02, 0x08, 0x01]),
        ];
        store.put_many(&blocks).unwrap();

        let mut expected: Vec<Cid> = blocks.iter().map(|b| b.cid).collect();
        expected.sort();
        assert_eq!(store.cids().unwrap(), expected);
    }

    #[test]
    fn concurrent_puts_of_one_block() {
        let (_dir, store) = temp_store();
        let block = Block::raw(vec![7u8; 64 * 1024]);

        let results: Vec<bool> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| store.put(&block))).collect();
            handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|written| **written).count(), 1);
        assert_eq!(store.get(&block.cid).unwrap(), Some(block.clone()));
        assert_eq!(store.cids().unwrap(), vec![block.cid]);

        let shard = store.block_path(&block.cid).parent().unwrap().to_path_buf();
        let leftovers = std::fs::read_dir(shard).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn reopen_sees_existing_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let block = Block::raw(&b"persistent"[..]);
        FsBlockStore::open(dir.path()).unwrap().put(&block).unwrap();

        let reopened = FsBlockStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get(&block.cid).unwrap(), Some(block));
    }
}
