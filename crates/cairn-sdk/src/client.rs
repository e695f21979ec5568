use cairn_car::{encode_blocks, CarReader};
use cairn_dag::{BuildOutput, DagBuilder, InputFile};
use cairn_store::BlockStore;
use cairn_sync::{BatchSubmitter, ExistenceChecker, ProgressSink, UploadConfig, UploadReport, Uploader};
use cairn_types::Cid;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SdkResult;

/// Result of [`Cairn::upload_files`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uploaded {
    /// Root directory CID in text form.
    pub root: String,
    pub report: UploadReport,
}

/// Result of [`import_car`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Blocks read from the stream.
    pub blocks: usize,
    /// Blocks the store did not already hold.
    pub written: usize,
    /// CID of the last block, which is the root for streams Cairn exports.
    pub last: Option<Cid>,
}

/// Build the DAG for `files`.
pub fn build(files: &[InputFile]) -> SdkResult<BuildOutput> {
    Ok(DagBuilder::build(files)?)
}

/// Build the DAG for `files` and encode every block as a CAR stream, root last.
pub fn export_car(files: &[InputFile]) -> SdkResult<(Cid, Vec<u8>)> {
    let output = build(files)?;
    Ok((output.root, encode_blocks(&output.blocks)))
}

/// Validate every block of a CAR stream and write it into `store`.
///
/// Stops at the first invalid record; blocks before it stay written.
pub fn import_car<S: BlockStore + ?Sized>(bytes: Vec<u8>, store: &S) -> SdkResult<ImportSummary> {
    let mut summary = ImportSummary::default();
    for block in CarReader::from_bytes(bytes).blocks() {
        let block = block?;
        if store.put(&block)? {
            summary.written += 1;
        }
        summary.blocks += 1;
        summary.last = Some(block.cid);
    }
    info!(blocks = summary.blocks, written = summary.written, "imported CAR stream");
    Ok(summary)
}

/// Cairn client bound to one upload backend.
pub struct Cairn<B> {
    backend: B,
    uploader: Uploader,
}

impl<B> Cairn<B>
where
    B: ExistenceChecker + BatchSubmitter,
{
    /// Client with the default upload configuration.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            uploader: Uploader::default(),
        }
    }

    /// Client with a custom upload configuration.
    pub fn with_config(backend: B, config: UploadConfig) -> SdkResult<Self> {
        Ok(Self {
            backend,
            uploader: Uploader::new(config)?,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &UploadConfig {
        self.uploader.config()
    }

    pub fn build(&self, files: &[InputFile]) -> SdkResult<BuildOutput> {
        build(files)
    }

    /// Build the DAG for `files`, upload what is missing, and return the root.
    pub async fn upload_files<P>(&self, files: &[InputFile], progress: &P) -> SdkResult<Uploaded>
    where
        P: ProgressSink + ?Sized,
    {
        let output = build(files)?;
        let root = output.root.to_text();
        info!(root = %root, blocks = output.blocks.len(), "built DAG for upload");

        let report = self
            .uploader
            .upload(&output.blocks, &self.backend, &self.backend, progress)
            .await?;
        Ok(Uploaded { root, report })
    }

    pub fn export_car(&self, files: &[InputFile]) -> SdkResult<(Cid, Vec<u8>)> {
        export_car(files)
    }

    pub fn import_car<S: BlockStore + ?Sized>(&self, bytes: Vec<u8>, store: &S) -> SdkResult<ImportSummary> {
        import_car(bytes, store)
    }
}
