use std::fs;
use std::path::Path;

use anyhow::Context;
use cairn_car::{CarEntry, CarReader};
use cairn_sdk::{
    BuildOutput, Cairn, Codec, FsBlockStore, StoreBackend, UploadConfig,
};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use crate::cli::*;
use crate::inputs::collect_inputs;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Build(args) => cmd_build(args, format),
        Command::Pack(args) => cmd_pack(args, format),
        Command::Inspect(args) => cmd_inspect(args, format),
        Command::Upload(args) => cmd_upload(args, format).await,
        Command::Import(args) => cmd_import(args, format),
    }
}

#[derive(Serialize)]
struct BlockLine {
    cid: String,
    codec: String,
    size: usize,
}

#[derive(Serialize)]
struct BuildJson {
    root: String,
    total_bytes: u64,
    blocks: Vec<BlockLine>,
}

impl From<&BuildOutput> for BuildJson {
    fn from(output: &BuildOutput) -> Self {
        Self {
            root: output.root.to_text(),
            total_bytes: output.total_bytes(),
            blocks: output
                .blocks
                .iter()
                .map(|b| BlockLine {
                    cid: b.cid.to_text(),
                    codec: b.cid.codec().to_string(),
                    size: b.size(),
                })
                .collect(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn codec_label(codec: Codec) -> colored::ColoredString {
    match codec {
        Codec::Raw => "raw   ".dimmed(),
        Codec::DagPb => "dag-pb".cyan(),
    }
}

fn cmd_build(args: BuildArgs, format: OutputFormat) -> anyhow::Result<()> {
    let files = collect_inputs(&args.paths)?;
    let output = cairn_sdk::build(&files)?;

    if format == OutputFormat::Json {
        return print_json(&BuildJson::from(&output));
    }

    println!("{} Built {} files into {} blocks", "✓".green().bold(), files.len(), output.blocks.len());
    println!("  Root: {}", output.root.to_text().yellow().bold());
    for block in &output.blocks {
        println!("  {} {} {}", codec_label(block.cid.codec()), block.cid, format!("{} B", block.size()).dimmed());
    }
    Ok(())
}

fn cmd_pack(args: PackArgs, format: OutputFormat) -> anyhow::Result<()> {
    let files = collect_inputs(&args.paths)?;
    let (root, car) = cairn_sdk::export_car(&files)?;
    fs::write(&args.output, &car).with_context(|| format!("cannot write {}", args.output.display()))?;
    info!(root = %root, bytes = car.len(), "wrote CAR stream");

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "root": root.to_text(),
            "output": args.output.display().to_string(),
            "bytes": car.len(),
        }));
    }

    println!("{} Packed {} ({} bytes)", "✓".green().bold(), args.output.display().to_string().bold(), car.len());
    println!("  Root: {}", root.to_text().yellow().bold());
    Ok(())
}

#[derive(Serialize)]
struct EntryJson {
    offset: usize,
    cid: String,
    codec: String,
    size: usize,
    links: Vec<String>,
}

impl From<&CarEntry> for EntryJson {
    fn from(entry: &CarEntry) -> Self {
        Self {
            offset: entry.start_offset,
            cid: entry.cid.to_text(),
            codec: entry.codec().to_string(),
            size: entry.data.len(),
            links: link_names(entry),
        }
    }
}

fn link_names(entry: &CarEntry) -> Vec<String> {
    entry
        .node
        .as_ref()
        .map(|node| node.links.iter().map(|l| l.name.clone()).collect())
        .unwrap_or_default()
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let bytes = read_file(&args.file)?;
    let reader = CarReader::from_bytes(bytes);

    let mut entries = Vec::new();
    for entry in reader.entries() {
        let entry = entry.with_context(|| format!("invalid block in {}", args.file.display()))?;
        entries.push(entry);
    }

    if format == OutputFormat::Json {
        let json: Vec<EntryJson> = entries.iter().map(EntryJson::from).collect();
        return print_json(&json);
    }

    for entry in &entries {
        println!(
            "{} {} {} {}",
            format!("@{:<8}", entry.start_offset).dimmed(),
            codec_label(entry.codec()),
            entry.cid,
            format!("{} B", entry.data.len()).dimmed()
        );
        for name in link_names(entry) {
            println!("           └─ {}", name);
        }
    }
    println!("{} {} blocks verified", "✓".green().bold(), entries.len());
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<UploadConfig> {
    let Some(path) = path else {
        return Ok(UploadConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

async fn cmd_upload(args: UploadArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let files = collect_inputs(&args.paths)?;
    let store = FsBlockStore::open(&args.store)?;
    let client = Cairn::with_config(StoreBackend::new(store), config)?;

    let text = format == OutputFormat::Text;
    let progress = move |sent: usize, total: usize| {
        if text {
            println!("  {} {}/{} blocks", "sent".cyan(), sent, total);
        }
    };
    let uploaded = client.upload_files(&files, &progress).await?;

    if !text {
        return print_json(&uploaded);
    }

    let report = &uploaded.report;
    if report.is_noop() {
        println!("{} Everything already stored", "✓".green().bold());
    } else {
        println!(
            "{} Uploaded {} blocks in {} batches ({} already present)",
            "✓".green().bold(),
            report.sent,
            report.batches,
            report.already_present
        );
    }
    println!("  Root: {}", uploaded.root.yellow().bold());
    println!("  Store: {}", args.store.display());
    Ok(())
}

fn cmd_import(args: ImportArgs, format: OutputFormat) -> anyhow::Result<()> {
    let bytes = read_file(&args.file)?;
    let store = FsBlockStore::open(&args.store)?;
    let summary = cairn_sdk::import_car(bytes, &store)?;

    if format == OutputFormat::Json {
        return print_json(&summary);
    }

    println!(
        "{} Imported {} blocks ({} new)",
        "✓".green().bold(),
        summary.blocks,
        summary.written
    );
    if let Some(last) = summary.last {
        println!("  Root: {}", last.to_text().yellow().bold());
    }
    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_sdk::{BlockStore, Cid};

    fn sample_tree(root: &Path) -> std::path::PathBuf {
        let site = root.join("site");
        fs::create_dir_all(site.join("css")).unwrap();
        fs::write(site.join("index.html"), b"<h1>hi</h1>").unwrap();
        fs::write(site.join("css").join("main.css"), b"h1{}").unwrap();
        site
    }

    #[test]
    fn pack_then_import_restores_every_block() {
        let tmp = tempfile::tempdir().unwrap();
        let site = sample_tree(tmp.path());
        let car = tmp.path().join("site.car");

        cmd_pack(PackArgs { paths: vec![site.clone()], output: car.clone() }, OutputFormat::Json).unwrap();
        let store_dir = tmp.path().join("store");
        cmd_import(ImportArgs { file: car.clone(), store: store_dir.clone() }, OutputFormat::Json).unwrap();

        let files = collect_inputs(&[&site]).unwrap();
        let output = cairn_sdk::build(&files).unwrap();
        let store = FsBlockStore::open(&store_dir).unwrap();
        for block in &output.blocks {
            assert!(store.has(&block.cid).unwrap());
        }
    }

    #[test]
    fn inspect_rejects_corrupted_stream() {
        let tmp = tempfile::tempdir().unwrap();
        let site = sample_tree(tmp.path());
        let car = tmp.path().join("site.car");
        cmd_pack(PackArgs { paths: vec![site], output: car.clone() }, OutputFormat::Json).unwrap();

        cmd_inspect(InspectArgs { file: car.clone() }, OutputFormat::Json).unwrap();

        let mut bytes = fs::read(&car).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&car, &bytes).unwrap();
        assert!(cmd_inspect(InspectArgs { file: car }, OutputFormat::Text).is_err());
    }

    #[tokio::test]
    async fn upload_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let site = sample_tree(tmp.path());
        let store_dir = tmp.path().join("store");
        let config = tmp.path().join("cairn.toml");
        fs::write(
            &config,
            "retry_delay = { secs = 0, nanos = 0 }\nstagger_delay = { secs = 0, nanos = 0 }\n",
        )
        .unwrap();

        let args = || UploadArgs {
            paths: vec![site.clone()],
            store: store_dir.clone(),
            config: Some(config.clone()),
        };
        cmd_upload(args(), OutputFormat::Json).await.unwrap();
        let first = FsBlockStore::open(&store_dir).unwrap().cids().unwrap();
        assert_eq!(first.len(), 5);

        cmd_upload(args(), OutputFormat::Json).await.unwrap();
        let second = FsBlockStore::open(&store_dir).unwrap().cids().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn config_defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.retry_count, UploadConfig::default().retry_count);
    }

    #[test]
    fn invalid_config_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "retry_count = \"three\"").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn build_json_lists_root_last() {
        let tmp = tempfile::tempdir().unwrap();
        let site = sample_tree(tmp.path());
        let output = cairn_sdk::build(&collect_inputs(&[&site]).unwrap()).unwrap();
        let json = BuildJson::from(&output);
        assert_eq!(json.blocks.last().unwrap().cid, json.root);
        assert_eq!(Cid::from_text(&json.root).unwrap(), output.root);
    }
}
