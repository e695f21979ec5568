use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cairn",
    about = "Cairn: content-addressed, deduplicating file uploads",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the DAG for files and directories and print its blocks
    Build(BuildArgs),
    /// Write the built DAG as a CAR stream
    Pack(PackArgs),
    /// List and validate every block of a CAR stream
    Inspect(InspectArgs),
    /// Upload files into a local block store, skipping blocks it already has
    Upload(UploadArgs),
    /// Validate a CAR stream and write its blocks into a local block store
    Import(ImportArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct PackArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct InspectArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct UploadArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Block store directory (created if missing)
    #[arg(long)]
    pub store: PathBuf,
    /// TOML file with upload settings
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    pub file: PathBuf,
    #[arg(long)]
    pub store: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_upload_with_config() {
        let cli = Cli::try_parse_from([
            "cairn", "upload", "a.txt", "docs", "--store", "/tmp/s", "--config", "c.toml",
        ])
        .unwrap();
        match cli.command {
            Command::Upload(args) => {
                assert_eq!(args.paths, vec![PathBuf::from("a.txt"), PathBuf::from("docs")]);
                assert_eq!(args.store, PathBuf::from("/tmp/s"));
                assert_eq!(args.config, Some(PathBuf::from("c.toml")));
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn format_is_global() {
        let cli = Cli::try_parse_from(["cairn", "build", "x", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(!cli.verbose);
    }

    #[test]
    fn build_requires_a_path() {
        assert!(Cli::try_parse_from(["cairn", "build"]).is_err());
    }

    #[test]
    fn pack_requires_output() {
        assert!(Cli::try_parse_from(["cairn", "pack", "x"]).is_err());
        let cli = Cli::try_parse_from(["cairn", "pack", "x", "-o", "out.car"]).unwrap();
        assert!(matches!(cli.command, Command::Pack(ref a) if a.output == PathBuf::from("out.car")));
    }
}
