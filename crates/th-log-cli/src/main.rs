//! th-log - parse a buildbot CI log into a JSON artifact
//!
//! Reads a log from a file or stdin, streams it through the selected
//! artifact builder and prints the composite artifact to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use th_log_config::ParserConfig;
use th_log_parser::BuilderKind;

mod input;
mod logger;

/// Parse a buildbot CI log into a JSON artifact.
#[derive(Parser, Debug)]
#[command(name = "th-log")]
#[command(author, version)]
#[command(about = "Parse a buildbot CI log into a JSON artifact")]
#[command(after_help = "Examples:
  th-log build.log                         Structured step view of build.log
  th-log --kind job-info build.log         TinderboxPrint job details
  zcat talos.log.gz | th-log -k talos-data Talos performance data from stdin")]
struct Cli {
    /// Log file to parse (reads stdin when omitted)
    log_file: Option<PathBuf>,

    /// Artifact to build: job-info, structured-log or talos-data
    #[arg(short, long, default_value_t = BuilderKind::StructuredLog)]
    kind: BuilderKind,

    /// Source URL recorded as `logurl` in the artifact
    #[arg(short, long)]
    url: Option<String>,

    /// Skip failure detection inside steps
    #[arg(long)]
    no_check_errors: bool,

    /// Config file (default: search .th-log-parser.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON artifact
    #[arg(short, long)]
    pretty: bool,

    /// Enable verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn parser_config(&self) -> Result<ParserConfig> {
        let mut config = match &self.config {
            Some(path) => ParserConfig::from_path(path)?,
            None => ParserConfig::load(),
        };

        if self.no_check_errors {
            config.check_errors = false;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    // Optional .env with RUST_LOG and friends
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init(cli.verbose);

    let config = cli.parser_config()?;
    let mut builder = cli.kind.build(cli.url.clone(), &config.parser_options());

    log::info!(
        "Parsing {} with the {} builder",
        cli.log_file
            .as_deref()
            .map_or_else(|| "stdin".to_string(), |path| path.display().to_string()),
        builder.name()
    );

    let reader = input::open(cli.log_file.as_deref())?;
    input::feed(reader, &mut builder)?;

    let artifact = builder
        .into_artifact()
        .context("Failed to assemble artifact")?;

    let mut stdout = io::stdout().lock();
    if cli.pretty {
        serde_json::to_writer_pretty(&mut stdout, &artifact)?;
    } else {
        serde_json::to_writer(&mut stdout, &artifact)?;
    }
    writeln!(stdout)?;

    Ok(())
}
