use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use sales_indexer_rs::transformations::{build_registry, BlockTransform};
use sales_indexer_rs::types::block::Block;
use sales_indexer_rs::types::config::indexer::IndexerConfig;

const DEFAULT_CONFIG_PATH: &str = "config/config.json";

const USAGE: &str = "\
usage:
  sales-indexer [--config PATH] --list
  sales-indexer [--config PATH] filter <transform>
  sales-indexer [--config PATH] <transform> [BLOCKS_FILE]

Blocks are read as JSON lines from BLOCKS_FILE or stdin.";

enum Command {
    List,
    Filter(String),
    Run {
        transform: String,
        input: Option<PathBuf>,
    },
}

struct Args {
    config_path: PathBuf,
    command: Command,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut list = false;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config requires a path")?;
                config_path = PathBuf::from(path);
            }
            "--list" => list = true,
            "-h" | "--help" => bail!("{}", USAGE),
            other if other.starts_with("--") => bail!("unknown flag {}\n\n{}", other, USAGE),
            other => positional.push(other.to_string()),
        }
    }

    let command = match (list, positional.as_slice()) {
        (true, []) => Command::List,
        (false, [cmd, name]) if cmd == "filter" => Command::Filter(name.clone()),
        (false, [name]) => Command::Run {
            transform: name.clone(),
            input: None,
        },
        (false, [name, file]) => Command::Run {
            transform: name.clone(),
            input: Some(PathBuf::from(file)),
        },
        _ => bail!("{}", USAGE),
    };

    Ok(Args {
        config_path,
        command,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let config = IndexerConfig::load(&args.config_path)?;
    let registry = build_registry(&config);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.command {
        Command::List => {
            for transform in registry.all_transforms() {
                let sink = transform.sink();
                writeln!(
                    out,
                    "{}\tcollection={}\tentity_mode={}",
                    transform.handler_key(),
                    sink.collection_name,
                    sink.entity_mode
                )?;
            }
        }
        Command::Filter(name) => {
            let transform = registry
                .get(&name)
                .with_context(|| unknown_transform(&name, &registry.names()))?;
            serde_json::to_writer_pretty(&mut out, &transform.filter())?;
            writeln!(out)?;
        }
        Command::Run { transform, input } => {
            let handler = registry
                .get(&transform)
                .with_context(|| unknown_transform(&transform, &registry.names()))?;

            let reader: Box<dyn BufRead> = match &input {
                Some(path) => Box::new(BufReader::new(open(path)?)),
                None => Box::new(BufReader::new(io::stdin())),
            };
            run_transform(handler.as_ref(), reader, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn open(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("Failed to open blocks file {}", path.display()))
}

fn unknown_transform(name: &str, known: &[&str]) -> String {
    format!("Unknown transform '{}', expected one of {:?}", name, known)
}

/// Run `transform` over every block line and write one operation per line.
fn run_transform<R: BufRead, W: Write>(
    transform: &dyn BlockTransform,
    reader: R,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut blocks = 0usize;
    let mut operations = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read block input")?;
        if line.trim().is_empty() {
            tracing::warn!("Skipping empty input line {}", line_no + 1);
            continue;
        }

        let block: Block = serde_json::from_str(&line)
            .with_context(|| format!("Invalid block on line {}", line_no + 1))?;
        let ops = transform
            .transform(&block)
            .with_context(|| format!("{} failed on line {}", transform.name(), line_no + 1))?;

        for op in &ops {
            serde_json::to_writer(&mut *out, op)?;
            writeln!(out)?;
        }

        blocks += 1;
        operations += ops.len();
    }

    tracing::info!(
        "{} produced {} operations from {} blocks",
        transform.handler_key(),
        operations,
        blocks
    );
    Ok(())
}
