//! `cbor-diag`: print CBOR (or JSON-like text) as diagnostic notation,
//! JSON or hex.
//!
//! Usage:
//!   cbor-diag [--from cbor|hex|json] [--to diag|json|hex] [FILE]

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use cbor_tree::cli::{Conversion, InputFormat, OutputFormat};
use cbor_tree::TreeLimits;
use clap::Parser;
use clap_verbosity_flag::WarnLevel;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input file; `-` or nothing reads stdin
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "cbor")]
    from: InputFormat,

    #[arg(short, long, value_enum, default_value = "diag")]
    to: OutputFormat,

    /// Refuse float items while decoding
    #[arg(long)]
    no_floats: bool,

    /// Upper bound on the number of tree nodes
    #[arg(long, value_name = "N")]
    max_nodes: Option<usize>,

    /// Stop after the first complete JSON document instead of rejecting
    /// whatever follows it
    #[arg(long)]
    ignore_trailing: bool,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<WarnLevel>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(io::stderr)
        .init();

    let input = match &cli.input {
        Some(path) if path.as_os_str() != "-" => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let limits = TreeLimits {
        max_nodes: cli.max_nodes,
    };
    let mut conversion = Conversion::new(cli.from, cli.to);
    conversion.decode.floats &= !cli.no_floats;
    conversion.decode.limits = limits;
    conversion.build.limits = limits;
    if cli.ignore_trailing {
        conversion.build.trailing = cbor_tree::TrailingPolicy::Ignore;
    }

    let output = conversion.run(&input)?;
    io::stdout()
        .write_all(output.as_bytes())
        .context("failed to write output")?;
    Ok(())
}
