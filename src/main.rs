use std::{fs, path::PathBuf, process::ExitCode, time::Instant};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info, warn};

use hctree_rust::{
    compress_file,
    container::CodeEntry,
    decompress_file, decompress_file_checked, inspect,
    properties::{sidecar_path, ContainerProperties},
    read_header,
    utils::init_tracing,
    ContainerStats, HuffmanError,
};

#[derive(Parser, Debug)]
#[command(about = "Compress and decompress files with a Huffman coding tree")]
struct Args {
    /// Log level: trace, debug, info, warn or error
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file
    Compress {
        /// The file to compress
        source_name: PathBuf,
        /// The destination container
        dest_name: PathBuf,
        /// Also write <dest_name>.properties describing the container
        #[arg(short, long, default_value_t = false)]
        properties: bool,
    },
    /// Decompress a container
    Decompress {
        /// The container to decompress
        source_name: PathBuf,
        /// The destination file
        dest_name: PathBuf,
        /// Verify the container against <source_name>.properties
        #[arg(short, long, default_value_t = false)]
        check: bool,
    },
    /// Print the size breakdown of a container
    Inspect {
        /// The container to inspect
        source_name: PathBuf,
        /// Print the statistics and the code table as JSON
        #[arg(short, long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Serialize)]
struct InspectReport<'a> {
    stats: &'a ContainerStats,
    codes: Vec<CodeEntry>,
}

fn run(command: Command) -> hctree_rust::Result<()> {
    match command {
        Command::Compress { source_name, dest_name, properties } => {
            let comp_time = Instant::now();
            let stats = compress_file(&source_name, &dest_name)?;
            let comp_time = comp_time.elapsed().as_nanos();

            info!(
                original = stats.original_bytes,
                compressed = stats.compressed_bytes,
                header_bits = stats.header_bits,
                "compressed {} in {}ns",
                source_name.display(),
                comp_time
            );

            if properties {
                ContainerProperties::from(&stats).store(&sidecar_path(&dest_name))?;
            }
        }
        Command::Decompress { source_name, dest_name, check } => {
            let decomp_time = Instant::now();
            let stats = if check {
                decompress_file_checked(&source_name, &dest_name)?
            } else {
                decompress_file(&source_name, &dest_name)?
            };
            let decomp_time = decomp_time.elapsed().as_nanos();

            info!(
                decompressed = stats.original_bytes,
                "decompressed {} in {}ns",
                source_name.display(),
                decomp_time
            );
        }
        Command::Inspect { source_name, json } => {
            let container = fs::read(&source_name).map_err(|source| HuffmanError::InputUnavailable {
                path: source_name.clone(),
                source,
            })?;
            let stats = inspect(&container)?;

            if json {
                let codes = read_header(&container)?.map(|h| h.code_table()).unwrap_or_default();
                let report = InspectReport { stats: &stats, codes };
                let out = serde_json::to_string_pretty(&report)
                    .map_err(|e| HuffmanError::Io(e.into()))?;
                println!("{}", out);
            } else {
                println!("original bytes     {}", stats.original_bytes);
                println!("compressed bytes   {}", stats.compressed_bytes);
                println!("unique symbols     {}", stats.unique_symbols);
                println!("frequency width    {}", stats.freq_width);
                println!("header bits        {}", stats.header_bits);
                println!("payload bits       {}", stats.payload_bits);
                println!("padding bits       {}", stats.padding_bits);
                println!("ratio              {:.3}", stats.ratio());
            }
        }
    }

    Ok(())
}

/// 2: input unavailable, 3: output not writable, 4: malformed container.
fn exit_code(err: &HuffmanError) -> u8 {
    match err {
        HuffmanError::InputUnavailable { .. } => 2,
        HuffmanError::OutputUnwritable { .. } => 3,
        e if e.is_format_error() => 4,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if !init_tracing(&args.log_level) {
        warn!("a tracing subscriber was already installed");
    }

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}
