use std::{fs, process::ExitCode};

use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{error, info};

use hctree_rust::{
    compress_with_stats, decompress,
    utils::{init_tracing, timer::Timer},
};

#[derive(Parser, Debug)]
#[command(about = "Measure compression and decompression throughput on random data")]
struct Args {
    /// Size of every generated input, in bytes
    #[arg(short, long, default_value_t = 1 << 20)]
    size: usize,
    /// Number of distinct byte values in the inputs (1 to 256)
    #[arg(short, long, default_value_t = 64)]
    alphabet: u16,
    /// Number of inputs to run
    #[arg(short, long, default_value_t = 10)]
    runs: usize,
    /// Seed of the input generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Write the results to this file as well
    #[arg(long)]
    stats: Option<String>,
    /// Log level: trace, debug, info, warn or error
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Skewed input: low byte values are much more frequent than high ones.
fn gen_input(rng: &mut StdRng, size: usize, alphabet: u16) -> Vec<u8> {
    (0..size)
        .map(|_| {
            let x: f64 = rng.gen();
            ((x * x * x) * alphabet as f64) as u8
        })
        .collect()
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    if args.alphabet == 0 || args.alphabet > 256 {
        error!("the alphabet must hold between 1 and 256 symbols");
        return ExitCode::FAILURE;
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut comp_timer = Timer::new();
    let mut decomp_timer = Timer::new();
    let mut compressed_total = 0;

    for run in 0..args.runs {
        let input = gen_input(&mut rng, args.size, args.alphabet);

        comp_timer.start();
        let compressed = compress_with_stats(&input);
        comp_timer.stop();

        let (container, stats) = match compressed {
            Ok(c) => c,
            Err(e) => {
                error!(run, "compression failed: {}", e);
                return ExitCode::FAILURE;
            }
        };
        compressed_total += stats.compressed_bytes;

        decomp_timer.start();
        let output = decompress(&container);
        decomp_timer.stop();

        match output {
            Ok(output) if output == input => {}
            Ok(_) => {
                error!(run, "decompressed data differs from the input");
                return ExitCode::FAILURE;
            }
            Err(e) => {
                error!(run, "decompression failed: {}", e);
                return ExitCode::FAILURE;
            }
        }

        info!(run, ratio = stats.ratio(), "run completed");
    }

    let mut out_stats = String::new();

    out_stats.push_str("################### Huffman codec throughput ###################\n");
    out_stats.push_str(&format!(
        "input size {} bytes, alphabet {}, runs {}\n",
        args.size, args.alphabet, args.runs
    ));
    out_stats.push_str(&format!(
        "mean compressed size {} bytes\n",
        compressed_total / args.runs.max(1) as u64
    ));
    out_stats.push_str(&format!(
        "compression {:.0} ns/run, {:.2} MiB/s\n",
        comp_timer.mean(),
        comp_timer.throughput(args.size)
    ));
    out_stats.push_str(&format!(
        "decompression {:.0} ns/run, {:.2} MiB/s\n",
        decomp_timer.mean(),
        decomp_timer.throughput(args.size)
    ));

    print!("{}", out_stats);

    if let Some(path) = args.stats {
        if let Err(e) = fs::write(&path, out_stats) {
            error!("cannot write {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
