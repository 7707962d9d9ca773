//! Block divergence CLI.
//!
//! Provides the `kheight` binary with two subcommands:
//! - `sweep` runs proof case families over a range of k and prints one
//!   report line (or JSON record) per case.
//! - `block` evaluates a single block read from a JSON topology.
//!
//! Logging goes to stderr and is controlled by `-v` or `RUST_LOG`.

use std::fs;
use std::io::{self, Read};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kheight_cases::report::THREE_REGULAR_HEADER;
use kheight_cases::{run_case, sweep, Case, CaseError, Family};
use kheight_core::{
    BlockError, BlockModel, BoundaryVertex, DivergenceOptions, Height, Topology, Traversal,
};

/// Block divergence of k-heights.
#[derive(Parser)]
#[command(name = "kheight", about = "Block divergence of k-heights")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Traversal flags shared by both subcommands.
#[derive(clap::Args)]
struct ScanArgs {
    /// Scan boundary constraints on one thread instead of all cores.
    #[arg(long)]
    sequential: bool,

    /// Shuffle boundary constraints with this seed (implies --sequential).
    #[arg(long)]
    shuffle_seed: Option<u64>,

    /// Log progress every N boundary constraints (implies --sequential).
    #[arg(long)]
    progress_every: Option<usize>,

    /// Stop as soon as the divergence exceeds this lower bound.
    #[arg(long)]
    target: Option<f64>,
}

impl ScanArgs {
    fn options(&self) -> DivergenceOptions {
        let sequential =
            self.sequential || self.shuffle_seed.is_some() || self.progress_every.is_some();
        let traversal = if sequential {
            Traversal::Sequential {
                shuffle_seed: self.shuffle_seed,
                progress_every: self.progress_every,
            }
        } else {
            Traversal::Parallel
        };
        DivergenceOptions {
            traversal,
            target: self.target,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run proof case families and print their report lines.
    Sweep {
        /// Case family to run; repeat for several. Default: the 3-regular families.
        #[arg(short, long = "family", value_parser = parse_family)]
        families: Vec<Family>,

        /// Smallest k (default: the family's proof range).
        #[arg(long)]
        k_min: Option<Height>,

        /// Largest k (default: the family's proof range).
        #[arg(long)]
        k_max: Option<Height>,

        /// Print JSON records instead of report lines.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Evaluate one block given as a JSON topology.
    Block {
        /// Path to the topology JSON file, or `-` for stdin.
        #[arg(short, long)]
        input: PathBuf,

        /// Boundary vertex to augment.
        #[arg(long, default_value_t = 0)]
        vertex: u32,

        #[command(flatten)]
        scan: ScanArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Commands::Sweep {
            families,
            k_min,
            k_max,
            json,
            scan,
        } => run_sweep(families, k_min, k_max, json, &scan.options()),
        Commands::Block {
            input,
            vertex,
            scan,
        } => run_block(&input, BoundaryVertex(vertex), &scan.options()),
    };
    process::exit(exit_code);
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_family(s: &str) -> Result<Family, String> {
    s.parse().map_err(|e: CaseError| e.to_string())
}

/// Execute the sweep subcommand.
///
/// Returns exit code: 0 = success, 1 = a case failed, 2 = invalid arguments.
fn run_sweep(
    families: Vec<Family>,
    k_min: Option<Height>,
    k_max: Option<Height>,
    json: bool,
    options: &DivergenceOptions,
) -> i32 {
    let families = if families.is_empty() {
        Family::THREE_REGULAR.to_vec()
    } else {
        families
    };

    let cases = match (k_min, k_max) {
        (None, None) => proof_cases(&families),
        (lo, hi) => {
            let range = lo.unwrap_or(2)..=hi.unwrap_or(3);
            if range.is_empty() {
                eprintln!("Error: empty k range {}..={}", range.start(), range.end());
                return 2;
            }
            sweep(&families, range)
        }
    };

    tracing::info!(cases = cases.len(), "starting sweep");

    let mut header_printed = false;
    for case in &cases {
        let record = match run_case(case, options) {
            Ok(record) => record,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };

        if json {
            match serde_json::to_string(&record) {
                Ok(line) => println!("{}", line),
                Err(e) => {
                    eprintln!("Error: failed to serialize record: {}", e);
                    return 1;
                }
            }
        } else {
            if record.family.is_three_regular() && !header_printed {
                println!("{}", THREE_REGULAR_HEADER);
                header_printed = true;
            }
            println!("{}", record);
        }
    }
    0
}

/// Cases of every family over its own proof range. Families sharing a range
/// are swept together so k stays the outer loop.
fn proof_cases(families: &[Family]) -> Vec<Case> {
    let mut groups: Vec<(RangeInclusive<Height>, Vec<Family>)> = Vec::new();
    for &family in families {
        let range = family.proof_k_range();
        match groups.iter_mut().find(|(r, _)| *r == range) {
            Some((_, members)) => members.push(family),
            None => groups.push((range, vec![family])),
        }
    }
    groups
        .into_iter()
        .flat_map(|(range, members)| sweep(&members, range))
        .collect()
}

/// Execute the block subcommand.
///
/// Returns exit code: 0 = success, 1 = computation error, 2 = unreadable input.
fn run_block(input: &Path, vertex: BoundaryVertex, options: &DivergenceOptions) -> i32 {
    let text = match read_input(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", input.display(), e);
            return 2;
        }
    };
    let topology: Topology = match serde_json::from_str(&text) {
        Ok(topology) => topology,
        Err(e) => {
            eprintln!("Error: invalid topology JSON: {}", e);
            return 2;
        }
    };

    let model = match BlockModel::new(topology) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };

    match model.block_divergence(vertex, options) {
        Ok(divergence) => {
            let summary = serde_json::json!({
                "fillings": model.fillings().len(),
                "boundary_constraints": model.boundary_constraints().len(),
                "divergence": divergence,
            });
            println!("{}", summary);
            0
        }
        Err(e @ BlockError::DegenerateAugmentation { .. }) => {
            eprintln!("Error: {} (check the augmentation vertex and block-boundary edges)", e);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(path)
    }
}
