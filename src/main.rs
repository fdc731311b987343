use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use wavefront_sw::config::{EdgePolicy, Preset, RunConfig, ScoringParams};
use wavefront_sw::driver::LockstepDriver;
use wavefront_sw::io::fasta;
use wavefront_sw::report::RunReport;
use wavefront_sw::sequential;
use wavefront_sw::store::{Sequence, SequenceStore};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "wavefront-sw", author, version, about = "Lockstep wavefront Smith-Waterman on a simulated manycore host", arg_required_else_help = true)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align two sequences
    Align {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        run: RunArgs,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Run one of the built-in demo configurations (diag40x100, diag20x40-cc32)
    Demo {
        preset: Preset,
        /// Host cores (parked cores beyond the preset's active count)
        #[arg(long = "host-cores")]
        host_cores: Option<usize>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Align the same input with 1..=max-cores active cores and compare best scores
    Sweep {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        run: RunArgs,
        #[arg(long = "max-cores", default_value_t = 8)]
        max_cores: usize,
    },
    /// Display a saved run report
    Show {
        /// Report file written by --save
        report: String,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// First sequence (matrix rows)
    a: String,
    /// Second sequence (matrix columns)
    b: String,
    /// Treat A and B as FASTA paths (first record of each)
    #[arg(long)]
    fasta: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(long = "match", default_value_t = 2, allow_hyphen_values = true)]
    match_score: i32,
    #[arg(long = "mismatch", default_value_t = -1, allow_hyphen_values = true)]
    mismatch_score: i32,
    #[arg(long = "gap", default_value_t = -2, allow_hyphen_values = true)]
    gap_score: i32,
    /// Active cores taking part in the sweep
    #[arg(short = 't', long = "cores", default_value_t = 4)]
    cores: usize,
    /// Host cores (defaults to the active count)
    #[arg(long = "host-cores")]
    host_cores: Option<usize>,
    #[arg(long = "max-len", default_value_t = 100)]
    max_len: usize,
    /// standard, gap-constant or zero-candidate
    #[arg(long = "edge-policy", default_value_t = EdgePolicy::Standard)]
    edge_policy: EdgePolicy,
    /// Aggregate compute/sync timing per diagonal
    #[arg(long)]
    trace: bool,
    #[arg(long = "parallel-reduce")]
    parallel_reduce: bool,
    /// Count writes per cell and check each cell is written once
    #[arg(long)]
    audit: bool,
    /// Size of the top-left excerpt to print (0 disables)
    #[arg(long, default_value_t = 10)]
    excerpt: usize,
}

impl RunArgs {
    fn to_config(&self) -> RunConfig {
        RunConfig {
            scoring: ScoringParams {
                match_score: self.match_score,
                mismatch_score: self.mismatch_score,
                gap_score: self.gap_score,
            },
            max_sequence_length: self.max_len,
            active_cores: self.cores,
            host_cores: self.host_cores.unwrap_or(self.cores),
            edge_policy: self.edge_policy,
            trace_diagonals: self.trace,
            parallel_reduce: self.parallel_reduce,
            audit_writes: self.audit,
            excerpt: (self.excerpt > 0).then_some((self.excerpt, self.excerpt)),
        }
    }
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Compare the wavefront matrix with a sequential row-major fill
    #[arg(long)]
    verify: bool,
    /// Save the run report (bincode)
    #[arg(long)]
    save: Option<String>,
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Align { input, run, out } => {
            let cfg = run.to_config();
            let store = load_store(&input, cfg.max_sequence_length)?;
            run_once(cfg, store, &out)?;
            Ok(())
        }
        Commands::Demo { preset, host_cores, out } => {
            let mut cfg = preset.config();
            if let Some(h) = host_cores {
                cfg.host_cores = h;
            }
            let (a, b) = preset.sequences();
            let store = SequenceStore::from_bytes(a, b, cfg.max_sequence_length)
                .with_context(|| format!("preset {} does not fit its own bound", preset))?;
            println!("Running preset {}", preset);
            run_once(cfg, store, &out)?;
            Ok(())
        }
        Commands::Sweep { input, run, max_cores } => run_sweep(&input, &run, max_cores),
        Commands::Show { report } => {
            let r = RunReport::load_from_file(&report)
                .with_context(|| format!("cannot read report '{}'", report))?;
            println!("{}", r);
            if let Some(cmd) = &r.meta.command {
                println!("command: {}", cmd);
            }
            Ok(())
        }
    }
}

fn load_store(input: &InputArgs, max_len: usize) -> Result<SequenceStore> {
    let (a, b) = if input.fasta {
        (fasta::load_sequence(&input.a)?, fasta::load_sequence(&input.b)?)
    } else {
        (
            Sequence::new("seq1", input.a.to_ascii_uppercase().as_bytes()),
            Sequence::new("seq2", input.b.to_ascii_uppercase().as_bytes()),
        )
    };
    Ok(SequenceStore::new(a, b, max_len)?)
}

fn run_once(cfg: RunConfig, store: SequenceStore, out: &OutputArgs) -> Result<RunReport> {
    let mut driver = LockstepDriver::new(cfg, store).context("invalid run configuration")?;
    let mut report = driver.run();
    report.meta.command = Some(std::env::args().collect::<Vec<_>>().join(" "));
    println!("{}", report);

    if driver.config().audit_writes {
        let counts = driver.matrix().write_counts().unwrap_or_default();
        let bad = counts.iter().filter(|&&c| c != 1).count();
        if bad > 0 {
            anyhow::bail!("{} cells were not written exactly once", bad);
        }
        println!("audit: all {} cells written exactly once", counts.len());
    }

    if out.verify {
        let cfg = driver.config();
        let want = sequential::fill_row_major(driver.store(), &cfg.scoring, cfg.edge_policy);
        let got = driver.matrix().to_row_major();
        let diff = want.iter().zip(&got).filter(|(a, b)| a != b).count();
        if diff > 0 {
            anyhow::bail!("wavefront matrix differs from sequential fill in {} cells", diff);
        }
        println!("verify: matrix matches sequential fill ({} cells)", got.len());
    }

    if let Some(path) = &out.save {
        report
            .save_to_file(path)
            .with_context(|| format!("cannot write report to '{}'", path))?;
        println!("report saved: {}", path);
    }
    Ok(report)
}

fn run_sweep(input: &InputArgs, run: &RunArgs, max_cores: usize) -> Result<()> {
    let base = RunConfig {
        excerpt: None,
        ..run.to_config()
    };
    base.validate().context("invalid run configuration")?;
    let store = load_store(input, base.max_sequence_length)?;
    println!("Sequence 1 length: {}, Sequence 2 length: {}", store.m(), store.n());
    let reference = sequential::best_score_row_major(&store, &base.scoring, base.edge_policy);

    let mut scores = Vec::with_capacity(max_cores);
    for cores in 1..=max_cores {
        let cfg = RunConfig {
            active_cores: cores,
            host_cores: base.host_cores.max(cores),
            ..base.clone()
        };
        let mut driver = LockstepDriver::new(cfg, store.clone())
            .with_context(|| format!("invalid configuration for {} cores", cores))?;
        let report = driver.run();
        println!(
            "cores {:>3}: best {:>5} at ({}, {})  sweep {} cycles",
            cores, report.best.score, report.best.i, report.best.j, report.sweep_cycles
        );
        scores.push(report.best.score);
    }

    if scores.iter().any(|&s| s != reference) {
        anyhow::bail!("best score depends on core count: {:?} (sequential {})", scores, reference);
    }
    println!("best score {} identical for 1..={} cores and the sequential fill", reference, max_cores);
    Ok(())
}
