// src/main.rs
//
// Thin harness around the decision_sim library.
// All of the real logic lives in the lib crate (generator, aggregator, tables).
//
// Config precedence: CLI flags > DECISION_SIM_* env vars > defaults.
//
// Run examples:
//   cargo run -- --seed 42 --output-dir runs/default
//   cargo run -- --workers 4 --teams 2 --sessions 2 --items 5 --quiet
//   cargo run -- --from-decisions runs/default/raw/decisions.csv --output-dir runs/reagg

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use decision_sim::{
    read_decisions_file, summarize_sessions_with_sink, write_run_outputs, DecisionGenerator,
    EventSink, JsonlSink, NoopSink, RandomStream, SimConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "decision_sim",
    about = "Synthetic human-AI decision logs with per-session fairness and calibration metrics",
    version
)]
struct Cli {
    /// Number of workers.
    #[arg(long)]
    workers: Option<usize>,

    /// Number of teams workers are spread across.
    #[arg(long)]
    teams: Option<usize>,

    /// Number of sessions per worker.
    #[arg(long)]
    sessions: Option<usize>,

    /// Items per worker-session.
    #[arg(long)]
    items: Option<usize>,

    /// RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory for the CSV tables and run_summary.json.
    #[arg(long, default_value = "runs/decision_sim")]
    output_dir: PathBuf,

    /// Re-aggregate an existing decisions CSV instead of generating one.
    #[arg(long)]
    from_decisions: Option<PathBuf>,

    /// Optional JSONL path for pipeline events (overrides DECISION_SIM_TELEMETRY_*).
    #[arg(long)]
    log_jsonl: Option<PathBuf>,

    /// Only print the final summary line.
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<SimConfig> {
        let mut cfg = SimConfig::from_env().context("failed to read DECISION_SIM_* overrides")?;
        if let Some(v) = self.workers {
            cfg.n_workers = v;
        }
        if let Some(v) = self.teams {
            cfg.n_teams = v;
        }
        if let Some(v) = self.sessions {
            cfg.n_sessions = v;
        }
        if let Some(v) = self.items {
            cfg.items_per_session = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn build_sink(log_jsonl: Option<&PathBuf>) -> Result<Box<dyn EventSink>> {
    if let Some(path) = log_jsonl {
        let sink = JsonlSink::create(path)
            .with_context(|| format!("failed to create event log {}", path.display()))?;
        return Ok(Box::new(sink));
    }
    match JsonlSink::from_env()? {
        Some(sink) => Ok(Box::new(sink)),
        None => Ok(Box::new(NoopSink)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut sink = build_sink(cli.log_jsonl.as_ref())?;

    let (config, decisions) = match cli.from_decisions.as_ref() {
        Some(path) => {
            let decisions = read_decisions_file(path)
                .with_context(|| format!("failed to load decisions from {}", path.display()))?;
            if !cli.quiet {
                println!(
                    "[load] {} decision rows from {}",
                    decisions.len(),
                    path.display()
                );
            }
            (None, decisions)
        }
        None => {
            let cfg = cli.resolve_config()?;
            if !cli.quiet {
                println!(
                    "[generate] workers={} teams={} sessions={} items={} seed={}",
                    cfg.n_workers, cfg.n_teams, cfg.n_sessions, cfg.items_per_session, cfg.seed
                );
            }
            let generator = DecisionGenerator::new(cfg)?;
            let mut rng = RandomStream::new(cfg.seed);
            let decisions = generator.generate_with_sink(&mut rng, sink.as_mut())?;
            (Some(cfg), decisions)
        }
    };

    let metrics = summarize_sessions_with_sink(&decisions, sink.as_mut());

    let (summary, paths) = write_run_outputs(&cli.output_dir, config, &decisions, &metrics)
        .with_context(|| format!("failed to write outputs to {}", cli.output_dir.display()))?;

    if !cli.quiet {
        for arm in &summary.arms {
            println!(
                "[arm] {:<9} sessions={:<3} eo_gap={:.4} ADI={:.4} ECE={:.4}",
                arm.assistance_arm.as_str(),
                arm.n_sessions,
                arm.eo_gap,
                arm.adi,
                arm.ece
            );
        }
        println!("[write] {}", paths.decisions.display());
        println!("[write] {}", paths.session_metrics.display());
        println!("[write] {}", paths.arm_summary.display());
    }

    println!(
        "decision_sim v{} | records={} overrides={} groups={} sdi_proxy={} | sha256={}",
        env!("CARGO_PKG_VERSION"),
        summary.n_records,
        summary.n_overrides,
        summary.n_session_groups,
        summary
            .sdi_proxy
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "n/a".to_string()),
        summary.decisions_sha256
    );
    Ok(())
}
