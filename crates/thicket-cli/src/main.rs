// crates/thicket-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thicket_exec::{ExecConfig, PathOutcome, Program, SymbolicExecutor};
use thicket_fae::ForestAutomaton;
use thicket_fold::io::parse_ta;
use thicket_label::{BoxManager, LabelArena};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Output shape for `analyze`'s diagnostics (`spec.md` §6 "CLI ergonomics").
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum DiagnosticsFormat {
    #[default]
    Human,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "thicket",
    about = "Forest-automaton shape analyzer",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the microcode program's worklist to exhaustion.
    Analyze {
        /// Path to a serialized `thicket_exec::Program` (JSON).
        #[arg(long)]
        program: PathBuf,

        /// Path to a newline-separated box-database text file.
        #[arg(long)]
        box_db: Option<PathBuf>,

        /// Entry instruction index.
        #[arg(long, default_value_t = 0)]
        entry: usize,

        /// Run the garbage checker after every instruction, not just at
        /// loop heads.
        #[arg(long, default_value_t = false)]
        check_garbage_every_step: bool,

        /// Write the GraphML witness here if a real error is found.
        #[arg(long)]
        witness_out: Option<PathBuf>,

        /// Diagnostics output shape: human-readable text or machine-readable JSON.
        #[arg(long, value_enum, default_value_t = DiagnosticsFormat::Human)]
        format: DiagnosticsFormat,
    },

    /// Validate a box-database text file and report each box's name,
    /// arity of its accepting states, and final-state count.
    BoxDb {
        /// Path to a newline-separated box-database text file.
        #[arg(long)]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Analyze {
            program,
            box_db,
            entry,
            check_garbage_every_step,
            witness_out,
            format,
        } => analyze(&program, box_db.as_deref(), entry, check_garbage_every_step, witness_out.as_deref(), format),
        Cmd::BoxDb { path } => box_db_info(&path),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn load_program(path: &Path) -> Result<Program> {
    let text = fs::read_to_string(path).with_context(|| format!("reading program {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing program {}", path.display()))
}

fn load_box_db(path: &Path) -> Result<HashMap<thicket_label::BoxId, thicket_automata::TreeAut>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading box database {}", path.display()))?;
    let mut manager = BoxManager::new();
    manager.load_text(&text).map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut arena = LabelArena::new();
    let mut out = HashMap::new();
    for idx in 0..manager.len() {
        let id = thicket_label::BoxId(u32::try_from(idx).map_err(|_| anyhow::anyhow!("box database overflow"))?);
        let Some(def) = manager.definition(id) else { continue };
        let ta = parse_ta(def, &mut arena).map_err(|e| anyhow::anyhow!("{e}"))?;
        out.insert(id, ta);
    }
    Ok(out)
}

/// One path's outcome, reshaped for the JSON diagnostics format. Mirrors
/// `thicket_exec::PathOutcome`, but owns plain, serializable fields instead
/// of borrowing into the run (the witness body itself is omitted — only
/// whether and where it was written, since it is already written to
/// `--witness-out` and would otherwise bloat the report).
#[derive(Serialize)]
struct PathReport {
    status: &'static str,
    error: Option<String>,
    loc: Option<String>,
    pc: Option<usize>,
    witness_written_to: Option<PathBuf>,
}

#[derive(Serialize)]
struct AnalysisReport {
    paths: Vec<PathReport>,
    paths_explored: usize,
    real_errors: usize,
    loop_heads_tracked: usize,
}

fn analyze(
    program_path: &Path,
    box_db_path: Option<&Path>,
    entry: usize,
    check_garbage_every_step: bool,
    witness_out: Option<&Path>,
    format: DiagnosticsFormat,
) -> Result<()> {
    let program = load_program(program_path)?;
    let box_db = match box_db_path {
        Some(p) => load_box_db(p)?,
        None => HashMap::new(),
    };

    info!(program = %program_path.display(), entry, "running analysis");
    let mut config = ExecConfig::from_env();
    config.check_garbage_every_step = config.check_garbage_every_step || check_garbage_every_step;
    let mut executor = SymbolicExecutor::new(&program, box_db, config);
    let outcomes = executor.run(entry, ForestAutomaton::new());

    let mut real_errors = 0usize;
    let mut paths = Vec::with_capacity(outcomes.len());
    for outcome in &outcomes {
        match outcome {
            PathOutcome::Closed => paths.push(PathReport {
                status: "closed",
                error: None,
                loc: None,
                pc: None,
                witness_written_to: None,
            }),
            PathOutcome::RealError { error, loc, pc, witness } => {
                real_errors += 1;
                let mut witness_written_to = None;
                if let Some(out) = witness_out {
                    ensure_parent_dir(out)?;
                    fs::write(out, witness).with_context(|| format!("writing witness to {}", out.display()))?;
                    witness_written_to = Some(out.to_path_buf());
                }
                if matches!(format, DiagnosticsFormat::Human) {
                    match loc {
                        Some(loc) => println!("real error at pc={pc} ({}:{}): {error}", loc.file, loc.line),
                        None => println!("real error at pc={pc}: {error}"),
                    }
                    if let Some(out) = &witness_written_to {
                        println!("wrote witness to {}", out.display());
                    }
                }
                paths.push(PathReport {
                    status: "real_error",
                    error: Some(error.to_string()),
                    loc: loc.as_ref().map(|l| format!("{}:{}", l.file, l.line)),
                    pc: Some(*pc),
                    witness_written_to,
                });
            }
        }
    }

    match format {
        DiagnosticsFormat::Human => {
            println!(
                "{} path(s) explored, {real_errors} real error(s), {} loop head(s) tracked",
                outcomes.len(),
                executor.tracked_loop_heads()
            );
        }
        DiagnosticsFormat::Json => {
            let report = AnalysisReport {
                paths_explored: outcomes.len(),
                real_errors,
                loop_heads_tracked: executor.tracked_loop_heads(),
                paths,
            };
            println!("{}", serde_json::to_string_pretty(&report).context("serializing diagnostics report")?);
        }
    }

    if real_errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn box_db_info(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("reading box database {}", path.display()))?;
    let mut manager = BoxManager::new();
    manager.load_text(&text).map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut arena = LabelArena::new();
    for idx in 0..manager.len() {
        let id = thicket_label::BoxId(u32::try_from(idx).map_err(|_| anyhow::anyhow!("box database overflow"))?);
        let name = manager.name_of(id).unwrap_or("<unnamed>");
        match manager.definition(id) {
            Some(def) => match parse_ta(def, &mut arena) {
                Ok(ta) => println!(
                    "{name}: {} transition(s), {} final state(s)",
                    ta.transitions().len(),
                    ta.final_states().len()
                ),
                Err(e) => println!("{name}: malformed definition ({e})"),
            },
            None => println!("{name}: <no definition>"),
        }
    }
    println!("{} box(es) total", manager.len());
    Ok(())
}
