use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use lt_app::{analyze, AppError, AppResult};
use lt_core::{EngineConfig, PidGains, Real, TimeSeries};
use lt_diag::diagnose;
use lt_ident::identify;
use lt_kpi::{compute_kpi, NominalRanges};
use lt_tune::TuningMode;

#[derive(Parser)]
#[command(name = "lt-cli")]
#[command(about = "LoopTune CLI - PID loop identification, tuning and diagnosis", long_about = None)]
struct Cli {
    /// Optional engine configuration YAML (partial overrides allowed)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full engine: identify, tune, score and diagnose
    Analyze {
        /// CSV log with header t,sp,pv,op
        csv_path: PathBuf,
        /// Tuning mode: conservative, moderate or aggressive
        #[arg(long, default_value = "moderate")]
        mode: TuningMode,
        /// Currently commissioned controller gain (enables the governed
        /// step suggestion; requires --current-ti)
        #[arg(long, requires = "current_ti")]
        current_kc: Option<f64>,
        /// Currently commissioned integral time
        #[arg(long, requires = "current_kc")]
        current_ti: Option<f64>,
        /// Currently commissioned derivative time
        #[arg(long, default_value_t = 0.0)]
        current_td: f64,
        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fit an FOPDT model only
    Identify {
        csv_path: PathBuf,
    },
    /// Compute performance indices only
    Kpi {
        csv_path: PathBuf,
        /// Nominal OP span overriding the observed max-min
        #[arg(long, requires = "sp_span")]
        op_span: Option<f64>,
        /// Nominal SP span overriding the observed max-min
        #[arg(long, requires = "op_span")]
        sp_span: Option<f64>,
    },
    /// Run diagnostics only
    Diagnose {
        csv_path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            csv_path,
            mode,
            current_kc,
            current_ti,
            current_td,
            output,
        } => cmd_analyze(
            &csv_path,
            mode,
            current_kc,
            current_ti,
            current_td,
            output.as_deref(),
            &cfg,
        ),
        Commands::Identify { csv_path } => cmd_identify(&csv_path, &cfg),
        Commands::Kpi {
            csv_path,
            op_span,
            sp_span,
        } => cmd_kpi(&csv_path, op_span, sp_span, &cfg),
        Commands::Diagnose { csv_path } => cmd_diagnose(&csv_path, &cfg),
    }
}

fn load_config(path: Option<&Path>) -> AppResult<EngineConfig> {
    let cfg = match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_yaml::from_str(&text)
                .map_err(|e| AppError::InvalidInput(format!("config parse error: {e}")))?
        }
        None => EngineConfig::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Parse a `t,sp,pv,op` CSV log. Header names are matched
/// case-insensitively and `time`/`setpoint` spellings are accepted.
fn load_series(path: &Path) -> AppResult<TimeSeries> {
    let text = fs::read_to_string(path)?;
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| AppError::InvalidInput("empty CSV file".to_string()))?;

    let columns: Vec<String> = header
        .split(',')
        .map(|c| c.trim().to_ascii_lowercase())
        .collect();
    let find = |names: &[&str]| -> AppResult<usize> {
        columns
            .iter()
            .position(|c| names.contains(&c.as_str()))
            .ok_or_else(|| {
                AppError::InvalidInput(format!("missing CSV column (one of {names:?})"))
            })
    };
    let it = find(&["t", "time"])?;
    let isp = find(&["sp", "setpoint"])?;
    let ipv = find(&["pv", "process_value"])?;
    let iop = find(&["op", "output"])?;

    let mut t = Vec::new();
    let mut sp = Vec::new();
    let mut pv = Vec::new();
    let mut op = Vec::new();
    for (lineno, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let parse = |idx: usize| -> AppResult<Real> {
            fields
                .get(idx)
                .and_then(|f| f.parse::<Real>().ok())
                .ok_or_else(|| {
                    AppError::InvalidInput(format!("bad value on data row {}", lineno + 1))
                })
        };
        t.push(parse(it)?);
        sp.push(parse(isp)?);
        pv.push(parse(ipv)?);
        op.push(parse(iop)?);
    }

    Ok(TimeSeries::new(t, sp, pv, op)?)
}

fn emit_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::InvalidInput(format!("report serialization failed: {e}")))?;
    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_analyze(
    csv_path: &Path,
    mode: TuningMode,
    current_kc: Option<f64>,
    current_ti: Option<f64>,
    current_td: f64,
    output: Option<&Path>,
    cfg: &EngineConfig,
) -> AppResult<()> {
    let series = load_series(csv_path)?;
    let current = match (current_kc, current_ti) {
        (Some(kc), Some(ti)) => Some(PidGains {
            kc,
            ti,
            td: current_td,
        }),
        _ => None,
    };
    let result = analyze(&series, mode, cfg, current)?;
    emit_json(&result, output)
}

fn cmd_identify(csv_path: &Path, cfg: &EngineConfig) -> AppResult<()> {
    let series = load_series(csv_path)?;
    let fit = identify(&series, cfg)?;
    emit_json(&fit, None)
}

fn cmd_kpi(
    csv_path: &Path,
    op_span: Option<f64>,
    sp_span: Option<f64>,
    cfg: &EngineConfig,
) -> AppResult<()> {
    let series = load_series(csv_path)?;
    let ranges = match (op_span, sp_span) {
        (Some(op_span), Some(sp_span)) => Some(NominalRanges { op_span, sp_span }),
        _ => None,
    };
    let report = compute_kpi(&series, cfg, ranges.as_ref())
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    emit_json(&report, None)
}

fn cmd_diagnose(csv_path: &Path, cfg: &EngineConfig) -> AppResult<()> {
    let series = load_series(csv_path)?;
    let report = diagnose(&series, cfg);
    emit_json(&report, None)
}
