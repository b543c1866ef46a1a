//! Leakage Quadrant CLI
//!
//! Loads tracking frames, advances a session to a match time and prints a
//! score or a feature map, or appends one labelled NDJSON record.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use lq_core::replay::{ExportMetadata, GroundTruth, LabelExporter, NdjsonWriter};
use lq_core::{
    AnalysisSession, AttackDirection, EngineConfig, EvaluationContext, FeatureService, LeakageQuadrant,
    LeakageScore, LocalFeatureService, RawFrame,
};
use nalgebra::Vector2;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lq")]
#[command(about = "Score leakage quadrants against tracking data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the leakage score for one LQ
    Score(SessionArgs),

    /// Print the numerical feature map
    Features(SessionArgs),

    /// Append a labelled record to an NDJSON file
    Export {
        #[command(flatten)]
        session: SessionArgs,

        /// Output NDJSON file (appended)
        #[arg(long)]
        out: PathBuf,

        /// Free-form sample label
        #[arg(long, default_value = "")]
        label: String,

        /// Mark the sample as a leakage
        #[arg(long, default_value = "false")]
        is_leakage: bool,

        /// Whether the opportunity was exploited, if known
        #[arg(long)]
        exploited: Option<bool>,
    },

    /// Print the JSON schema of the score output
    Schema,
}

#[derive(Args)]
struct SessionArgs {
    /// JSON array of tracking frames
    #[arg(long)]
    frames: PathBuf,

    /// Match time in milliseconds
    #[arg(long, required_unless_present = "fraction", conflicts_with = "fraction")]
    time: Option<f64>,

    /// Playback position in [0, 1], snapped to the nearest frame
    #[arg(long)]
    fraction: Option<f64>,

    #[arg(long)]
    attacking_team: String,

    #[arg(long)]
    defending_team: String,

    /// Attacking direction along x: 1 or -1
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    direction: i8,

    /// LQ geometry as `x,z,width,depth`
    #[arg(long)]
    lq: Option<String>,

    /// Engine configuration YAML
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score(args) => {
            let (session, ctx, _) = load_session(&args)?;
            let lq = match &args.lq {
                Some(raw) => parse_lq(raw)?,
                None => bail!("score requires --lq x,z,width,depth"),
            };
            let score = session.evaluate(&lq, &ctx);
            println!("{}", serde_json::to_string_pretty(&score).context("Failed to serialize score")?);
        }

        Commands::Features(args) => {
            let (session, ctx, _) = load_session(&args)?;
            let lq = args.lq.as_deref().map(parse_lq).transpose()?;
            let request = session.feature_request(&ctx, lq);
            let features = LocalFeatureService::new(session.engine().config().clone())
                .extract(&request)
                .context("Feature extraction failed")?;
            println!("{}", serde_json::to_string_pretty(&features).context("Failed to serialize features")?);
        }

        Commands::Export { session: args, out, label, is_leakage, exploited } => {
            let (session, ctx, t_ms) = load_session(&args)?;
            let lq = args.lq.as_deref().map(parse_lq).transpose()?;
            let score = lq.as_ref().map(|lq| session.evaluate(lq, &ctx));
            let request = session.feature_request(&ctx, lq);

            let exporter = LabelExporter::new(LocalFeatureService::new(session.engine().config().clone()));
            let mut writer = NdjsonWriter::append_to(&out)
                .with_context(|| format!("Failed to open {}", out.display()))?;
            let metadata = ExportMetadata::new(t_ms, label, &ctx.attacking_team);
            let truth = GroundTruth { is_leakage, exploited, ..GroundTruth::default() };

            let record = exporter
                .export(&mut writer, &request, metadata, truth, score)
                .context("Failed to export record")?;
            writer.flush().context("Failed to flush output")?;

            info!("Appended record {} to {}", record.metadata.sample_id, out.display());
        }

        Commands::Schema => {
            let schema = LeakageScore::json_schema();
            println!("{}", serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?);
        }
    }

    Ok(())
}

/// Build a session from the frames file and move it to the requested time.
fn load_session(args: &SessionArgs) -> Result<(AnalysisSession, EvaluationContext, f64)> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let direction = AttackDirection::try_from(args.direction).map_err(anyhow::Error::msg)?;

    let json = fs::read_to_string(&args.frames)
        .with_context(|| format!("Failed to read {}", args.frames.display()))?;
    let frames: Vec<RawFrame> = serde_json::from_str(&json).context("Failed to parse frames")?;

    let mut session = AnalysisSession::new(config, Default::default());
    session.ingest_all(&frames).context("Failed to buffer frames")?;
    if session.buffer().is_empty() {
        bail!("No usable frames in {}", args.frames.display());
    }

    let t_ms = match (args.time, args.fraction) {
        (Some(t_ms), _) => {
            session.advance_to(t_ms);
            t_ms
        }
        (None, Some(fraction)) => session
            .seek_fraction(fraction)
            .with_context(|| format!("Cannot seek to fraction {}", fraction))?,
        (None, None) => bail!("Either --time or --fraction is required"),
    };

    Ok((session, EvaluationContext::new(&args.attacking_team, &args.defending_team, direction), t_ms))
}

fn parse_lq(raw: &str) -> Result<LeakageQuadrant> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid --lq value: {}", raw))?;
    match values.as_slice() {
        [x, z, width, depth] if *width > 0.0 && *depth > 0.0 => {
            Ok(LeakageQuadrant::from_center(Vector2::new(*x, *z), *width, *depth))
        }
        _ => bail!("--lq expects x,z,width,depth with positive size, got {}", raw),
    }
}
