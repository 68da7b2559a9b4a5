use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use prescription_scribe::capture::{CaptureEvent, CaptureSession, ScriptedSource};
use prescription_scribe::extraction::SingleValuePolicy;
use prescription_scribe::presenter::{render_html, render_saved_text, render_text, summary_line};
use prescription_scribe::{Config, OutputFormat, PrescriptionRecord, ScribeWorkflow};

/// Turn a doctor–patient conversation into a prescription summary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to ~/.prescription-scribe/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding saved prescriptions
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Name of the saved-prescription collection
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// How many saved prescriptions to keep
    #[arg(long, global = true)]
    max_records: Option<usize>,

    /// Merge rule for repeated single-valued fields: last, first or concat
    #[arg(long, global = true)]
    policy: Option<SingleValuePolicy>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draft a prescription from a finished transcript
    Generate {
        /// Transcript file, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output format: text, html or json
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Save the prescription to the local history
        #[arg(long)]
        save: bool,

        /// Patient name to save when none was spoken
        #[arg(long)]
        patient_name: Option<String>,
    },
    /// Replay a conversation script as live capture, then draft a prescription
    Record {
        /// Script file with one utterance per line
        #[arg(short, long)]
        script: PathBuf,

        /// Pause between utterances (ms)
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Output format: text, html or json
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Save the prescription to the local history
        #[arg(long)]
        save: bool,

        /// Patient name to save when none was spoken
        #[arg(long)]
        patient_name: Option<String>,
    },
    /// List recent saved prescriptions
    List {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show a saved prescription
    Show {
        id: String,

        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
    /// Delete a saved prescription
    Delete { id: String },
    /// Delete all saved prescriptions
    Clear,
    /// Write the effective settings to the config file
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    debug!("Using config: {:?}", config);
    let mut workflow = ScribeWorkflow::from_config(&config)?;
    info!(store = ?workflow.store().path(), "Prescription store ready");

    match args.command {
        Command::Generate {
            input,
            format,
            save,
            patient_name,
        } => {
            let transcript = read_transcript(&input)?;
            workflow.generate(&transcript);
            finish(
                &mut workflow,
                format.unwrap_or(config.output_format),
                save,
                patient_name.as_deref(),
            )
        }
        Command::Record {
            script,
            delay_ms,
            format,
            save,
            patient_name,
        } => {
            let delay = Duration::from_millis(delay_ms.unwrap_or(config.script_delay_ms));
            let source = ScriptedSource::from_file(&script)
                .with_context(|| format!("Failed to read script {:?}", script))?
                .with_delay(delay);
            record(&mut workflow, source, &script).await?;
            finish(
                &mut workflow,
                format.unwrap_or(config.output_format),
                save,
                patient_name.as_deref(),
            )
        }
        Command::List { limit } => {
            let records = workflow.recent(limit.unwrap_or(config.recent_limit))?;
            if records.is_empty() {
                println!("No saved prescriptions.");
            }
            for saved in &records {
                println!("{}", summary_line(saved));
            }
            Ok(())
        }
        Command::Show { id, format } => {
            let Some(saved) = workflow.store().get(&id)? else {
                bail!("No saved prescription with id {}", id);
            };
            let output = match format.unwrap_or(config.output_format) {
                OutputFormat::Text => render_saved_text(&saved),
                OutputFormat::Html => render_html(&saved.record),
                OutputFormat::Json => serde_json::to_string_pretty(&saved)?,
            };
            println!("{}", output);
            Ok(())
        }
        Command::Delete { id } => {
            if workflow.store().delete(&id)? {
                println!("Deleted {}", id);
            } else {
                println!("No saved prescription with id {}", id);
            }
            Ok(())
        }
        Command::Clear => {
            workflow.store().clear()?;
            println!("All saved prescriptions deleted.");
            Ok(())
        }
        Command::InitConfig { force } => {
            let path = match &args.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };
            if path.exists() && !force {
                bail!("Config file {:?} already exists, use --force to overwrite", path);
            }
            config.save(&path)?;
            info!(path = ?path, "Config written");
            println!("Wrote config to {:?}", path);
            Ok(())
        }
    }
}

/// Config file values, overridden by command-line flags
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    if let Some(dir) = &args.store_dir {
        config.store_dir = Some(dir.clone());
    }
    if let Some(namespace) = &args.namespace {
        config.namespace = namespace.clone();
    }
    if let Some(max) = args.max_records {
        config.max_records = max;
    }
    if let Some(policy) = args.policy {
        config.single_value_policy = policy;
    }
    Ok(config)
}

fn read_transcript(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut transcript = String::new();
        std::io::stdin()
            .read_to_string(&mut transcript)
            .context("Failed to read transcript from stdin")?;
        Ok(transcript)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))
    }
}

async fn record(workflow: &mut ScribeWorkflow, source: ScriptedSource, script: &Path) -> Result<()> {
    if source.is_empty() {
        warn!("Script {:?} has no utterances", script);
    }

    let (tx, mut rx) = mpsc::channel::<CaptureEvent>(32);
    let mut session = CaptureSession::new();
    let stop_flag = session.start(&script.display().to_string())?;

    // Set up Ctrl+C handler
    let stop_flag_ctrlc = stop_flag.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, stopping...");
        stop_flag_ctrlc.store(true, Ordering::SeqCst);
    });

    let source_handle = source.spawn(tx, stop_flag);
    eprintln!("\nRecording... Press Ctrl+C to stop.\n");

    let result = workflow.record(&mut session, &mut rx).await;
    let _ = source_handle.await;

    if let Some(capture) = session.record() {
        eprintln!("--- Capture Summary ---");
        eprintln!("Speech: {:.1}s", capture.speech_duration_ms as f64 / 1000.0);
        eprintln!("Segments: {}\n", capture.segments.len());
    }
    if session.dropped_while_paused() > 0 {
        warn!("{} segments dropped while paused", session.dropped_while_paused());
    }

    result?;
    Ok(())
}

fn render(record: &PrescriptionRecord, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(record),
        OutputFormat::Html => render_html(record),
        OutputFormat::Json => serde_json::to_string_pretty(record)?,
    })
}

fn finish(
    workflow: &mut ScribeWorkflow,
    format: OutputFormat,
    save: bool,
    patient_name: Option<&str>,
) -> Result<()> {
    if save {
        let saved = workflow.save_current(patient_name)?;
        eprintln!("Saved prescription {}", saved.id);
    }
    let record = workflow
        .current()
        .context("No prescription was generated")?;
    println!("{}", render(record, format)?);
    Ok(())
}
