//! readalong - plan narrated scenes for pasted prose

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

use readalong::text::{chunk_paragraph, split_sentences, verify_round_trip};
use readalong::{
    Pipeline, PlannedParagraph, ReadalongConfig, SceneGroup, ScenePlanner, SubtitleCue,
    build_cues, group_scenes,
};

const PROGRAM: &str = "readalong";

#[derive(Parser, Debug)]
#[command(name = "readalong")]
#[command(about = "Plan narrated scenes and visuals for pasted prose", long_about = None)]
#[command(version)]
struct Args {
    /// Input text file (reads stdin when absent or "-")
    file: Option<PathBuf>,

    #[command(flatten)]
    plan: PlanArgs,

    /// Indent JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable debug output
    #[arg(short, long, default_value_t = false, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Debug, Clone)]
struct PlanArgs {
    /// Skip the labeling model and use default plans
    #[arg(long, global = true)]
    offline: bool,

    /// Model preset from llm.toml
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Seconds to wait for the labeling model
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print sentences and chunks without planning
    Chunks {
        /// Input text file (reads stdin when absent or "-")
        file: Option<PathBuf>,
    },
    /// Plan and print scene groups with subtitle cues
    Scenes {
        /// Input text file (reads stdin when absent or "-")
        file: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the default model preset
    SetPreset {
        /// Preset name from llm.toml
        name: String,
    },
    /// Set the labeling model timeout
    SetTimeout {
        /// Seconds (at least 1)
        secs: u64,
    },
}

#[derive(Serialize)]
struct ChunkedParagraph {
    index: usize,
    sentences: Vec<String>,
    chunks: Vec<String>,
    lossless: bool,
}

#[derive(Serialize)]
struct ParagraphScenes {
    index: usize,
    scenes: Vec<SceneGroup>,
    cues: Vec<SubtitleCue>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config = ReadalongConfig::load().context("Failed to load configuration")?;

    match &args.command {
        Some(Commands::Config { action }) => handle_config_command(action),
        Some(Commands::Chunks { file }) => {
            let text = read_input(file.as_ref()).await?;
            let pipeline = Pipeline::new(ScenePlanner::offline()).with_limits(config.paragraphs);
            let output: Vec<ChunkedParagraph> = pipeline
                .paragraphs(&text)
                .into_iter()
                .map(|paragraph| {
                    let chunks: Vec<String> = chunk_paragraph(&paragraph.text)
                        .into_iter()
                        .map(|c| c.text)
                        .collect();
                    ChunkedParagraph {
                        index: paragraph.index,
                        sentences: split_sentences(&paragraph.text),
                        lossless: verify_round_trip(&paragraph.text, &chunks),
                        chunks,
                    }
                })
                .collect();
            print_json(&output, args.pretty)
        }
        Some(Commands::Scenes { file }) => {
            let text = read_input(file.as_ref()).await?;
            let planned = plan_text(&text, &args.plan, &config).await?;
            let output: Vec<ParagraphScenes> = planned
                .iter()
                .map(|paragraph| ParagraphScenes {
                    index: paragraph.index,
                    scenes: group_scenes(&paragraph.plans),
                    cues: build_cues(&paragraph.plans, &config.subtitles),
                })
                .collect();
            print_json(&output, args.pretty)
        }
        None => {
            let text = read_input(args.file.as_ref()).await?;
            let planned = plan_text(&text, &args.plan, &config).await?;
            print_json(&planned, args.pretty)
        }
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

async fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Build the planner from flags, app config and llm.toml.
fn build_planner(plan: &PlanArgs, config: &ReadalongConfig) -> Result<ScenePlanner> {
    let timeout = plan
        .timeout
        .map(|secs| std::time::Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| config.oracle_timeout());

    if plan.offline {
        info!("offline: using default scene plans");
        return Ok(ScenePlanner::offline().with_timeout(timeout));
    }

    let llm_config = llm_client::Config::load().context("Failed to load LLM configuration")?;
    let preset_name = plan
        .model
        .as_deref()
        .or(config.preset.as_deref())
        .unwrap_or_else(|| llm_config.get_default_for_program(PROGRAM));
    let preset = llm_config.get_preset(preset_name)?;
    let provider = llm_client::get_provider(preset, llm_config.get_provider_config(&preset.provider))
        .with_context(|| format!("Failed to set up model preset '{}'", preset_name))?;

    debug!(
        "preset {} -> {} ({}), timeout {:?}",
        preset_name, preset.provider, preset.model, timeout
    );

    Ok(ScenePlanner::new(Arc::from(provider)).with_timeout(timeout))
}

async fn plan_text(
    text: &str,
    plan: &PlanArgs,
    config: &ReadalongConfig,
) -> Result<Vec<PlannedParagraph>> {
    let pipeline = Pipeline::new(build_planner(plan, config)?).with_limits(config.paragraphs);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} paragraphs ({elapsed})")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let planned = pipeline
        .process_with_progress(text, |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .await;
    pb.finish_and_clear();

    Ok(planned?)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = ReadalongConfig::load()?;
            println!("Configuration file: {:?}", ReadalongConfig::config_path()?);
            println!();
            match &config.preset {
                Some(preset) => println!("preset = \"{}\"", preset),
                None => println!("preset = (llm.toml default)"),
            }
            println!("oracle_timeout_secs = {}", config.oracle_timeout_secs);
            println!("paragraphs.max_chars = {}", config.paragraphs.max_chars);
            println!("paragraphs.max_paragraphs = {}", config.paragraphs.max_paragraphs);
            println!("subtitles.words_per_second = {}", config.subtitles.words_per_second);
            println!("subtitles.min_display_secs = {}", config.subtitles.min_display_secs);
        }
        ConfigAction::SetPreset { name } => {
            let llm_config = llm_client::Config::load()?;
            llm_config.get_preset(name)?;
            let mut config = ReadalongConfig::load()?;
            config.preset = Some(name.clone());
            config.save()?;
            println!("Default preset set to: {}", name);
        }
        ConfigAction::SetTimeout { secs } => {
            let mut config = ReadalongConfig::load()?;
            config.oracle_timeout_secs = (*secs).max(1);
            config.save()?;
            println!("Oracle timeout set to: {}s", config.oracle_timeout_secs);
        }
    }
    Ok(())
}
