//! `boxtag`: command-line client for the annotation store.
//!
//! Configuration comes from `BOXTAG_*` environment variables (a `.env`
//! file is loaded first) and `--api-url` / `--token` override them.

pub mod input;

use anyhow::{Context, Result, bail};
use bt_core::id::ImageId;
use bt_sync::config::{CommitStrategy, SyncConfig};
use bt_sync::engine::{CommitReport, SyncEngine};
use bt_sync::http::HttpBackend;
use bt_sync::plan::CommitPlan;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "boxtag")]
#[command(about = "BoxTag annotation client", version)]
pub struct Cli {
    /// Base URL of the annotation API.
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the known tags.
    Tags,
    /// Print an image and its annotations as JSON.
    Show {
        #[arg(value_name = "IMAGE_ID")]
        image: i64,
    },
    /// List the unannotated images.
    Queue {
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Replace the annotations of an image with the boxes in FILE.
    Push {
        #[arg(value_name = "IMAGE_ID")]
        image: i64,
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// `reconcile` (default) or `replace-all`.
        #[arg(long)]
        strategy: Option<CommitStrategy>,
        /// Print the planned requests without sending them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete every annotation of an image.
    Clear {
        #[arg(value_name = "IMAGE_ID")]
        image: i64,
        /// Required: the deletion cannot be undone.
        #[arg(long)]
        yes: bool,
    },
    /// Create the drafts in FILE across several images at once.
    Submit {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let config = resolve_config(&cli)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(execute(cli.command, config))
}

fn resolve_config(cli: &Cli) -> Result<SyncConfig> {
    let mut config = SyncConfig::from_env().map_err(anyhow::Error::msg)?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url.as_str());
    }
    if let Some(token) = &cli.token {
        config = config.with_token(token.as_str());
    }
    if let Commands::Queue {
        page_size: Some(size),
    } = cli.command
    {
        if size == 0 {
            bail!("--page-size must be at least 1");
        }
        config.page_size = size;
    }
    if let Commands::Push {
        strategy: Some(strategy),
        ..
    } = cli.command
    {
        config.strategy = strategy;
    }
    Ok(config)
}

async fn execute(command: Commands, config: SyncConfig) -> Result<()> {
    log::debug!("using {} ({})", config.api_url, config.strategy);
    let engine = SyncEngine::new(HttpBackend::new(&config), &config);

    match command {
        Commands::Tags => {
            for tag in engine.fetch_tags().await? {
                println!("{tag}");
            }
        }
        Commands::Show { image } => {
            let loaded = engine
                .load_image(ImageId(image))
                .await
                .with_context(|| format!("failed to load image {image}"))?;
            let annotations: Vec<_> = loaded
                .annotations
                .iter()
                .map(|a| {
                    json!({
                        "id": a.remote_id,
                        "x": a.bbox.x,
                        "y": a.bbox.y,
                        "w": a.bbox.w,
                        "h": a.bbox.h,
                        "tag": a.tag,
                    })
                })
                .collect();
            print_json(&json!({ "image": loaded.image, "annotations": annotations }))?;
        }
        Commands::Queue { .. } => {
            let images = engine.fetch_queue().await?;
            for image in &images {
                println!("{}\t{}", image.id, image.display_name());
            }
            log::info!("{} images awaiting annotation", images.len());
        }
        Commands::Push {
            image,
            file,
            dry_run,
            ..
        } => {
            let image_id = ImageId(image);
            let local = input::read_boxes(&file, image_id)?;
            if dry_run {
                let plan = engine.plan_image(image_id, &local).await?;
                print_json(&plan_summary(&plan))?;
            } else {
                let report = engine
                    .commit_image(image_id, &local)
                    .await
                    .with_context(|| format!("failed to push annotations for image {image}"))?;
                print_json(&report_summary(&report))?;
            }
        }
        Commands::Clear { image, yes } => {
            if !yes {
                bail!("refusing to delete every annotation of image {image} without --yes");
            }
            let report = engine
                .with_strategy(CommitStrategy::ReplaceAll)
                .commit_image(ImageId(image), &[])
                .await
                .with_context(|| format!("failed to clear image {image}"))?;
            println!("deleted {} annotations from image {image}", report.deleted);
        }
        Commands::Submit { file } => {
            let working_set = input::read_drafts(&file)?;
            let outcome = engine.submit_batch(&working_set).await?;
            match outcome.images {
                Some(images) => println!(
                    "submitted {} annotations; {} images still awaiting annotation",
                    outcome.created,
                    images.len()
                ),
                None => println!(
                    "submitted {} annotations; the queue could not be reloaded",
                    outcome.created
                ),
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
struct Summary {
    image_id: Option<ImageId>,
    deleted: usize,
    created: usize,
    kept: usize,
}

fn plan_summary(plan: &CommitPlan) -> Summary {
    Summary {
        image_id: plan.image_id,
        deleted: plan.deletes.len(),
        created: plan.creates.len(),
        kept: plan.kept.len(),
    }
}

fn report_summary(report: &CommitReport) -> Summary {
    Summary {
        image_id: report.image_id,
        deleted: report.deleted,
        created: report.created.len(),
        kept: report.kept.len(),
    }
}
