//! WSI Tiler - a pyramid tile and thumbnail engine for Whole Slide Images.
//!
//! The binary fronts two workflows: `describe` prints the Deep Zoom
//! metadata for a slide, `delete` runs the batch deletion utility against
//! a remote catalog.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wsi_tiler::{
    cache::MemoryCacheStore,
    config::{Cli, Command, DeleteArgs, DescribeArgs, EngineConfig},
    dataset::DatasetRegistry,
    deleter::{load_slide_list, HttpCatalogApi, SlideDeleter},
    slide::{DirectoryCatalog, RasterSlideDecoder, SourceOptions},
    tile::TileEngine,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Describe(args) => run_describe(args).await,
        Command::Delete(args) => run_delete(args).await,
    }
}

// =============================================================================
// Describe Command
// =============================================================================

async fn run_describe(args: DescribeArgs) -> ExitCode {
    let config = EngineConfig {
        tile_size: args.tile_size,
        ..EngineConfig::default()
    };
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let engine = TileEngine::with_config(
        RasterSlideDecoder::default(),
        MemoryCacheStore::new(),
        DirectoryCatalog::new(&args.slides_dir),
        Arc::new(DatasetRegistry::with_default_formats()),
        config,
    );

    let source = SourceOptions {
        original_file: args.original_file,
        mimetype: args.mimetype.clone(),
    };
    let resource_url = if args.base_url.is_empty() {
        format!("{}.dzi", args.image_id)
    } else {
        format!(
            "{}/{}.dzi",
            args.base_url.trim_end_matches('/'),
            args.image_id
        )
    };

    let summary = match engine
        .image_summary(&resource_url, &args.image_id, args.tile_size, &source)
        .await
    {
        Ok(summary) => summary,
        Err(e) => {
            error!("Failed to describe '{}': {}", args.image_id, e);
            return ExitCode::FAILURE;
        }
    };

    if args.xml {
        match &summary.tile_sources {
            Some(descriptor) => println!("{}", descriptor.to_dzi_xml()),
            None => {
                error!("No pyramid available for image '{}'", args.image_id);
                return ExitCode::FAILURE;
            }
        }
    } else {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize summary: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Delete Command
// =============================================================================

async fn run_delete(args: DeleteArgs) -> ExitCode {
    let api = match HttpCatalogApi::new(&args.base_url) {
        Ok(api) => api,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let slides = match load_slide_list(&args.files_list).await {
        Ok(slides) => slides,
        Err(e) => {
            error!("Failed to read {}: {}", args.files_list.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if slides.is_empty() {
        info!("Nothing to delete");
        return ExitCode::SUCCESS;
    }

    let deleter = SlideDeleter::new(api);
    match deleter.run(&slides, args.delete).await {
        Ok(report) => {
            info!(
                processed = report.processed,
                deleted = report.deleted,
                skipped = report.skipped,
                warnings = report.warnings,
                "Deletion job finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Deletion job failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "wsi_tiler=debug"
    } else {
        "wsi_tiler=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
