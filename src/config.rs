//! Configuration for the tile engine and its CLI.
//!
//! [`EngineConfig`] carries the deployment-wide rendering settings; the
//! request types override format and quality per call. CLI options follow
//! the usual precedence: command-line flag, then `WSI_`-prefixed
//! environment variable, then the default.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::tile::{is_valid_quality, ImageFormat, DEFAULT_QUALITY};

// =============================================================================
// Default Values
// =============================================================================

/// Default square tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default overlap between adjacent tiles, in pixels.
pub const DEFAULT_OVERLAP: u32 = 0;

/// Default cache entry lifetime in seconds (1 hour).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

// =============================================================================
// EngineConfig
// =============================================================================

/// Deployment-wide engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Default square tile edge in pixels
    pub tile_size: u32,

    /// Overlap between adjacent tiles, in pixels
    pub overlap: u32,

    /// Restrict pyramids to the scanned region
    pub limit_bounds: bool,

    /// Default output encoding
    pub format: ImageFormat,

    /// Default encoding quality for lossy formats (1-100)
    pub quality: u8,

    /// Lifetime of cached artifacts
    pub cache_ttl: Duration,

    /// Collapse concurrent cache misses on one key into a single
    /// regeneration. Off by default; correctness never depends on it.
    pub coalesce_misses: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            overlap: DEFAULT_OVERLAP,
            limit_bounds: true,
            format: ImageFormat::Jpeg,
            quality: DEFAULT_QUALITY,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            coalesce_misses: false,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_size == 0 {
            return Err("tile_size must be greater than 0".to_string());
        }

        if !is_valid_quality(self.quality) {
            return Err("quality must be between 1 and 100".to_string());
        }

        if self.cache_ttl.is_zero() {
            return Err("cache_ttl must be greater than 0".to_string());
        }

        Ok(())
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// WSI Tiler - a pyramid tile and thumbnail engine for Whole Slide Images.
#[derive(Parser, Debug)]
#[command(name = "wsi-tiler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the Deep Zoom descriptor and image summary for a slide.
    Describe(DescribeArgs),

    /// Delete slides from the remote catalog and, optionally, from disk.
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Image identifier to describe.
    pub image_id: String,

    /// Directory containing the slide files.
    #[arg(long, env = "WSI_SLIDES_DIR")]
    pub slides_dir: PathBuf,

    /// Base URL advertised in the descriptor's Url field.
    #[arg(long, default_value = "", env = "WSI_BASE_URL")]
    pub base_url: String,

    /// Square tile edge advertised by the descriptor.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "WSI_TILE_SIZE")]
    pub tile_size: u32,

    /// Address the original upload rather than the repository copy.
    #[arg(long, default_value_t = false)]
    pub original_file: bool,

    /// MIME-type hint for picking among multiple source files.
    #[arg(long)]
    pub mimetype: Option<String>,

    /// Emit the .dzi XML document instead of JSON.
    #[arg(long, default_value_t = false)]
    pub xml: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// File listing the identifiers to delete, one per line.
    #[arg(long, env = "WSI_FILES_LIST")]
    pub files_list: PathBuf,

    /// Base URL of the catalog service.
    #[arg(long, env = "WSI_BASE_URL")]
    pub base_url: String,

    /// Also delete the index file and data folder from disk.
    #[arg(long, default_value_t = false)]
    pub delete: bool,
}
