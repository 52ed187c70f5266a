use crate::config::toml_config::TomlConfig;
use crate::domain::model::{FrameKind, OutputFormat};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "elegance", version)]
#[command(about = "Pre-render, track and animate C. elegans frame sequences")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory holding `images/`
    #[arg(long, global = true)]
    pub data_root: Option<String>,

    #[arg(long, global = true)]
    pub start: Option<u32>,

    #[arg(long, global = true)]
    pub end: Option<u32>,

    /// Frame offset used by the difference pass
    #[arg(long, global = true)]
    pub diff: Option<u32>,

    /// Encoding for rendered frames
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable system monitoring (CPU/memory)
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Write a synthetic raw sequence with ground truth
    Generate,
    /// Run the pre-render passes (otsu, difference, track)
    Prerender {
        #[arg(long, value_enum)]
        only: Option<FrameKind>,
    },
    /// Build heat maps from the saved trajectory
    Heatmap,
    /// Export the 2x2 animated GIF
    Animate {
        #[arg(long)]
        output: Option<String>,
    },
    /// Pre-render, build heat maps and animate
    Run,
    /// Print the effective configuration as TOML
    ShowConfig,
}

impl Cli {
    /// 載入配置檔並套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(root) = &self.data_root {
            config.data.root = root.clone();
        }
        if let Some(start) = self.start {
            config.frames.start = start;
        }
        if let Some(end) = self.end {
            config.frames.end = end;
        }
        if let Some(diff) = self.diff {
            config.frames.diff = diff;
        }
        if let Some(format) = self.format {
            config.data.output_format = format;
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }
        if self.json_logs {
            config.monitoring.json_logs = true;
        }
    }
}
