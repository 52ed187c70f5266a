use crate::core::ConfigProvider;
use crate::domain::model::{
    AnimationParams, FrameSettings, HeatmapParams, OutputFormat, SyntheticParams,
    ThresholdParams, TrackingParams,
};
use crate::utils::error::{EleganceError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_ordered, validate_path,
    validate_positive_number, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Frame files are named with six digits.
pub const MAX_FRAME_NUMBER: u32 = 999_999;
pub const MAX_INTERVAL_MS: u64 = 60_000;
pub const MAX_SPEED_FACTOR: u32 = 1_000;
pub const MAX_SYNTHETIC_SIDE: u32 = 8_192;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub project: ProjectConfig,
    pub data: DataConfig,
    pub frames: FrameSettings,
    pub threshold: ThresholdParams,
    pub tracking: TrackingParams,
    pub heatmap: HeatmapParams,
    pub animation: AnimationParams,
    pub synthetic: SyntheticParams,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "elegance".to_string(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub root: String,
    pub output_format: OutputFormat,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: "./data".to_string(),
            output_format: OutputFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EleganceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EleganceError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_ROOT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| EleganceError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EleganceError::config(e.to_string()))
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("project.name", &self.project.name)?;
        validate_path("data.root", &self.data.root)?;

        let frames = &self.frames;
        validate_ordered("frames.start", frames.start, "frames.end", frames.end, false)?;
        validate_range("frames.end", frames.end, 1, MAX_FRAME_NUMBER)?;
        // frame `end + diff` is read by the difference pass
        validate_range("frames.diff", frames.diff, 1, MAX_FRAME_NUMBER - frames.end)?;
        validate_range("frames.interval_ms", frames.interval_ms, 1, MAX_INTERVAL_MS)?;
        validate_range("frames.speed_factor", frames.speed_factor, 1, MAX_SPEED_FACTOR)?;

        validate_ordered(
            "tracking.min_area",
            self.tracking.min_area,
            "tracking.max_area",
            self.tracking.max_area,
            true,
        )?;
        validate_positive_number("tracking.min_area", self.tracking.min_area, 0.0)?;
        validate_positive_number("tracking.box_thickness", self.tracking.box_thickness, 1)?;

        validate_positive_number("heatmap.cell_size", self.heatmap.cell_size, 1)?;

        validate_range("animation.scale", self.animation.scale, f32::EPSILON, 1.0)?;
        validate_path("animation.output", &self.animation.output)?;
        let extension = Path::new(&self.animation.output)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        validate_one_of("animation.output", extension, &["gif"])?;

        let synthetic = &self.synthetic;
        validate_range("synthetic.width", synthetic.width, 1, MAX_SYNTHETIC_SIDE)?;
        validate_range("synthetic.height", synthetic.height, 1, MAX_SYNTHETIC_SIDE)?;
        validate_range("synthetic.frames", synthetic.frames, 1, MAX_FRAME_NUMBER)?;
        validate_range("synthetic.worm_length", synthetic.worm_length, 1, MAX_SYNTHETIC_SIDE)?;
        validate_range(
            "synthetic.worm_thickness",
            synthetic.worm_thickness,
            1,
            MAX_SYNTHETIC_SIDE,
        )?;
        let footprint = synthetic.worm_length + 3 * synthetic.worm_thickness + 4;
        if footprint > synthetic.width.min(synthetic.height) {
            return Err(EleganceError::ConfigValidationError {
                field: "synthetic.worm_length".to_string(),
                message: format!(
                    "a worm of length {} and thickness {} does not fit a {}x{} frame",
                    synthetic.worm_length,
                    synthetic.worm_thickness,
                    synthetic.width,
                    synthetic.height
                ),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn data_root(&self) -> &str {
        &self.data.root
    }

    fn output_format(&self) -> OutputFormat {
        self.data.output_format
    }

    fn frames(&self) -> &FrameSettings {
        &self.frames
    }

    fn threshold(&self) -> &ThresholdParams {
        &self.threshold
    }

    fn tracking(&self) -> &TrackingParams {
        &self.tracking
    }

    fn heatmap(&self) -> &HeatmapParams {
        &self.heatmap
    }

    fn animation(&self) -> &AnimationParams {
        &self.animation
    }

    fn synthetic(&self) -> &SyntheticParams {
        &self.synthetic
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
