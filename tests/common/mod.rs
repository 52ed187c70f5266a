#![allow(dead_code)]

use elegance::domain::model::OutputFormat;
use elegance::{Controller, LocalFrameStore, TomlConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SMALL_CONFIG: &str = r#"
[project]
name = "integration"

[data]
output_format = "png"

[frames]
start = 1
end = 5
diff = 1
interval_ms = 40
speed_factor = 2

[synthetic]
frames = 6
seed = 11

[animation]
scale = 0.25
"#;

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("data");
        Self { _tmp: tmp, root }
    }

    pub fn config(&self) -> TomlConfig {
        let mut config = TomlConfig::from_toml_str(SMALL_CONFIG).expect("parse test config");
        config.data.root = self.root.to_str().expect("utf-8 temp path").to_string();
        assert_eq!(config.data.output_format, OutputFormat::Png);
        config
    }

    pub fn controller(&self) -> Controller<LocalFrameStore, TomlConfig> {
        self.controller_with(self.config())
    }

    pub fn controller_with(&self, config: TomlConfig) -> Controller<LocalFrameStore, TomlConfig> {
        Controller::new(LocalFrameStore::new(&self.root), config)
    }

    pub fn store(&self) -> LocalFrameStore {
        LocalFrameStore::new(&self.root)
    }

    /// Writes the small configuration next to the data root, for CLI runs.
    pub fn write_config_file(&self) -> PathBuf {
        let path = self.root.with_file_name("elegance.toml");
        let mut config = self.config();
        config.project.description = Some("written by TestEnv".to_string());
        fs::write(&path, config.to_toml_string().expect("render config")).expect("write config");
        path
    }

    pub fn image(&self, kind: &str, frame: u32, extension: &str) -> PathBuf {
        self.root
            .join("images")
            .join(kind)
            .join(format!("frame_{:06}.{}", frame, extension))
    }

    pub fn artifact(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

pub fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}
