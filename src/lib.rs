pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::LocalFrameStore;
pub use app::controller::Controller;
pub use config::TomlConfig;
pub use core::engine::PreRenderEngine;
pub use utils::error::{EleganceError, Result};
