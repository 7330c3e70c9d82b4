//! Application context built once at startup.

use std::path::PathBuf;

use maniac_engine::logging::LoggingConfig;
use maniac_engine::time::{SchedulerConfig, StepPolicy};
use maniac_engine::window::RuntimeConfig;
use winit::dpi::LogicalSize;

use crate::cli::CliOptions;

/// Everything the app needs that is decided before the window opens.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub window_size: (f64, f64),
    /// Host directory mounted as the VFS root.
    pub data_root: PathBuf,
    /// Tileset directory inside the VFS.
    pub tileset_dir: String,
    pub threaded_simulation: bool,
    pub level_size: (u32, u32),
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
    /// Font files tried in order for UI text.
    pub font_candidates: Vec<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "ManiacLab".into(),
            window_size: (800.0, 600.0),
            data_root: PathBuf::from("data"),
            tileset_dir: "tilesets".into(),
            threaded_simulation: true,
            level_size: (50, 50),
            scheduler: SchedulerConfig { step_policy: StepPolicy::OncePerTick, start_running: false },
            logging: LoggingConfig::default(),
            font_candidates: [
                "/usr/share/fonts/TTF/DejaVuSans.ttf",
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/dejavu/DejaVuSans.ttf",
                "/usr/share/fonts/noto/NotoSans-Regular.ttf",
                "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
                "C:\\Windows\\Fonts\\segoeui.ttf",
                "/System/Library/Fonts/Supplemental/Arial.ttf",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        }
    }
}

impl AppConfig {
    pub fn from_cli(opts: &CliOptions) -> Self {
        let mut config = Self {
            data_root: PathBuf::from(&opts.data_dir),
            threaded_simulation: opts.threaded_simulation,
            ..Self::default()
        };
        if let Some(filter) = &opts.log_filter {
            config.logging = LoggingConfig::with_filter(filter.clone());
        }
        config
    }

    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.window_size.0, self.window_size.1),
        }
    }

    /// Bytes of the first readable font candidate.
    pub fn load_font(&self) -> Option<Vec<u8>> {
        self.font_candidates.iter().find_map(|p| std::fs::read(p).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_reach_the_config() {
        let opts = CliOptions {
            threaded_simulation: false,
            data_dir: "/opt/ml".into(),
            log_filter: Some("maniac_lab=trace".into()),
        };
        let config = AppConfig::from_cli(&opts);
        assert!(!config.threaded_simulation);
        assert_eq!(config.data_root, PathBuf::from("/opt/ml"));
        assert_eq!(config.logging.env_filter.as_deref(), Some("maniac_lab=trace"));
        assert!(!config.scheduler.start_running);
    }

    #[test]
    fn missing_fonts_are_not_an_error() {
        let config = AppConfig { font_candidates: vec![PathBuf::from("/nonexistent.ttf")], ..AppConfig::default() };
        assert!(config.load_font().is_none());
    }
}
