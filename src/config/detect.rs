use crate::camera::CameraInfo;
use crate::error::{CliffError, Result};
use crate::CliffParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutputConfig {
    pub polygon_json: Option<PathBuf>,
    pub annotated_depth: Option<PathBuf>,
}

/// Runtime configuration of the `cliff_detect` tool.
#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    /// 16-bit depth PNG, values in millimetres.
    pub input: PathBuf,
    pub camera: CameraInfo,
    #[serde(default)]
    pub params: CliffParams,
    #[serde(default = "default_frame_id")]
    pub frame_id: String,
    #[serde(default)]
    pub stamp: f64,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_frame_id() -> String {
    "camera_depth_optical_frame".to_string()
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CliffError::Io(format!("Failed to read config {}: {e}", path.display())))?;
    parse_config(&contents)
        .map_err(|e| CliffError::Io(format!("Failed to parse config {}: {e}", path.display())))
}

pub fn parse_config(contents: &str) -> std::result::Result<RuntimeConfig, serde_json::Error> {
    serde_json::from_str(contents)
}
