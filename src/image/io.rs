//! I/O helpers for depth images and JSON.
//!
//! - `load_depth_png`: read a 16-bit grayscale PNG into an owned depth buffer.
//! - `save_depth_png`: write an owned depth buffer to a 16-bit PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::DepthImageBuf;
use crate::error::{CliffError, Result};
use image::{DynamicImage, ImageBuffer, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert it to 16-bit single channel.
///
/// Values are taken as millimetres; 8-bit inputs are widened by the `image`
/// crate and are therefore only useful for smoke tests.
pub fn load_depth_png(path: &Path) -> Result<DepthImageBuf> {
    let img = image::open(path)
        .map_err(|e| CliffError::Io(format!("Failed to open {}: {e}", path.display())))?
        .into_luma16();
    let w = img.width() as usize;
    let h = img.height() as usize;
    Ok(DepthImageBuf {
        w,
        h,
        data: img.into_raw(),
    })
}

/// Save a depth buffer as a 16-bit grayscale PNG.
pub fn save_depth_png(buffer: &DepthImageBuf, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let image: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(buffer.w as u32, buffer.h as u32, buffer.data.clone())
            .ok_or_else(|| CliffError::Io("Failed to create image buffer".to_string()))?;
    DynamicImage::ImageLuma16(image)
        .save(path)
        .map_err(|e| CliffError::Io(format!("Failed to save {}: {e}", path.display())))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        CliffError::Io(format!("Failed to serialize JSON for {}: {e}", path.display()))
    })?;
    fs::write(path, json)
        .map_err(|e| CliffError::Io(format!("Failed to write JSON {}: {e}", path.display())))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                CliffError::Io(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
    }
    Ok(())
}
