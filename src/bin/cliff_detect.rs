use cliff_detector::config::load_config;
use cliff_detector::image::io::{load_depth_png, save_depth_png, write_json_file};
use cliff_detector::{CliffDetector, DepthFrame, FrameHeader, PinholeCamera};
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path)).map_err(|e| e.to_string())?;

    let depth = load_depth_png(&config.input).map_err(|e| e.to_string())?;
    let camera = PinholeCamera::from_camera_info(&config.camera);
    let mut detector = CliffDetector::new(config.params.clone()).map_err(|e| e.to_string())?;

    let frame = DepthFrame {
        header: FrameHeader::new(config.frame_id.clone(), config.stamp),
        image: depth.as_view(),
    };
    let report = detector
        .detect_with_diagnostics(&frame, &camera)
        .map_err(|e| e.to_string())?;

    println!(
        "Detected {} cliff blocks, {} boundary points in {:.3} ms",
        report.trace.blocks.cliff_blocks,
        report.polygon.len(),
        report.trace.timings.total_ms
    );
    for p in &report.polygon.points {
        println!("  x={:+.3} y={:.3}", p.x, p.y);
    }

    if let Some(path) = &config.output.polygon_json {
        write_json_file(path, &report).map_err(|e| e.to_string())?;
        println!("Saved report to {}", path.display());
    }
    if let (Some(path), Some(annotated)) = (&config.output.annotated_depth, &report.annotated_depth)
    {
        save_depth_png(annotated, path).map_err(|e| e.to_string())?;
        println!("Saved annotated depth to {}", path.display());
    }

    Ok(())
}

fn usage() -> String {
    "Usage: cliff_detect <config.json>".to_string()
}
