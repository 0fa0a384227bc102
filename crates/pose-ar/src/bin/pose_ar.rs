//! Command-line runner: the AR pipeline over a directory of frames.
//!
//! Frames are processed in sorted filename order, standing in for the
//! video loop of an interactive shell. Overlaid frames land in the output
//! directory under their original names; an optional JSONL report records
//! the per-frame outcome.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use image::ImageReader;
use log::{info, warn, LevelFilter};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use pose_ar::{
    BoardSpec, CameraIntrinsics, CameraModel, Distortion, FrameOutcome, OverlaySpec, Pipeline,
    PipelineConfig,
};

#[derive(Parser)]
#[command(
    name = "pose-ar",
    about = "Chessboard camera-pose estimation with an AR overlay"
)]
struct Args {
    /// Directory of decoded frames (png/jpg/bmp), processed in sorted order.
    #[arg(long)]
    frames: PathBuf,

    /// Calibration JSON: {"camera_matrix": [[..];3], "dist_coeffs": [k1,k2,p1,p2,k3]}.
    #[arg(long)]
    calibration: PathBuf,

    /// Inner corner columns of the board.
    #[arg(long, default_value_t = 8)]
    cols: u32,

    /// Inner corner rows of the board.
    #[arg(long, default_value_t = 6)]
    rows: u32,

    /// Physical cell size of the board squares.
    #[arg(long, default_value_t = 0.03)]
    cell_size: f64,

    /// Output directory for overlaid frames.
    #[arg(long)]
    out: PathBuf,

    /// Optional JSONL per-frame report.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// OpenCV-style calibration file payload.
#[derive(Deserialize)]
struct CalibrationFile {
    camera_matrix: [[f64; 3]; 3],
    dist_coeffs: [f64; 5],
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: &'a str,
    status: &'static str,
    camera_position: Option<[f64; 3]>,
}

fn load_camera(path: &Path) -> Result<CameraModel, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)?;
    let calib: CalibrationFile = serde_json::from_str(&raw)?;

    let k = Matrix3::from_row_slice(&[
        calib.camera_matrix[0][0],
        calib.camera_matrix[0][1],
        calib.camera_matrix[0][2],
        calib.camera_matrix[1][0],
        calib.camera_matrix[1][1],
        calib.camera_matrix[1][2],
        calib.camera_matrix[2][0],
        calib.camera_matrix[2][1],
        calib.camera_matrix[2][2],
    ]);
    Ok(CameraModel::new(
        CameraIntrinsics::from_k_matrix(&k),
        Distortion::from_opencv(calib.dist_coeffs),
    )?)
}

fn frame_paths(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("png" | "jpg" | "jpeg" | "bmp")
            )
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    pose_ar::core::init_with_level(level)?;

    let camera = load_camera(&args.calibration)?;
    let config = PipelineConfig {
        camera,
        board: BoardSpec::new(args.cols, args.rows, args.cell_size)?,
        overlay: OverlaySpec::default(),
        detector: Default::default(),
        style: Default::default(),
    };
    let pipeline = Pipeline::new(config)?;

    fs::create_dir_all(&args.out)?;
    let mut report = args
        .report
        .as_ref()
        .map(fs::File::create)
        .transpose()?;

    let paths = frame_paths(&args.frames)?;
    if paths.is_empty() {
        warn!("no frames found in {}", args.frames.display());
    }

    let mut overlaid = 0usize;
    for path in &paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("frame");

        let mut frame = ImageReader::open(path)?.decode()?.to_rgb8();
        let outcome = pipeline.process_frame(&mut frame);

        let (status, camera_position) = match &outcome {
            FrameOutcome::Overlaid {
                camera_position, ..
            } => {
                overlaid += 1;
                (
                    "overlaid",
                    Some([camera_position.x, camera_position.y, camera_position.z]),
                )
            }
            FrameOutcome::NoDetection => ("no_detection", None),
            FrameOutcome::SolveFailed(_) => ("solve_failed", None),
        };

        frame.save(args.out.join(name))?;

        if let Some(file) = report.as_mut() {
            let record = FrameRecord {
                frame: name,
                status,
                camera_position,
            };
            writeln!(file, "{}", serde_json::to_string(&record)?)?;
        }
    }

    info!("{} of {} frames overlaid", overlaid, paths.len());
    Ok(())
}
