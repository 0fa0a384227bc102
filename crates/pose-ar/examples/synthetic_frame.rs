//! Render a synthetic chessboard frame, run the pipeline on it and save the
//! overlaid result.

use image::{Rgb, RgbImage};
use pose_ar::{
    BoardSpec, CameraIntrinsics, CameraModel, Distortion, FrameOutcome, OverlaySpec, Pipeline,
    PipelineConfig,
};

/// Paint a fronto-parallel 9x7-square chessboard (8x6 inner corners).
fn synthetic_board_frame(square_px: u32, origin: (u32, u32)) -> RgbImage {
    let mut img = RgbImage::from_pixel(640, 480, Rgb([220, 220, 220]));
    for sy in 0..7u32 {
        for sx in 0..9u32 {
            let color = if (sx + sy) % 2 == 0 {
                Rgb([15, 15, 15])
            } else {
                Rgb([245, 245, 245])
            };
            for y in 0..square_px {
                for x in 0..square_px {
                    let px = origin.0 + sx * square_px + x;
                    let py = origin.1 + sy * square_px + y;
                    if px < img.width() && py < img.height() {
                        img.put_pixel(px, py, color);
                    }
                }
            }
        }
    }
    img
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let camera = CameraModel::new(
        CameraIntrinsics {
            fx: 600.0,
            fy: 600.0,
            cx: 320.0,
            cy: 240.0,
            skew: 0.0,
        },
        Distortion::default(),
    )?;
    let pipeline = Pipeline::new(PipelineConfig {
        camera,
        board: BoardSpec::new(8, 6, 0.03)?,
        overlay: OverlaySpec::default(),
        detector: Default::default(),
        style: Default::default(),
    })?;

    let mut frame = synthetic_board_frame(45, (100, 50));
    match pipeline.process_frame(&mut frame) {
        FrameOutcome::Overlaid {
            camera_position, ..
        } => println!(
            "overlaid; camera at [{:.3} {:.3} {:.3}]",
            camera_position.x, camera_position.y, camera_position.z
        ),
        FrameOutcome::NoDetection => println!("board not detected"),
        FrameOutcome::SolveFailed(err) => println!("solve failed: {err}"),
    }

    frame.save("synthetic_overlay.png")?;
    println!("wrote synthetic_overlay.png");
    Ok(())
}
