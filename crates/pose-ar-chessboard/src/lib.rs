//! Full-grid chessboard corner detection.
//!
//! Unlike a generic target detector, this crate answers a narrower question:
//! given a frame and a [`pose_ar_core::BoardSpec`], locate **all**
//! `cols * rows` inner corners and hand them back in the board's row-major
//! order, or report nothing. A full, ordered grid is the correspondence
//! invariant the downstream PnP solve depends on, so partial boards are a
//! miss rather than a partial result.
//!
//! Detection runs in stages:
//! 1. ChESS corner detection (`chess-corners`): locally contrast-normalized
//!    responses with non-max suppression.
//! 2. Strength filter and a fast-rejection pre-check (fewer candidates than
//!    board corners means the board cannot be fully visible).
//! 3. Grid-graph linking: kNN candidates (`kiddo`) gated by corner
//!    orientation orthogonality and the 45-degree edge rule, at most one
//!    link per compass direction.
//! 4. BFS lattice coordinates per connected component, exact-size fit
//!    against the board spec, canonical row-major ordering.
//!
//! ## Quickstart
//!
//! ```no_run
//! use pose_ar_chessboard::{default_chess_config, BoardDetector, BoardDetectorParams};
//! use pose_ar_core::BoardSpec;
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("frame.png")?.decode()?.to_luma8();
//! let spec = BoardSpec::new(8, 6, 0.03)?;
//! let detector = BoardDetector::new(spec, BoardDetectorParams::default());
//!
//! let chess_cfg = default_chess_config();
//! match detector.detect(&img, &chess_cfg) {
//!     Some(found) => println!("all {} corners located", found.corners.len()),
//!     None => println!("board not (fully) visible"),
//! }
//! # Ok(())
//! # }
//! ```

mod detector;
mod gridgraph;
mod lattice;
mod params;

pub use chess_corners::ChessConfig;
pub use detector::{
    default_chess_config, detect_corners, BoardDetection, BoardDetector, Corner,
};
pub use gridgraph::{GridGraph, GridLink, LinkDirection};
pub use params::{BoardDetectorParams, GridGraphParams};
