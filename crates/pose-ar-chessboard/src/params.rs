use serde::{Deserialize, Serialize};

/// Parameters for grid-graph neighbor linking.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct GridGraphParams {
    /// Minimal pixel distance between linked corners.
    pub min_spacing_pix: f32,

    /// Maximal pixel distance between linked corners.
    pub max_spacing_pix: f32,

    /// Number of kNN candidates examined per corner.
    pub k_neighbors: usize,

    /// Tolerance for the orientation checks, in degrees.
    pub orientation_tolerance_deg: f32,
}

impl Default for GridGraphParams {
    fn default() -> Self {
        Self {
            min_spacing_pix: 5.0,
            max_spacing_pix: 120.0,
            k_neighbors: 8,
            orientation_tolerance_deg: 22.5,
        }
    }
}

/// Parameters for the full-grid board detector.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct BoardDetectorParams {
    /// Minimal ChESS corner strength to consider.
    pub min_strength: f32,

    pub grid: GridGraphParams,
}

impl Default for BoardDetectorParams {
    fn default() -> Self {
        Self {
            min_strength: 0.0,
            grid: GridGraphParams::default(),
        }
    }
}
