pub mod lsq;
pub mod stencil;
pub mod stenciled;

#[cfg(feature = "debug")]
pub mod debug;

use thiserror::Error;

/// Failures of the block setup pipeline.
///
/// None of these occur for a correctly constructed mesh; all are treated as
/// fatal at the point of detection and never retried, since the precomputed
/// matrices are a hard precondition for the downstream solver.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid block dimensions: {0}")]
    InvalidDimensions(String),

    #[error("inconsistent sector topology at face {face}: {reason}")]
    TopologyInconsistency { face: usize, reason: &'static str },

    #[error("degenerate geometry for face {face} (area = {area:e})")]
    DegenerateGeometry { face: usize, area: f64 },

    #[error("normal-equations matrix is singular for face {face}, stencil {slot}")]
    Factorization { face: usize, slot: usize },

    #[error("block is already associated with a mesh; re-dimension before associating again")]
    AlreadyAssociated,
}
