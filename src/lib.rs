//! Precomputed reconstruction stencils for blocks of a spherical geodesic
//! finite-volume mesh.
//!
//! A [`block::StenciledBlock`] owns one logically rectangular sector of
//! triangular or quadrilateral faces, wrapped with ghost layers in the
//! angular and radial directions. Associating the block with concrete mesh
//! geometry marks the stencil-eligible faces, builds the central and
//! directional stencils, computes the spherical face/edge moments, and
//! caches the factorized least-squares geometry matrix for every
//! (face, stencil) pair so the reconstruction layer can fit a local linear
//! model with a single back-substitution.

pub mod block;
pub mod geometry;
pub mod mesh;

pub use block::stenciled::StenciledBlock;
pub use block::SetupError;
pub use mesh::radial::{FixedShellRatio, LogRadialMap, RadialMap};
pub use mesh::sector::FaceShape;
