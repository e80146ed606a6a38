use glam::DVec3;
use log::debug;
use nalgebra::Matrix3xX;
use rayon::prelude::*;

use crate::block::lsq::{self, StencilMatrices};
use crate::block::stencil::{StencilTable, Zone};
use crate::block::SetupError;
use crate::geometry::sphere;
use crate::mesh::flags::ElementFlags;
use crate::mesh::radial::RadialMap;
use crate::mesh::sector::{FaceShape, SectorLayout};
use crate::mesh::topology::SectorTopology;

/// One block of a geodesic spherical mesh with precomputed reconstruction
/// stencils.
///
/// Construction fixes the face arity and the sector/slab dimensions and
/// allocates all per-element storage; [`Self::associate_mesh`] attaches
/// concrete geometry and runs the setup pipeline: stencil topology, face and
/// edge moments, and the least-squares geometry matrices. Until then every
/// derived quantity reads as zero/empty.
pub struct StenciledBlock {
    topo: SectorTopology,
    height: usize,
    hghost: usize,

    block_index: usize,
    xi_min: f64,
    xi_max: f64,
    borders: [bool; 2],
    shell_ratio: f64,

    verts: Vec<DVec3>,
    face_area: Vec<f64>,
    face_centroid: Vec<DVec3>,
    edge_length: Vec<f64>,

    stencils: Option<StencilTable>,
    matrices: Vec<StencilMatrices>,
}

impl StenciledBlock {
    /// Create a block for a `width × width` sector with `wghost` ghost cell
    /// layers and a `height`-shell slab with `hghost` ghost shells.
    ///
    /// `wghost ≥ 2` is required so every marked face has neighbor and
    /// neighbor-of-neighbor data; `hghost ≥ 1` keeps the ±1 shell
    /// references of every stencil inside the slab.
    pub fn new(
        shape: FaceShape,
        width: usize,
        wghost: usize,
        height: usize,
        hghost: usize,
    ) -> Result<Self, SetupError> {
        if width == 0 || height == 0 {
            return Err(SetupError::InvalidDimensions(format!(
                "width ({width}) and height ({height}) must be positive"
            )));
        }
        if wghost < 2 {
            return Err(SetupError::InvalidDimensions(format!(
                "need at least two ghost cell layers for stencil construction, got {wghost}"
            )));
        }
        if hghost < 1 {
            return Err(SetupError::InvalidDimensions(format!(
                "need at least one ghost shell for radial stencil zones, got {hghost}"
            )));
        }

        let layout = SectorLayout::new(shape, width, wghost);
        let mut topo = SectorTopology::new(layout);
        mark_stenciled_area(&mut topo);

        let n_faces = topo.n_faces();
        let n_edges = topo.n_edges();
        Ok(Self {
            topo,
            height,
            hghost,
            block_index: 0,
            xi_min: 0.0,
            xi_max: 0.0,
            borders: [false; 2],
            shell_ratio: 0.0,
            verts: Vec::new(),
            face_area: vec![0.0; n_faces],
            face_centroid: vec![DVec3::ZERO; n_faces],
            edge_length: vec![0.0; n_edges],
            stencils: None,
            matrices: Vec::new(),
        })
    }

    /// Re-dimension the block, dropping all derived state. The block
    /// returns to the unassociated state; this is the only route to
    /// re-association.
    pub fn set_dimensions(
        &mut self,
        width: usize,
        wghost: usize,
        height: usize,
        hghost: usize,
    ) -> Result<(), SetupError> {
        *self = Self::new(self.shape(), width, wghost, height, hghost)?;
        Ok(())
    }

    /// Attach the block to concrete mesh geometry and run the setup
    /// pipeline.
    ///
    /// `corners` flags the sector corners adjacent to mesh singular points,
    /// `borders` the radial boundary types (inner, outer), `verts` the
    /// unit-sphere vertex coordinates in lattice order, and `radial_map`
    /// supplies the shell-spacing ratio δ for the block's radial bounds.
    pub fn associate_mesh(
        &mut self,
        index: usize,
        xi_min: f64,
        xi_max: f64,
        corners: &[bool; 4],
        borders: &[bool; 2],
        verts: &[DVec3],
        radial_map: &dyn RadialMap,
    ) -> Result<(), SetupError> {
        if self.stencils.is_some() {
            return Err(SetupError::AlreadyAssociated);
        }
        if !(xi_min > 0.0 && xi_max > xi_min) {
            return Err(SetupError::InvalidDimensions(format!(
                "radial bounds must satisfy 0 < xi_min < xi_max, got [{xi_min}, {xi_max}]"
            )));
        }
        if verts.len() != self.topo.layout().n_verts() {
            return Err(SetupError::InvalidDimensions(format!(
                "expected {} vertex coordinates, got {}",
                self.topo.layout().n_verts(),
                verts.len()
            )));
        }
        let shell_ratio = radial_map.shell_ratio(xi_min, xi_max, self.height);
        if !(shell_ratio.is_finite() && shell_ratio > 0.0) {
            return Err(SetupError::InvalidDimensions(format!(
                "radial map produced an unusable shell ratio {shell_ratio}"
            )));
        }

        self.block_index = index;
        self.xi_min = xi_min;
        self.xi_max = xi_max;
        self.borders = *borders;
        self.shell_ratio = shell_ratio;
        self.verts = verts.to_vec();

        // Existence first: singular corners remove ghost faces, and the
        // stencil bit may only stay on existing faces.
        self.topo.apply_corners(corners);
        self.topo.reconcile_stencils();

        let table = StencilTable::build(&self.topo)?;
        debug!(
            "block {index}: {} stenciled faces of {}",
            table.ranked_faces().len(),
            self.topo.n_faces()
        );

        // Full barrier: matrix assembly reads finalized neighbor centroids.
        self.compute_moments()?;
        debug!(
            "block {index}: moments for {} faces, {} edges",
            self.topo.n_faces(),
            self.topo.n_edges()
        );

        self.matrices = lsq::assemble_all(&table, &self.face_centroid, shell_ratio)?;
        debug!("block {index}: {} geometry matrices cached", self.matrices.len());

        self.stencils = Some(table);
        Ok(())
    }

    /// Face areas and centroids for every existing face, edge lengths for
    /// every existing edge; absent elements keep zero moments.
    fn compute_moments(&mut self) -> Result<(), SetupError> {
        let topo = &self.topo;
        let verts = &self.verts;
        let shape = topo.layout().shape();

        let moments: Vec<(f64, DVec3)> = (0..topo.n_faces())
            .into_par_iter()
            .map(|face| -> Result<(f64, DVec3), SetupError> {
                if !topo.face_flags(face).exists {
                    return Ok((0.0, DVec3::ZERO));
                }
                let fv = topo.face_verts(face);
                let (area, cmass) = match shape {
                    FaceShape::Triangle => {
                        let (a, b, c) = (verts[fv[0]], verts[fv[1]], verts[fv[2]]);
                        (sphere::triangle_area(a, b, c), sphere::triangle_centroid(a, b, c))
                    }
                    FaceShape::Quad => {
                        // Two triangles sharing the 0–2 diagonal; the common
                        // center of mass is area-weighted and not on the
                        // unit sphere.
                        let (a, b, c, d) = (verts[fv[0]], verts[fv[1]], verts[fv[2]], verts[fv[3]]);
                        let area1 = sphere::triangle_area(a, b, c);
                        let area2 = sphere::triangle_area(c, d, a);
                        let cm1 = sphere::triangle_centroid(a, b, c);
                        let cm2 = sphere::triangle_centroid(c, d, a);
                        (area1 + area2, (cm1 * area1 + cm2 * area2) / (area1 + area2))
                    }
                };
                if !(area.is_finite() && area > 0.0) || !cmass.is_finite() {
                    return Err(SetupError::DegenerateGeometry { face, area });
                }
                Ok((area, cmass))
            })
            .collect::<Result<_, _>>()?;

        for (face, (area, cmass)) in moments.into_iter().enumerate() {
            self.face_area[face] = area;
            self.face_centroid[face] = cmass;
        }

        let lengths: Vec<f64> = (0..topo.n_edges())
            .into_par_iter()
            .map(|edge| {
                if !topo.edge_flags(edge).exists {
                    return 0.0;
                }
                let [a, b] = topo.edge_verts(edge);
                sphere::arc_length(verts[a], verts[b])
            })
            .collect();
        self.edge_length = lengths;
        Ok(())
    }

    #[inline]
    pub fn shape(&self) -> FaceShape {
        self.topo.layout().shape()
    }

    #[inline]
    pub fn layout(&self) -> &SectorLayout {
        self.topo.layout()
    }

    #[inline]
    pub fn topology(&self) -> &SectorTopology {
        &self.topo
    }

    #[inline]
    pub fn is_associated(&self) -> bool {
        self.stencils.is_some()
    }

    #[inline]
    pub fn block_index(&self) -> usize {
        self.block_index
    }

    #[inline]
    pub fn radial_bounds(&self) -> (f64, f64) {
        (self.xi_min, self.xi_max)
    }

    #[inline]
    pub fn borders(&self) -> [bool; 2] {
        self.borders
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn hghost(&self) -> usize {
        self.hghost
    }

    /// Shell-spacing ratio δ cached at association.
    #[inline]
    pub fn shell_ratio(&self) -> f64 {
        self.shell_ratio
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.topo.n_faces()
    }

    #[inline]
    pub fn n_edges(&self) -> usize {
        self.topo.n_edges()
    }

    /// Vertex coordinate in lattice order; only valid after association.
    #[inline]
    pub fn vertex(&self, vert: usize) -> DVec3 {
        self.verts[vert]
    }

    #[inline]
    pub fn face_flags(&self, face: usize) -> ElementFlags {
        self.topo.face_flags(face)
    }

    #[inline]
    pub fn has_stencil(&self, face: usize) -> bool {
        self.topo.face_flags(face).has_stencil()
    }

    #[inline]
    pub fn face_area(&self, face: usize) -> f64 {
        self.face_area[face]
    }

    #[inline]
    pub fn face_centroid(&self, face: usize) -> DVec3 {
        self.face_centroid[face]
    }

    #[inline]
    pub fn edge_length(&self, edge: usize) -> f64 {
        self.edge_length[edge]
    }

    /// Stencil slots per face: 1 central + inward/outward directionals.
    #[inline]
    pub fn n_stencils(&self) -> usize {
        2 * self.shape().verts_per_face() + 1
    }

    /// Zones in stencil `slot` (identical for every stenciled face).
    #[inline]
    pub fn zone_count(&self, slot: usize) -> usize {
        assert!(slot < self.n_stencils());
        if slot == 0 {
            self.shape().verts_per_face() + 2
        } else {
            4
        }
    }

    /// Zone list of stencil `slot` for `face`; `None` before association or
    /// for faces without stencils.
    pub fn stencil_zones(&self, face: usize, slot: usize) -> Option<&[Zone]> {
        self.stencils.as_ref()?.zones(face, slot)
    }

    /// Cached geometry matrices of stencil `slot` for `face`.
    pub fn stencil_matrices(&self, face: usize, slot: usize) -> Option<&StencilMatrices> {
        let table = self.stencils.as_ref()?;
        let rank = table.rank(face)?;
        Some(&self.matrices[rank * table.n_stencils() + slot])
    }

    /// Cached design matrix transpose Aᵗ (3 × zone_count).
    pub fn design_transpose(&self, face: usize, slot: usize) -> Option<&Matrix3xX<f64>> {
        self.stencil_matrices(face, slot)
            .map(StencilMatrices::design_transpose)
    }

    /// Fit a local linear model: `deltas[r]` is the field-value difference
    /// between zone `r` and the principal face. Returns the three fitted
    /// gradient components.
    pub fn fit(&self, face: usize, slot: usize, deltas: &[f64]) -> Option<DVec3> {
        self.stencil_matrices(face, slot)?
            .solve(deltas)
            .map(|g| DVec3::new(g[0], g[1], g[2]))
    }
}

/// Flag every face eligible to host a stencil: the interior plus one ring of
/// cells, which leaves full neighbor-of-neighbor data inside the ghost
/// layers. Triangular sectors additionally clear the two corner wedges
/// adjacent to icosahedral singular vertices (southeast and north in
/// sector-local terms), where the directional-neighbor topology is
/// irregular. Purely positional — existence is reconciled at association.
fn mark_stenciled_area(topo: &mut SectorTopology) {
    let layout = *topo.layout();
    let cells = layout.marked_cell_range();
    for r in cells.clone() {
        for c in cells.clone() {
            for k in 0..layout.shape().faces_per_cell() {
                topo.set_face_stencil(layout.cell_face(r, c, k), true);
            }
        }
    }

    if layout.shape() == FaceShape::Triangle {
        let (lo, hi) = (layout.wghost() - 1, layout.total() - layout.wghost());
        let rows = [hi - 1, hi];
        for corner_cols in [[lo, lo + 1], [hi - 1, hi]] {
            for &r in &rows {
                for &c in &corner_cols {
                    for k in 0..layout.shape().faces_per_cell() {
                        topo.set_face_stencil(layout.cell_face(r, c, k), false);
                    }
                }
            }
        }
    }
}
