use std::collections::HashMap;

use crate::mesh::flags::ElementFlags;
use crate::mesh::sector::{FaceShape, SectorLayout, NO_FACE};

/// Connectivity container for one sector: per-face vertex, neighbor and edge
/// lists, per-edge vertex pairs, and the element flag masks.
///
/// Everything here is structural and is derived from the
/// [`SectorLayout`] alone; geometry (vertex coordinates) is supplied later,
/// when the owning block is associated with a mesh.
///
/// Neighbor `d` of a face always lies across the edge between the face's
/// local vertices `d` and `d+1`, which is the ordering the directional
/// stencil construction relies on.
pub struct SectorTopology {
    layout: SectorLayout,
    face_verts: Vec<[usize; 4]>,
    face_neighbors: Vec<[usize; 4]>,
    face_edges: Vec<[usize; 4]>,
    edge_verts: Vec<[usize; 2]>,
    face_flags: Vec<ElementFlags>,
    edge_flags: Vec<ElementFlags>,
}

impl SectorTopology {
    pub fn new(layout: SectorLayout) -> Self {
        let vpf = layout.shape().verts_per_face();
        let n_faces = layout.n_faces();

        let mut face_verts = vec![[NO_FACE; 4]; n_faces];
        let mut face_neighbors = vec![[NO_FACE; 4]; n_faces];
        let mut face_edges = vec![[NO_FACE; 4]; n_faces];
        let mut face_flags = Vec::with_capacity(n_faces);

        for face in 0..n_faces {
            let (r, c, k) = layout.face_cell(face);
            face_verts[face] = local_verts(&layout, r, c, k);
            face_neighbors[face] = local_neighbors(&layout, r, c, k);
            face_flags.push(ElementFlags::present(layout.cell_is_interior(r, c)));
        }

        // Enumerate edges in face order so edge ids are deterministic.
        let mut edge_ids: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edge_verts = Vec::new();
        for face in 0..n_faces {
            for d in 0..vpf {
                let a = face_verts[face][d];
                let b = face_verts[face][(d + 1) % vpf];
                let key = (a.min(b), a.max(b));
                let id = *edge_ids.entry(key).or_insert_with(|| {
                    edge_verts.push([key.0, key.1]);
                    edge_verts.len() - 1
                });
                face_edges[face][d] = id;
            }
        }
        let edge_flags = vec![ElementFlags::present(false); edge_verts.len()];

        Self {
            layout,
            face_verts,
            face_neighbors,
            face_edges,
            edge_verts,
            face_flags,
            edge_flags,
        }
    }

    #[inline]
    pub fn layout(&self) -> &SectorLayout {
        &self.layout
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.face_flags.len()
    }

    #[inline]
    pub fn n_edges(&self) -> usize {
        self.edge_flags.len()
    }

    #[inline]
    pub fn face_verts(&self, face: usize) -> &[usize] {
        &self.face_verts[face][..self.layout.shape().verts_per_face()]
    }

    #[inline]
    pub fn face_neighbors(&self, face: usize) -> &[usize] {
        &self.face_neighbors[face][..self.layout.shape().verts_per_face()]
    }

    #[inline]
    pub fn face_edges(&self, face: usize) -> &[usize] {
        &self.face_edges[face][..self.layout.shape().verts_per_face()]
    }

    #[inline]
    pub fn edge_verts(&self, edge: usize) -> [usize; 2] {
        self.edge_verts[edge]
    }

    #[inline]
    pub fn face_flags(&self, face: usize) -> ElementFlags {
        self.face_flags[face]
    }

    #[inline]
    pub fn edge_flags(&self, edge: usize) -> ElementFlags {
        self.edge_flags[edge]
    }

    pub(crate) fn set_face_stencil(&mut self, face: usize, on: bool) {
        self.face_flags[face].stencil = on;
    }

    /// Apply singular-corner flags: the ghost-cell block at a flagged corner
    /// has no regular image in this sector and is marked non-existent. Edge
    /// existence is then rebuilt from the surviving faces.
    pub(crate) fn apply_corners(&mut self, corners: &[bool; 4]) {
        for (k, &singular) in corners.iter().enumerate() {
            if !singular {
                continue;
            }
            let (rows, cols) = self.layout.corner_cells(k);
            for r in rows {
                for c in cols.clone() {
                    for kf in 0..self.layout.shape().faces_per_cell() {
                        let f = self.layout.cell_face(r, c, kf);
                        self.face_flags[f] = ElementFlags::absent();
                    }
                }
            }
        }

        for flags in &mut self.edge_flags {
            flags.exists = false;
        }
        for face in 0..self.n_faces() {
            if !self.face_flags[face].exists {
                continue;
            }
            for d in 0..self.layout.shape().verts_per_face() {
                self.edge_flags[self.face_edges[face][d]].exists = true;
            }
        }
    }

    /// Restore `has_stencil ⇒ exists` after existence changed.
    pub(crate) fn reconcile_stencils(&mut self) {
        for flags in &mut self.face_flags {
            if !flags.exists {
                flags.stencil = false;
            }
        }
    }
}

fn neighbor_or_none(
    layout: &SectorLayout,
    r: isize,
    c: isize,
    k: usize,
) -> usize {
    let total = layout.total() as isize;
    if r < 0 || c < 0 || r >= total || c >= total {
        NO_FACE
    } else {
        layout.cell_face(r as usize, c as usize, k)
    }
}

fn local_verts(layout: &SectorLayout, r: usize, c: usize, k: usize) -> [usize; 4] {
    let v = |r, c| layout.vert_id(r, c);
    match (layout.shape(), k) {
        (FaceShape::Quad, _) => [v(r, c), v(r + 1, c), v(r + 1, c + 1), v(r, c + 1)],
        // Up triangle: base cell diagonal runs (r, c) – (r+1, c+1).
        (FaceShape::Triangle, 0) => [v(r, c), v(r + 1, c), v(r + 1, c + 1), NO_FACE],
        (FaceShape::Triangle, _) => [v(r, c), v(r + 1, c + 1), v(r, c + 1), NO_FACE],
    }
}

fn local_neighbors(layout: &SectorLayout, r: usize, c: usize, k: usize) -> [usize; 4] {
    let (ri, ci) = (r as isize, c as isize);
    let nb = |r, c, k| neighbor_or_none(layout, r, c, k);
    match (layout.shape(), k) {
        (FaceShape::Quad, _) => [
            nb(ri, ci - 1, 0),
            nb(ri + 1, ci, 0),
            nb(ri, ci + 1, 0),
            nb(ri - 1, ci, 0),
        ],
        (FaceShape::Triangle, 0) => [
            nb(ri, ci - 1, 1),
            nb(ri + 1, ci, 1),
            nb(ri, ci, 1),
            NO_FACE,
        ],
        (FaceShape::Triangle, _) => [
            nb(ri, ci, 0),
            nb(ri, ci + 1, 0),
            nb(ri - 1, ci, 0),
            NO_FACE,
        ],
    }
}
