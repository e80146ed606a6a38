/// Sentinel for a neighbor reference that leaves the sector index space.
pub const NO_FACE: usize = usize::MAX;

/// Face arity of the mesh a block is cut from.
///
/// Triangular sectors are rhombi of a subdivided icosahedron, with every
/// logical cell split into an "up" and a "down" triangle; quadrilateral
/// sectors have one face per cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceShape {
    Triangle,
    Quad,
}

impl FaceShape {
    #[inline]
    pub fn verts_per_face(self) -> usize {
        match self {
            FaceShape::Triangle => 3,
            FaceShape::Quad => 4,
        }
    }

    /// Faces per logical cell: triangles tile each cell in pairs.
    #[inline]
    pub fn faces_per_cell(self) -> usize {
        match self {
            FaceShape::Triangle => 2,
            FaceShape::Quad => 1,
        }
    }
}

/// Pure index arithmetic for one block's angular sector.
///
/// The sector is a `total × total` grid of cells, `total = width + 2·wghost`,
/// addressed by (row, col). Vertices live on the `(total+1)²` lattice.
/// Nothing here depends on mesh geometry.
#[derive(Clone, Copy, Debug)]
pub struct SectorLayout {
    shape: FaceShape,
    width: usize,
    wghost: usize,
    total: usize,
}

impl SectorLayout {
    pub fn new(shape: FaceShape, width: usize, wghost: usize) -> Self {
        Self {
            shape,
            width,
            wghost,
            total: width + 2 * wghost,
        }
    }

    #[inline]
    pub fn shape(&self) -> FaceShape {
        self.shape
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn wghost(&self) -> usize {
        self.wghost
    }

    /// Cells per side, ghost layers included.
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.total * self.total
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.shape.faces_per_cell() * self.n_cells()
    }

    #[inline]
    pub fn n_verts(&self) -> usize {
        (self.total + 1) * (self.total + 1)
    }

    #[inline]
    pub fn vert_id(&self, r: usize, c: usize) -> usize {
        debug_assert!(r <= self.total && c <= self.total);
        r * (self.total + 1) + c
    }

    /// Face `k` of cell (r, c); `k` ranges over `faces_per_cell`. For
    /// triangles `k = 0` is the up triangle and `k = 1` the down triangle.
    #[inline]
    pub fn cell_face(&self, r: usize, c: usize, k: usize) -> usize {
        let fpc = self.shape.faces_per_cell();
        debug_assert!(r < self.total && c < self.total && k < fpc);
        (r * self.total + c) * fpc + k
    }

    /// Inverse of [`Self::cell_face`]: (row, col, face-in-cell).
    #[inline]
    pub fn face_cell(&self, face: usize) -> (usize, usize, usize) {
        let fpc = self.shape.faces_per_cell();
        let cell = face / fpc;
        (cell / self.total, cell % self.total, face % fpc)
    }

    /// Whether cell (r, c) lies in the block's true domain.
    #[inline]
    pub fn cell_is_interior(&self, r: usize, c: usize) -> bool {
        let lo = self.wghost;
        let hi = self.total - self.wghost;
        (lo..hi).contains(&r) && (lo..hi).contains(&c)
    }

    /// Cell range eligible for stencil marking: the interior plus one ring,
    /// since a stencil needs neighbor and neighbor-of-neighbor data.
    #[inline]
    pub fn marked_cell_range(&self) -> std::ops::RangeInclusive<usize> {
        self.wghost - 1..=self.total - self.wghost
    }

    /// Cell ranges (rows, cols) of the ghost block at sector corner `k`.
    /// Corners are numbered (lo,lo), (hi,lo), (hi,hi), (lo,hi) in
    /// (row, col) space.
    pub fn corner_cells(
        &self,
        k: usize,
    ) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let lo = 0..self.wghost;
        let hi = self.total - self.wghost..self.total;
        match k {
            0 => (lo.clone(), lo),
            1 => (hi, lo),
            2 => (hi.clone(), hi),
            3 => (lo, hi),
            _ => panic!("sector has four corners, got index {k}"),
        }
    }
}
