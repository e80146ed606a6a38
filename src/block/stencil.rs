use crate::block::SetupError;
use crate::mesh::sector::NO_FACE;
use crate::mesh::topology::SectorTopology;

/// Rank sentinel for faces without stencils.
const NO_RANK: usize = usize::MAX;

/// One stencil zone: a neighboring face sampled at a radial shell offset
/// relative to the principal face (-1 inward, 0 same shell, +1 outward).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Zone {
    pub face: usize,
    pub shell: i8,
}

/// Zone lists for every stencil of every stenciled face.
///
/// Slot 0 is the central stencil (`vpf` immediate neighbors at shell 0, then
/// the principal face at shells -1 and +1). Slots `1..=vpf` are the inward
/// directional stencils, slots `vpf+1..=2·vpf` their outward mirrors, which
/// differ only in the shell of the last zone.
///
/// All zone lists live in one flat arena addressed through a dense rank
/// assigned to stenciled faces, so the table is a single allocation and is
/// dropped wholesale when the block is re-dimensioned.
pub struct StencilTable {
    zone_counts: Vec<usize>,
    slot_offsets: Vec<usize>,
    record_len: usize,
    rank: Vec<usize>,
    ranked_faces: Vec<usize>,
    zones: Vec<Zone>,
}

impl StencilTable {
    /// Build every stencil's zone list from the sector connectivity.
    ///
    /// Fails with [`SetupError::TopologyInconsistency`] if a stenciled face
    /// reaches a neighbor that is outside the sector, does not exist, or
    /// does not list the principal face back — all signs of a structurally
    /// broken mesh, not recoverable conditions.
    pub fn build(topo: &SectorTopology) -> Result<Self, SetupError> {
        let vpf = topo.layout().shape().verts_per_face();
        let n_stencils = 2 * vpf + 1;

        let mut zone_counts = vec![4; n_stencils];
        zone_counts[0] = vpf + 2;
        let mut slot_offsets = Vec::with_capacity(n_stencils);
        let mut record_len = 0;
        for &count in &zone_counts {
            slot_offsets.push(record_len);
            record_len += count;
        }

        let mut rank = vec![NO_RANK; topo.n_faces()];
        let mut ranked_faces = Vec::new();
        for face in 0..topo.n_faces() {
            if topo.face_flags(face).has_stencil() {
                rank[face] = ranked_faces.len();
                ranked_faces.push(face);
            }
        }

        let mut zones = Vec::with_capacity(ranked_faces.len() * record_len);
        for &pface in &ranked_faces {
            let neighbors = topo.face_neighbors(pface);

            // Central stencil: immediate neighbors in-shell, then the
            // principal face one shell in and one shell out.
            for d in 0..vpf {
                zones.push(Zone {
                    face: checked_zone_face(topo, pface, neighbors[d])?,
                    shell: 0,
                });
            }
            zones.push(Zone { face: pface, shell: -1 });
            zones.push(Zone { face: pface, shell: 1 });

            // Directional stencils: the cross-edge neighbor, its two side
            // neighbors around the principal face, and the cross-edge
            // neighbor again in the adjacent shell. The inward and outward
            // copies share everything but the last zone's shell.
            let mut footprints = Vec::with_capacity(vpf);
            for d in 0..vpf {
                let nface = neighbors[d];
                let ic = topo
                    .face_neighbors(nface)
                    .iter()
                    .position(|&f| f == pface)
                    .ok_or(SetupError::TopologyInconsistency {
                        face: pface,
                        reason: "principal face absent from its neighbor's neighbor list",
                    })?;
                let side_a =
                    checked_zone_face(topo, pface, topo.face_neighbors(nface)[(ic + 1) % vpf])?;
                let side_b = checked_zone_face(
                    topo,
                    pface,
                    topo.face_neighbors(nface)[(ic + vpf - 1) % vpf],
                )?;
                footprints.push((nface, side_a, side_b));
            }
            for shell in [-1i8, 1] {
                for &(nface, side_a, side_b) in &footprints {
                    zones.push(Zone { face: nface, shell: 0 });
                    zones.push(Zone { face: side_a, shell: 0 });
                    zones.push(Zone { face: side_b, shell: 0 });
                    zones.push(Zone { face: nface, shell });
                }
            }
        }

        Ok(Self {
            zone_counts,
            slot_offsets,
            record_len,
            rank,
            ranked_faces,
            zones,
        })
    }

    /// Number of stencil slots per stenciled face (`2·vpf + 1`).
    #[inline]
    pub fn n_stencils(&self) -> usize {
        self.zone_counts.len()
    }

    /// Zones in stencil `slot` (same for every principal face).
    #[inline]
    pub fn zone_count(&self, slot: usize) -> usize {
        self.zone_counts[slot]
    }

    /// Dense rank of a stenciled face, `None` if the face has no stencil.
    #[inline]
    pub fn rank(&self, face: usize) -> Option<usize> {
        match self.rank[face] {
            NO_RANK => None,
            r => Some(r),
        }
    }

    /// Stenciled faces in rank order.
    #[inline]
    pub fn ranked_faces(&self) -> &[usize] {
        &self.ranked_faces
    }

    /// Zone list of stencil `slot` for `face`, if the face is stenciled.
    pub fn zones(&self, face: usize, slot: usize) -> Option<&[Zone]> {
        let rank = self.rank(face)?;
        let start = rank * self.record_len + self.slot_offsets[slot];
        Some(&self.zones[start..start + self.zone_counts[slot]])
    }
}

fn checked_zone_face(
    topo: &SectorTopology,
    pface: usize,
    face: usize,
) -> Result<usize, SetupError> {
    if face == NO_FACE {
        return Err(SetupError::TopologyInconsistency {
            face: pface,
            reason: "stencil zone lies outside the sector index space",
        });
    }
    if !topo.face_flags(face).exists {
        return Err(SetupError::TopologyInconsistency {
            face: pface,
            reason: "stencil zone references a non-existent face",
        });
    }
    Ok(face)
}
