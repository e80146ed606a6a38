use glam::DVec3;

use crate::mesh::sector::SectorLayout;

/// Unit-sphere vertex coordinates for a rectangular patch, in lattice order.
///
/// Rows of the sector map to longitude and columns to latitude; the patch
/// must stay away from the poles so no face degenerates. Intended for tests
/// and benchmarks — production blocks receive their coordinates from the
/// enclosing grid structure.
pub fn spherical_patch(
    layout: &SectorLayout,
    lon: (f64, f64),
    lat: (f64, f64),
) -> Vec<DVec3> {
    let n = layout.total();
    let mut verts = Vec::with_capacity(layout.n_verts());
    for r in 0..=n {
        let lam = lon.0 + (lon.1 - lon.0) * r as f64 / n as f64;
        for c in 0..=n {
            let phi = lat.0 + (lat.1 - lat.0) * c as f64 / n as f64;
            verts.push(DVec3::new(
                phi.cos() * lam.cos(),
                phi.cos() * lam.sin(),
                phi.sin(),
            ));
        }
    }
    verts
}
