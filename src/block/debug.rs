//! Stencil introspection for debugging mesh setup. Not part of the
//! production contract; compiled only with the `debug` feature.

use glam::DVec3;

use crate::block::stenciled::StenciledBlock;

impl StenciledBlock {
    /// Dump a stencil's zone list to stderr.
    pub fn print_stencil(&self, face: usize, slot: usize) {
        eprintln!("stencil {slot} for principal face {face}");
        match self.stencil_zones(face, slot) {
            Some(zones) => {
                for zone in zones {
                    eprintln!("  face: {:>6}  shell: {:>2}", zone.face, zone.shell);
                }
            }
            None => eprintln!("  (no stencil)"),
        }
        eprintln!();
    }

    /// Line segments tracing every zone's face outline, with the zone's
    /// shell offset applied as a radial scale so adjacent shells render at
    /// distinct radii. Feed to any 3D line renderer.
    pub fn stencil_wireframe(&self, face: usize, slot: usize) -> Vec<[DVec3; 2]> {
        let Some(zones) = self.stencil_zones(face, slot) else {
            return Vec::new();
        };
        let vpf = self.shape().verts_per_face();
        let mut segments = Vec::with_capacity(zones.len() * vpf);
        for zone in zones {
            let scale = match zone.shell {
                -1 => 1.0 + self.shell_ratio(),
                1 => 1.0 / (1.0 + self.shell_ratio()),
                _ => 1.0,
            };
            let fv = self.topology().face_verts(zone.face);
            for d in 0..vpf {
                let a = self.vertex(fv[d]) * scale;
                let b = self.vertex(fv[(d + 1) % vpf]) * scale;
                segments.push([a, b]);
            }
        }
        segments
    }
}
