use std::f64::consts::PI;

use nalgebra::{Cholesky, Matrix3};

use geofv::geometry::sphere;
use geofv::mesh::generator::spherical_patch;
use geofv::{FaceShape, LogRadialMap, StenciledBlock};

fn associated_block(shape: FaceShape, corners: [bool; 4]) -> StenciledBlock {
    let mut block = StenciledBlock::new(shape, 4, 2, 4, 2).expect("valid dimensions");
    let verts = spherical_patch(block.layout(), (-0.5, 0.5), (-0.4, 0.4));
    block
        .associate_mesh(0, 1.0, 2.0, &corners, &[false, false], &verts, &LogRadialMap)
        .expect("association succeeds");
    block
}

#[test]
fn absent_faces_have_zero_moments() {
    let block = associated_block(FaceShape::Triangle, [false, true, true, false]);
    let mut absent = 0;
    for face in 0..block.n_faces() {
        if block.face_flags(face).exists {
            assert!(block.face_area(face) > 0.0);
            assert!(block.face_centroid(face).length() > 0.5);
        } else {
            absent += 1;
            assert_eq!(block.face_area(face), 0.0);
            assert_eq!(block.face_centroid(face), glam::DVec3::ZERO);
        }
    }
    // Two singular corners, each a 2 × 2 ghost cell block of two triangles.
    assert_eq!(absent, 16);
}

#[test]
fn edge_lengths_are_geodesic_arcs() {
    let block = associated_block(FaceShape::Quad, [false; 4]);
    for edge in 0..block.n_edges() {
        let len = block.edge_length(edge);
        assert!(len > 0.0 && len < PI, "edge {edge} length {len}");

        let [a, b] = block.topology().edge_verts(edge);
        let direct = sphere::arc_length(block.vertex(a), block.vertex(b));
        assert!((len - direct).abs() < 1e-15);
    }
}

#[test]
fn dead_edges_have_zero_length() {
    let block = associated_block(FaceShape::Triangle, [false, true, true, false]);
    let mut dead = 0;
    for edge in 0..block.n_edges() {
        if block.topology().edge_flags(edge).exists {
            assert!(block.edge_length(edge) > 0.0);
        } else {
            dead += 1;
            assert_eq!(block.edge_length(edge), 0.0);
        }
    }
    assert!(dead > 0);
}

#[test]
fn triangle_areas_match_the_direct_formula() {
    let block = associated_block(FaceShape::Triangle, [false; 4]);
    for face in 0..block.n_faces() {
        let fv = block.topology().face_verts(face);
        let direct =
            sphere::triangle_area(block.vertex(fv[0]), block.vertex(fv[1]), block.vertex(fv[2]));
        assert!((block.face_area(face) - direct).abs() < 1e-14);
    }
}

#[test]
fn quad_centroids_are_area_weighted_and_inside_the_sphere() {
    let block = associated_block(FaceShape::Quad, [false; 4]);
    for face in 0..block.n_faces() {
        let cm = block.face_centroid(face);
        let r = cm.length();
        assert!(r > 0.9 && r < 1.0, "face {face} centroid radius {r}");
    }
}

#[test]
fn normal_matrices_are_symmetric_positive_definite() {
    for shape in [FaceShape::Triangle, FaceShape::Quad] {
        let block = associated_block(shape, [false; 4]);
        for face in 0..block.n_faces() {
            if !block.has_stencil(face) {
                continue;
            }
            for slot in 0..block.n_stencils() {
                let at = block.design_transpose(face, slot).unwrap();
                assert_eq!(at.nrows(), 3);
                assert_eq!(at.ncols(), block.zone_count(slot));

                let normal: Matrix3<f64> = at * at.transpose();
                let asym = (normal - normal.transpose()).norm();
                assert!(asym < 1e-14);
                assert!(
                    Cholesky::new(normal).is_some(),
                    "normal matrix not positive definite for face {face} slot {slot}"
                );
            }
        }
    }
}
