use glam::DVec3;
use nalgebra::linalg::LU;
use nalgebra::{DVector, Matrix3, Matrix3xX, Vector3, U3};
use rayon::prelude::*;

use crate::block::stencil::{StencilTable, Zone};
use crate::block::SetupError;

/// Cached least-squares geometry for one (face, stencil) pair: the design
/// matrix transpose Aᵗ (3 × zone_count) and the LU factorization of the
/// normal matrix AᵗA.
///
/// Row `r` of A is the displacement between the radially rescaled centroid
/// of zone `r` and the centroid of the principal face, so solving
/// `AᵗA x = Aᵗ b` against per-zone value differences `b` fits the three
/// gradient components of a local linear model.
#[derive(Debug)]
pub struct StencilMatrices {
    design_t: Matrix3xX<f64>,
    normal_lu: LU<f64, U3, U3>,
}

impl StencilMatrices {
    /// The cached design matrix transpose.
    #[inline]
    pub fn design_transpose(&self) -> &Matrix3xX<f64> {
        &self.design_t
    }

    /// The cached LU factorization of the normal matrix.
    #[inline]
    pub fn normal_factorization(&self) -> &LU<f64, U3, U3> {
        &self.normal_lu
    }

    /// Fit the linear model to per-zone value differences.
    pub fn solve(&self, deltas: &[f64]) -> Option<Vector3<f64>> {
        assert_eq!(deltas.len(), self.design_t.ncols());
        let rhs = &self.design_t * DVector::from_column_slice(deltas);
        self.normal_lu.solve(&rhs)
    }
}

/// Rescale factor pulling a zone's centroid to the principal face's shell.
#[inline]
fn shell_factor(shell: i8, delta: f64) -> f64 {
    match shell {
        -1 => 1.0 + delta,
        1 => 1.0 / (1.0 + delta),
        _ => 1.0,
    }
}

/// Assemble and factorize the geometry matrix for one stencil.
pub fn assemble_one(
    pface: usize,
    slot: usize,
    zones: &[Zone],
    centroids: &[DVec3],
    delta: f64,
) -> Result<StencilMatrices, SetupError> {
    let origin = centroids[pface];
    let columns: Vec<Vector3<f64>> = zones
        .iter()
        .map(|zone| {
            let d = shell_factor(zone.shell, delta) * centroids[zone.face] - origin;
            Vector3::new(d.x, d.y, d.z)
        })
        .collect();

    let design_t = Matrix3xX::from_columns(&columns);
    let normal: Matrix3<f64> = &design_t * design_t.transpose();
    if !normal.iter().all(|x| x.is_finite()) {
        return Err(SetupError::Factorization { face: pface, slot });
    }

    let normal_lu = normal.lu();
    if !normal_lu.is_invertible() {
        return Err(SetupError::Factorization { face: pface, slot });
    }
    Ok(StencilMatrices { design_t, normal_lu })
}

/// Assemble every (face, stencil) matrix, in rank-major slot order.
///
/// Faces are independent once the moments are final, so the outer loop runs
/// on the rayon pool; each worker writes only its own face's slots.
pub fn assemble_all(
    table: &StencilTable,
    centroids: &[DVec3],
    delta: f64,
) -> Result<Vec<StencilMatrices>, SetupError> {
    let per_face: Vec<Vec<StencilMatrices>> = table
        .ranked_faces()
        .par_iter()
        .map(|&pface| {
            (0..table.n_stencils())
                .map(|slot| {
                    let zones = table.zones(pface, slot).expect("ranked face has zones");
                    assemble_one(pface, slot, zones, centroids, delta)
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(per_face.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_factors_are_reciprocal() {
        let delta = 0.19;
        assert_eq!(shell_factor(0, delta), 1.0);
        let product = shell_factor(-1, delta) * shell_factor(1, delta);
        assert!((product - 1.0).abs() < 1e-15);
    }

    #[test]
    fn collinear_zone_centroids_fail_factorization() {
        // All displacements along one axis: AᵗA has rank 1.
        let centroids = vec![
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.1, 0.0, 0.0),
            DVec3::new(1.2, 0.0, 0.0),
            DVec3::new(1.3, 0.0, 0.0),
        ];
        let zones = [
            Zone { face: 1, shell: 0 },
            Zone { face: 2, shell: 0 },
            Zone { face: 3, shell: 0 },
        ];
        let err = assemble_one(0, 0, &zones, &centroids, 0.1).unwrap_err();
        assert!(matches!(
            err,
            SetupError::Factorization { face: 0, slot: 0 }
        ));
    }

    #[test]
    fn well_posed_stencil_recovers_a_linear_field() {
        let centroids = vec![
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(0.1, 0.0, 1.0),
            DVec3::new(0.0, 0.1, 1.0),
            DVec3::new(-0.1, -0.05, 1.0),
        ];
        let delta = 0.2;
        let zones = [
            Zone { face: 1, shell: 0 },
            Zone { face: 2, shell: 0 },
            Zone { face: 3, shell: 0 },
            Zone { face: 0, shell: -1 },
            Zone { face: 0, shell: 1 },
        ];
        let mats = assemble_one(0, 0, &zones, &centroids, delta).unwrap();

        let grad = DVec3::new(0.7, -1.3, 0.4);
        let deltas: Vec<f64> = zones
            .iter()
            .map(|z| grad.dot(shell_factor(z.shell, delta) * centroids[z.face] - centroids[0]))
            .collect();
        let fit = mats.solve(&deltas).unwrap();
        assert!((fit[0] - grad.x).abs() < 1e-12);
        assert!((fit[1] - grad.y).abs() < 1e-12);
        assert!((fit[2] - grad.z).abs() < 1e-12);
    }
}
