use crate::error::{EstimationError, EstimationResult};
use log::debug;
use nalgebra::{Matrix2, Vector2};

/// `x ↦ scale·x + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineMap {
    pub scale: f64,
    pub offset: f64,
}

impl AffineMap {
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        self.scale * x + self.offset
    }
}

/// Maps the rank-first slice to `0` and the rank-last slice to `n − 1`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalRegularizer;

impl GlobalRegularizer {
    /// Solve for the affine map from the extremes of `permutation`.
    pub fn fit(&self, coordinates: &[f64], permutation: &[usize]) -> EstimationResult<AffineMap> {
        let (Some(&first), Some(&last)) = (permutation.first(), permutation.last()) else {
            return Err(EstimationError::DegenerateRegularization {
                low: f64::NAN,
                high: f64::NAN,
            });
        };
        let low = coordinates[first];
        let high = coordinates[last];
        let degenerate = EstimationError::DegenerateRegularization { low, high };
        if !(low.is_finite() && high.is_finite()) || low == high {
            return Err(degenerate);
        }

        let target = (permutation.len() - 1) as f64;
        let system = Matrix2::new(low, 1.0, high, 1.0);
        let solution = system
            .lu()
            .solve(&Vector2::new(0.0, target))
            .ok_or_else(|| degenerate.clone())?;
        let map = AffineMap {
            scale: solution[0],
            offset: solution[1],
        };
        if !(map.scale.is_finite() && map.offset.is_finite()) {
            return Err(degenerate);
        }
        Ok(map)
    }

    /// Fit and apply the map to every coordinate. Coordinates are untouched
    /// on failure.
    pub fn regularize(
        &self,
        coordinates: &mut [f64],
        permutation: &[usize],
    ) -> EstimationResult<AffineMap> {
        let map = self.fit(coordinates, permutation)?;
        for x in coordinates.iter_mut() {
            *x = map.apply(*x);
        }
        debug!(
            "GlobalRegularizer: scale={:.6} offset={:.6}",
            map.scale, map.offset
        );
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretches_extremes_onto_rank_range() {
        let mut coords = vec![0.0, 5.0, 10.0];
        let map = GlobalRegularizer
            .regularize(&mut coords, &[0, 1, 2])
            .unwrap();
        assert!((map.scale - 0.2).abs() < 1e-12);
        for (x, e) in coords.iter().zip([0.0, 1.0, 2.0]) {
            assert!((x - e).abs() < 1e-12);
        }
    }

    #[test]
    fn anchors_follow_permutation_not_index() {
        let mut coords = vec![3.0, 1.0, 2.0];
        GlobalRegularizer
            .regularize(&mut coords, &[1, 2, 0])
            .unwrap();
        for (x, e) in coords.iter().zip([2.0, 0.0, 1.0]) {
            assert!((x - e).abs() < 1e-12);
        }
    }

    #[test]
    fn coincident_anchors_are_degenerate() {
        let mut coords = vec![1.0, 1.0, 1.0];
        let err = GlobalRegularizer
            .regularize(&mut coords, &[0, 1, 2])
            .unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(coords, vec![1.0, 1.0, 1.0]);
    }
}
