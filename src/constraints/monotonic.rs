use log::debug;

#[derive(Clone, Copy, Debug)]
pub struct MonotonicityEnforcer {
    pub minimum_thickness: f64,
}

impl MonotonicityEnforcer {
    pub fn new(minimum_thickness: f64) -> Self {
        Self { minimum_thickness }
    }

    /// Walk slices in `permutation` order and push each one forward until it
    /// sits at least `minimum_thickness` above its predecessor. Corrections
    /// cascade along the walk. Returns the number of slices moved.
    pub fn enforce(&self, coordinates: &mut [f64], permutation: &[usize]) -> usize {
        let Some((&first, rest)) = permutation.split_first() else {
            return 0;
        };
        let mut prev = coordinates[first];
        let mut moved = 0;
        for &slice in rest {
            let floor = prev + self.minimum_thickness;
            if coordinates[slice] < floor {
                coordinates[slice] = floor;
                moved += 1;
            }
            prev = coordinates[slice];
        }
        if moved > 0 {
            debug!(
                "MonotonicityEnforcer: moved {} slices to keep thickness >= {}",
                moved, self.minimum_thickness
            );
        }
        moved
    }
}
