use populace_data::BlockPos;

/// Point charge contributed by one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Charge {
    pub position: BlockPos,
    pub magnitude: f64,
}

impl Charge {
    /// Potential this charge induces at `pos`. Coincident positions yield
    /// positive infinity.
    #[inline]
    #[must_use]
    pub fn potential_at(&self, pos: BlockPos) -> f64 {
        let dist_sqr = self.position.dist_sqr(pos);
        if dist_sqr == 0.0 {
            f64::INFINITY
        } else {
            self.magnitude / dist_sqr.sqrt()
        }
    }
}

/// Sparse inverse-distance field of spawn pressure.
///
/// Queries scan every charge, so a pass costs O(charges) per candidate.
/// The field lives for one spawn pass: it is seeded from the live entities
/// and then grows as placements succeed, so later candidates in the same
/// pass see earlier ones.
#[derive(Debug, Clone, Default)]
pub struct PotentialField {
    charges: Vec<Charge>,
}

impl PotentialField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a charge. Zero magnitudes carry no pressure and are dropped.
    pub fn add_charge(&mut self, position: BlockPos, magnitude: f64) {
        if magnitude != 0.0 {
            self.charges.push(Charge {
                position,
                magnitude,
            });
        }
    }

    /// Energy change of placing a charge of `magnitude` at `pos`.
    #[must_use]
    pub fn potential_delta(&self, pos: BlockPos, magnitude: f64) -> f64 {
        let mut sum = 0.0;
        for charge in &self.charges {
            sum += charge.potential_at(pos);
        }
        sum * magnitude
    }

    #[must_use]
    pub fn charges(&self) -> &[Charge] {
        &self.charges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.charges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }
}
