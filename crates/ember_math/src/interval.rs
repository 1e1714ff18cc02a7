/// Range of ray parameters `[min, max]`, also used for box extents.
///
/// `min > max` means the range holds nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const EMPTY: Interval = Interval {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub const UNIVERSE: Interval = Interval {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// NaN bounds also count as empty.
    pub fn is_empty(&self) -> bool {
        !(self.min <= self.max)
    }

    /// Membership with both ends included.
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Membership with both ends excluded.
    pub fn surrounds(&self, x: f64) -> bool {
        self.min < x && x < self.max
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }

    /// Tighten the far end to `max`; a looser `max` leaves the range alone.
    ///
    /// Closest-hit searches call this after every hit.
    pub fn with_max(&self, max: f64) -> Interval {
        Interval::new(self.min, self.max.min(max))
    }

    /// Smallest range covering both `a` and `b`.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_includes_ends_surrounds_does_not() {
        let hit_range = Interval::new(1e-6, 4.0);

        for t in [1e-6, 4.0] {
            assert!(hit_range.contains(t));
            assert!(!hit_range.surrounds(t));
        }
        assert!(hit_range.contains(2.0) && hit_range.surrounds(2.0));
        assert!(!hit_range.contains(0.0));
        assert!(!hit_range.contains(4.5));
    }

    #[test]
    fn test_with_max_only_tightens() {
        let open = Interval::new(0.5, f64::INFINITY);
        let narrowed = open.with_max(3.0);
        assert_eq!(narrowed, Interval::new(0.5, 3.0));

        // A farther hit never widens the search again
        assert_eq!(narrowed.with_max(10.0), narrowed);
        assert_eq!(narrowed.size(), 2.5);
    }

    #[test]
    fn test_clamp_to_unit_range() {
        let unit = Interval::new(0.0, 1.0);
        assert_eq!(unit.clamp(1.7), 1.0);
        assert_eq!(unit.clamp(-0.2), 0.0);
        assert_eq!(unit.clamp(0.25), 0.25);
    }

    #[test]
    fn test_empty_and_universe() {
        assert!(Interval::EMPTY.is_empty());
        assert!(!Interval::EMPTY.contains(0.0));
        assert!(Interval::new(f64::NAN, 1.0).is_empty());

        assert!(!Interval::UNIVERSE.is_empty());
        assert!(Interval::UNIVERSE.contains(-1e300));
        assert_eq!(Interval::UNIVERSE.size(), f64::INFINITY);
    }

    #[test]
    fn test_surrounding_unions() {
        let slab = Interval::new(-2.0, 1.0);
        assert_eq!(Interval::surrounding(&Interval::EMPTY, &slab), slab);
        assert_eq!(
            Interval::surrounding(&slab, &Interval::new(3.0, 5.0)),
            Interval::new(-2.0, 5.0)
        );
    }
}
