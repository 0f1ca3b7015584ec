/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fire and background share of the latest analyzed frame, in percent.
///
/// Only constructible through [`FireStats::from_area`], so the two values
/// always add up to 100 after rounding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireStats {
    fire: f64,
    background: f64,
}

impl Default for FireStats {
    fn default() -> Self {
        Self {
            fire: 0.0,
            background: 100.0,
        }
    }
}

impl FireStats {
    /// Derive both percentages from a reported fire area. Out-of-range and
    /// non-finite areas are clamped to `0..=100`.
    pub fn from_area(total_area: f64) -> Self {
        let area = if total_area.is_finite() {
            total_area.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let fire = round2(area);
        Self {
            fire,
            background: round2(100.0 - fire),
        }
    }

    pub fn fire(&self) -> f64 {
        self.fire
    }

    pub fn background(&self) -> f64 {
        self.background
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345678), 12.35);
        assert_eq!(round2(0.004), 0.0);
        assert_eq!(round2(99.999), 100.0);
    }

    #[test]
    fn test_clamps_out_of_range() {
        assert_eq!(FireStats::from_area(-3.0).fire(), 0.0);
        assert_eq!(FireStats::from_area(140.0).fire(), 100.0);
        assert_eq!(FireStats::from_area(140.0).background(), 0.0);
        assert_eq!(FireStats::from_area(f64::NAN), FireStats::default());
    }
}
