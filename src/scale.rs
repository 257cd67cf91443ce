/// Padding applied between bands and at both ends, as a fraction of the step.
pub const BAND_PADDING: f64 = 0.1;

/// Evenly spaced bands over `[0, width]`, one per index, centred in the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    count: usize,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new(count: usize, width: f64) -> Self {
        let n = count as f64;
        let step = width / (n - BAND_PADDING + 2.0 * BAND_PADDING).max(1.0);
        let start = (width - step * (n - BAND_PADDING)) * 0.5;
        Self {
            count,
            start,
            step,
            bandwidth: step * (1.0 - BAND_PADDING),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn x(&self, index: usize) -> f64 {
        self.start + self.step * index as f64
    }

    /// Index of the band whose step contains `x`, clamped to the domain.
    pub fn index_at(&self, x: f64) -> Option<usize> {
        if self.count == 0 || self.step <= 0.0 {
            return None;
        }
        let raw = ((x - self.start) / self.step).floor();
        if raw < 0.0 {
            return Some(0);
        }
        Some((raw as usize).min(self.count - 1))
    }
}

/// Linear map from `[0, domain_max]` onto `[range_zero, range_max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_max: f64,
    range_zero: f64,
    range_max: f64,
}

impl LinearScale {
    /// A zero maximum (no goals, or no matches) falls back to a unit domain.
    pub fn new(domain_max: u32, range_zero: f64, range_max: f64) -> Self {
        Self {
            domain_max: f64::from(domain_max.max(1)),
            range_zero,
            range_max,
        }
    }

    pub fn domain_max(&self) -> f64 {
        self.domain_max
    }

    pub fn apply(&self, value: f64) -> f64 {
        let t = value / self.domain_max;
        self.range_zero + (self.range_max - self.range_zero) * t
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        integer_ticks(self.domain_max, count)
    }
}

/// Nice 1/2/5 step for roughly `count` intervals over `[0, stop]`.
pub fn tick_step(stop: f64, count: usize) -> f64 {
    let raw = stop / count.max(1) as f64;
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let power = raw.log10().floor();
    let magnitude = 10f64.powf(power);
    let error = raw / magnitude;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * magnitude
}

/// Tick values from zero up to `stop`, never finer than one unit.
pub fn integer_ticks(stop: f64, count: usize) -> Vec<f64> {
    if !(stop.is_finite() && stop > 0.0) {
        return vec![0.0];
    }
    let step = tick_step(stop, count).max(1.0).round();
    let last = (stop / step).floor() as usize;
    (0..=last).map(|k| k as f64 * step).collect()
}

/// Opponent axis labels count down from the opponent maximum.
pub fn opponent_tick_label(domain_max: f64, value: f64) -> String {
    format!("{}", (domain_max - value).round() as i64)
}

pub fn selected_tick_label(value: f64) -> String {
    format!("{}", value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_band_is_centred() {
        let scale = BandScale::new(1, 110.0);
        assert!((scale.step() - 100.0).abs() < 1e-9);
        assert!((scale.x(0) - 10.0).abs() < 1e-9);
        assert!((scale.bandwidth() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn bands_fill_the_range_with_outer_padding() {
        let scale = BandScale::new(4, 82.0);
        // step = 82 / 4.1 = 20, start = (82 - 20 * 3.9) / 2 = 2
        assert!((scale.step() - 20.0).abs() < 1e-9);
        assert!((scale.x(0) - 2.0).abs() < 1e-9);
        assert!((scale.x(3) - 62.0).abs() < 1e-9);
        assert_eq!(scale.index_at(63.0), Some(3));
        assert_eq!(scale.index_at(500.0), Some(3));
        assert_eq!(scale.index_at(-3.0), Some(0));
    }

    #[test]
    fn zero_domain_clamps_to_unit() {
        let scale = LinearScale::new(0, 10.0, 0.0);
        assert_eq!(scale.domain_max(), 1.0);
        assert_eq!(scale.apply(0.0), 10.0);
        assert_eq!(scale.apply(1.0), 0.0);
    }

    #[test]
    fn ticks_use_nice_integer_steps() {
        assert_eq!(integer_ticks(10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(integer_ticks(3.0, 10), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(integer_ticks(31.0, 3), vec![0.0, 10.0, 20.0, 30.0]);
    }
}
