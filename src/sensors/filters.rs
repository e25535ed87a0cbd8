//! Signal-conditioning filters for the water-level and EC channels (§3, §4.D).

const WATER_RING_LEN: usize = 3;
const EC_ALPHA: f32 = 0.2;

/// Fixed 3-slot ring average. Reports the latest sample directly until the
/// ring is full, then the arithmetic mean of the most recent three.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterRingFilter {
    ring: [f32; WATER_RING_LEN],
    head: usize,
    count: usize,
}

impl WaterRingFilter {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn push(&mut self, sample: f32) -> f32 {
        self.ring[self.head] = sample;
        self.head = (self.head + 1) % WATER_RING_LEN;
        if self.count < WATER_RING_LEN {
            self.count += 1;
        }
        if self.count < WATER_RING_LEN {
            sample
        } else {
            self.ring.iter().sum::<f32>() / WATER_RING_LEN as f32
        }
    }
}

/// One-pole exponential moving average, seeded with the first sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcEmaFilter {
    value: f32,
    initialized: bool,
}

impl EcEmaFilter {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn push(&mut self, sample: f32) -> f32 {
        self.value = if self.initialized {
            EC_ALPHA * sample + (1.0 - EC_ALPHA) * self.value
        } else {
            self.initialized = true;
            sample
        };
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_ring_reports_latest_until_full_then_means_last_three() {
        let mut f = WaterRingFilter::default();
        assert!((f.push(10.0) - 10.0).abs() < f32::EPSILON);
        assert!((f.push(20.0) - 20.0).abs() < f32::EPSILON);
        assert!((f.push(30.0) - 20.0).abs() < f32::EPSILON); // (10+20+30)/3
        assert!((f.push(40.0) - 30.0).abs() < f32::EPSILON); // (20+30+40)/3
    }

    #[test]
    fn ec_ema_seeds_on_first_sample() {
        let mut f = EcEmaFilter::default();
        assert!((f.push(800.0) - 800.0).abs() < f32::EPSILON);
        let out = f.push(900.0);
        assert!((out - (0.2 * 900.0 + 0.8 * 800.0)).abs() < 1e-6);
    }

    #[test]
    fn ec_ema_matches_recurrence_over_several_samples() {
        let mut f = EcEmaFilter::default();
        let samples = [800.0f32, 600.0, 1200.0, 400.0];
        let mut expected = samples[0];
        assert!((f.push(samples[0]) - expected).abs() < f32::EPSILON);
        for &s in &samples[1..] {
            expected = 0.2 * s + 0.8 * expected;
            assert!((f.push(s) - expected).abs() < 1e-5);
        }
    }
}
