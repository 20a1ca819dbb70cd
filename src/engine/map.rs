use crate::models::{HealthMap, ProblemZone, MAP_SIZE};
use std::f64::consts::TAU;

/// Amplitude of the low-frequency oscillation overlay.
const OSCILLATION_AMPLITUDE: f64 = 0.06;
/// Amplitude of the per-cell hash-noise perturbation.
const NOISE_AMPLITUDE: f64 = 0.04;
/// Spatial frequencies of the oscillation, in cycles per field side.
const FREQ_X: f64 = 1.5;
const FREQ_Y: f64 = 1.1;

/// Synthesizes the spatial health map from the fused scalar.
///
/// Contains no RNG: all spatial variation is a pure function of cell
/// coordinates and the configured seed, so identical inputs always yield
/// identical maps.
pub struct MapSynthesizer {
    seed: u64,
    synthetic_zone_count: usize,
}

impl MapSynthesizer {
    pub fn new(seed: u64, synthetic_zone_count: usize) -> Self {
        Self {
            seed,
            synthetic_zone_count,
        }
    }

    /// Build the map: fused base value, oscillation + noise overlay, then
    /// Gaussian problem-zone depressions. Zones come from the stress model
    /// when available; otherwise a fixed count is synthesized from the seed.
    pub fn synthesize(&self, fused_score: f64, zones: &[ProblemZone]) -> HealthMap {
        let base = if fused_score.is_finite() {
            fused_score.clamp(0.0, 1.0)
        } else {
            0.5
        };

        let synthesized;
        let zones: &[ProblemZone] = if zones.is_empty() {
            synthesized = self.synthetic_zones();
            &synthesized
        } else {
            zones
        };

        let mut map = HealthMap::uniform(base);
        let n = MAP_SIZE as f64;
        let phase_x = unit_hash(self.seed, 0x51, 0) * TAU;
        let phase_y = unit_hash(self.seed, 0x52, 0) * TAU;

        for y in 0..MAP_SIZE {
            for x in 0..MAP_SIZE {
                let fx = x as f64 / n;
                let fy = y as f64 / n;

                let oscillation = OSCILLATION_AMPLITUDE
                    * (TAU * FREQ_X * fx + phase_x).sin()
                    * (TAU * FREQ_Y * fy + phase_y).cos();
                let noise = NOISE_AMPLITUDE * signed_hash(self.seed, x as u64, y as u64);

                let mut value = base + oscillation + noise;
                for zone in zones {
                    let dx = fx - zone.center_x;
                    let dy = fy - zone.center_y;
                    let dist_sq = dx * dx + dy * dy;
                    let falloff = (-dist_sq / (2.0 * zone.radius * zone.radius)).exp();
                    value -= zone.intensity * falloff;
                }

                map.set(x, y, value);
            }
        }

        map
    }

    /// Deterministic placeholder zones used when the stress model supplies
    /// none. Positions keep clear of the field edge.
    fn synthetic_zones(&self) -> Vec<ProblemZone> {
        (0..self.synthetic_zone_count)
            .map(|i| {
                let i = i as u64;
                ProblemZone {
                    center_x: 0.1 + 0.8 * unit_hash(self.seed, i, 1),
                    center_y: 0.1 + 0.8 * unit_hash(self.seed, i, 2),
                    radius: 0.06 + 0.08 * unit_hash(self.seed, i, 3),
                    intensity: 0.25 + 0.25 * unit_hash(self.seed, i, 4),
                    label: None,
                }
            })
            .collect()
    }
}

/// SplitMix64-style avalanche over (seed, x, y).
fn mix(seed: u64, x: u64, y: u64) -> u64 {
    let mut h = seed
        ^ x.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ y.wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

/// Hash mapped to [0, 1].
fn unit_hash(seed: u64, x: u64, y: u64) -> f64 {
    mix(seed, x, y) as f64 / u64::MAX as f64
}

/// Hash mapped to [-1, 1].
fn signed_hash(seed: u64, x: u64, y: u64) -> f64 {
    unit_hash(seed, x, y) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_is_deterministic_for_identical_inputs() {
        let synth = MapSynthesizer::new(42, 3);
        let a = synth.synthesize(0.7, &[]);
        let b = synth.synthesize(0.7, &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_give_different_maps() {
        let a = MapSynthesizer::new(1, 3).synthesize(0.7, &[]);
        let b = MapSynthesizer::new(2, 3).synthesize(0.7, &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn cells_stay_in_unit_interval() {
        for fused in [0.0, 0.05, 0.5, 0.95, 1.0] {
            let map = MapSynthesizer::new(7, 4).synthesize(fused, &[]);
            assert!(map.all_finite());
            assert!(map.min() >= 0.0);
            assert!(map.max() <= 1.0);
        }
    }

    #[test]
    fn non_finite_fused_score_falls_back_to_midrange() {
        let map = MapSynthesizer::new(7, 0).synthesize(f64::NAN, &[]);
        assert!(map.all_finite());
        assert!((map.mean() - 0.5).abs() < 0.1);
    }

    #[test]
    fn supplied_zone_depresses_its_neighborhood() {
        let zone = ProblemZone {
            center_x: 0.5,
            center_y: 0.5,
            radius: 0.1,
            intensity: 0.5,
            label: None,
        };
        let synth = MapSynthesizer::new(42, 0);
        let with_zone = synth.synthesize(0.8, &[zone]);
        let without = synth.synthesize(0.8, &[]);

        let mid = MAP_SIZE / 2;
        assert!(with_zone.get(mid, mid) < without.get(mid, mid) - 0.3);
        // far corner is essentially untouched
        assert!((with_zone.get(1, 1) - without.get(1, 1)).abs() < 0.05);
    }

    #[test]
    fn map_mean_tracks_fused_score() {
        let synth = MapSynthesizer::new(9, 0);
        let low = synth.synthesize(0.2, &[]);
        let high = synth.synthesize(0.9, &[]);
        assert!(high.mean() > low.mean() + 0.5);
    }
}
