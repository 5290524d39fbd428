//! Oxygen exposure: pulmonary (OTU) and CNS toxicity accumulation.

/// NOAA CNS single-exposure limits: (PPO2 in ATA, allowed minutes).
static CNS_LIMITS: [(f64, f64); 12] = [
    (0.5, f64::INFINITY),
    (0.6, 720.0),
    (0.7, 570.0),
    (0.8, 450.0),
    (0.9, 360.0),
    (1.0, 300.0),
    (1.1, 240.0),
    (1.2, 210.0),
    (1.3, 180.0),
    (1.4, 150.0),
    (1.5, 120.0),
    (1.6, 45.0),
];

/// Allowed exposure at the top of the table.
const CNS_FLOOR_MIN: f64 = 45.0;

/// Oxygen toxicity units for `minutes` breathed at `ppo2`.
pub fn otu_for_segment(ppo2: f64, minutes: f64) -> f64 {
    if minutes <= 0.0 || ppo2 <= 0.5 {
        return 0.0;
    }
    minutes * ((ppo2 - 0.5) / 0.5).powf(0.83)
}

/// Allowed minutes at `ppo2`, linearly interpolated. Infinite at or below 0.5 ATA.
pub fn allowed_minutes_at_ppo2(ppo2: f64) -> f64 {
    if ppo2 <= 0.5 {
        return f64::INFINITY;
    }
    if ppo2 >= 1.6 {
        return CNS_FLOOR_MIN;
    }

    for pair in CNS_LIMITS.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if ppo2 >= lo.0 && ppo2 <= hi.0 {
            // No slope from an unbounded anchor; the upper value applies.
            if lo.1.is_infinite() {
                return hi.1;
            }
            let t = (ppo2 - lo.0) / (hi.0 - lo.0);
            return lo.1 + (hi.1 - lo.1) * t;
        }
    }
    CNS_FLOOR_MIN
}

/// CNS clock percentage for `minutes` breathed at `ppo2`.
pub fn cns_percent_for_segment(ppo2: f64, minutes: f64) -> f64 {
    if minutes <= 0.0 {
        return 0.0;
    }
    let allowed = allowed_minutes_at_ppo2(ppo2);
    if allowed.is_infinite() {
        return 0.0;
    }
    minutes / allowed * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otu_at_1_4() {
        let expected = 10.0 * (0.9f64 / 0.5).powf(0.83);
        assert!((otu_for_segment(1.4, 10.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_otu_zero_below_threshold() {
        assert_eq!(otu_for_segment(0.5, 60.0), 0.0);
        assert_eq!(otu_for_segment(0.3, 60.0), 0.0);
        assert_eq!(otu_for_segment(1.4, 0.0), 0.0);
    }

    #[test]
    fn test_allowed_minutes_anchors() {
        assert!(allowed_minutes_at_ppo2(0.5).is_infinite());
        assert!(allowed_minutes_at_ppo2(0.21).is_infinite());
        assert_eq!(allowed_minutes_at_ppo2(1.0), 300.0);
        assert_eq!(allowed_minutes_at_ppo2(1.6), 45.0);
        assert_eq!(allowed_minutes_at_ppo2(2.0), 45.0);
    }

    #[test]
    fn test_allowed_minutes_interpolates() {
        assert!((allowed_minutes_at_ppo2(1.25) - 195.0).abs() < 1e-9);
        assert!((allowed_minutes_at_ppo2(1.55) - 82.5).abs() < 1e-9);
    }

    #[test]
    fn test_allowed_minutes_above_unbounded_anchor() {
        assert_eq!(allowed_minutes_at_ppo2(0.55), 720.0);
    }

    #[test]
    fn test_cns_interpolated() {
        let cns = cns_percent_for_segment(1.25, 60.0);
        assert!((cns - 60.0 / 195.0 * 100.0).abs() < 1e-9);
        assert!((cns - 30.77).abs() < 0.01);
    }

    #[test]
    fn test_cns_zero_cases() {
        assert_eq!(cns_percent_for_segment(0.4, 60.0), 0.0);
        assert_eq!(cns_percent_for_segment(1.4, 0.0), 0.0);
    }

    #[test]
    fn test_cns_at_ceiling() {
        assert!((cns_percent_for_segment(1.6, 9.0) - 20.0).abs() < 1e-9);
    }
}
