//! Seawater gas physics.
//!
//! Uses the 10 m per atmosphere approximation throughout.

/// Ambient pressure in ATA at `depth_m`.
pub fn ata_at_depth(depth_m: f64) -> f64 {
    depth_m / 10.0 + 1.0
}

/// Partial pressure of oxygen in ATA for an oxygen fraction at depth.
pub fn ppo2_at_depth(fo2: f64, depth_m: f64) -> f64 {
    fo2 * ata_at_depth(depth_m)
}

/// Maximum operating depth in meters for an oxygen fraction at a PPO2 ceiling.
pub fn mod_for_fo2(fo2: f64, ppo2_limit: f64) -> f64 {
    (ppo2_limit / fo2 - 1.0) * 10.0
}
