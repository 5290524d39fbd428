//! Gas consumption estimates from surface air consumption rates.

use super::models::{GasTable, ScheduleRow};
use super::physics::ata_at_depth;

/// Litres of gas used breathing `minutes` at `depth_m` with a surface rate of `sac_l_min`.
pub fn litres_used(sac_l_min: f64, depth_m: f64, minutes: f64) -> f64 {
    sac_l_min * ata_at_depth(depth_m) * minutes
}

/// Gas consumed over a whole schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct GasUsage {
    /// Minutes before the first stop, as given by the schedule (may be non-positive)
    pub working_time_min: i64,
    /// Litres by gas label, working gas first
    pub litres_by_gas: GasTable,
}

/// Estimate gas usage for a sorted schedule.
///
/// Everything before the first stop is charged at `max_depth_m` on the first
/// stop's gas with the working rate; every stop is charged at its own depth
/// with the deco rate. A non-positive working time is charged as zero minutes.
pub fn estimate_gas_usage(
    schedule: &[ScheduleRow],
    max_depth_m: f64,
    working_sac_l_min: f64,
    deco_sac_l_min: f64,
) -> GasUsage {
    let mut litres_by_gas = GasTable::new();

    let Some(first) = schedule.first() else {
        return GasUsage {
            working_time_min: 0,
            litres_by_gas,
        };
    };

    let working_time_min = i64::from(first.trt_min) - i64::from(first.stop_min);
    let working_minutes = working_time_min.max(0) as f64;
    litres_by_gas.add(
        &first.gas,
        litres_used(working_sac_l_min, max_depth_m, working_minutes),
    );

    for row in schedule {
        litres_by_gas.add(
            &row.gas,
            litres_used(deco_sac_l_min, row.depth_m, f64::from(row.stop_min)),
        );
    }

    GasUsage {
        working_time_min,
        litres_by_gas,
    }
}
