//! Schedule validation: integrity checks, oxygen exposure, gas usage and label.

use std::collections::HashSet;

use sha2::{Digest, Sha256};
use thiserror::Error;

use super::exposure::{cns_percent_for_segment, otu_for_segment};
use super::gas_usage::estimate_gas_usage;
use super::label::{build_label_text, LabelInput};
use super::models::{
    Computed, Findings, GasTable, LabelRequest, LabelResponse, ScheduleRow, StopPpo2,
};
use super::physics::{mod_for_fo2, ppo2_at_depth};
use super::tokens::{normalize_gas, parse_fo2};

/// Slack allowed on PPO2 and MOD comparisons.
const LIMIT_TOLERANCE: f64 = 1e-9;

/// Compute SHA256 hash of input string.
pub fn sha256_hex(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let digest = hasher.finalize();
    format!("sha256:{}", hex::encode(digest))
}

/// Request-level errors: the request cannot be evaluated at all.
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("maxDepthM must be a positive number")]
    InvalidMaxDepth,
    #[error("gasesCarried must list at least one gas")]
    NoGases,
    #[error("gasesCarried entries must be non-empty")]
    EmptyGas,
    #[error("ppo2 working and deco limits must be positive")]
    InvalidPpo2,
    #[error("sac working and deco rates must be positive")]
    InvalidSac,
    #[error("gradient factors must be between 0 and 100")]
    InvalidGradientFactors,
    #[error("schedule must contain at least one row")]
    NoSchedule,
    #[error("schedule row {row}: {reason}")]
    InvalidRow { row: usize, reason: &'static str },
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Shape checks on a decoded request.
pub fn check_request(request: &LabelRequest) -> Result<(), RequestError> {
    if !positive(request.max_depth_m) {
        return Err(RequestError::InvalidMaxDepth);
    }
    if request.gases_carried.is_empty() {
        return Err(RequestError::NoGases);
    }
    if request.gases_carried.iter().any(|g| g.is_empty()) {
        return Err(RequestError::EmptyGas);
    }
    if !positive(request.ppo2.working) || !positive(request.ppo2.deco) {
        return Err(RequestError::InvalidPpo2);
    }
    if !positive(request.sac.working_l_min) || !positive(request.sac.deco_l_min) {
        return Err(RequestError::InvalidSac);
    }
    if let Some(gf) = request.gradient_factors {
        if !(0.0..=100.0).contains(&gf.low) || !(0.0..=100.0).contains(&gf.high) {
            return Err(RequestError::InvalidGradientFactors);
        }
    }
    if request.schedule.is_empty() {
        return Err(RequestError::NoSchedule);
    }

    for (idx, row) in request.schedule.iter().enumerate() {
        let row_num = idx + 1;
        if !row.depth_m.is_finite() || row.depth_m < 0.0 {
            return Err(RequestError::InvalidRow { row: row_num, reason: "depthM must be non-negative" });
        }
        if row.stop_min == 0 {
            return Err(RequestError::InvalidRow { row: row_num, reason: "stopMin must be positive" });
        }
        if row.trt_min == 0 {
            return Err(RequestError::InvalidRow { row: row_num, reason: "trtMin must be positive" });
        }
        if row.gas.is_empty() {
            return Err(RequestError::InvalidRow { row: row_num, reason: "gas must be non-empty" });
        }
    }

    Ok(())
}

/// Normalize gas labels and order rows deepest first, then by running time.
pub fn sort_schedule(rows: &[ScheduleRow]) -> Vec<ScheduleRow> {
    let mut schedule: Vec<ScheduleRow> = rows
        .iter()
        .map(|r| ScheduleRow {
            gas: normalize_gas(&r.gas),
            ..r.clone()
        })
        .collect();
    schedule.sort_by(|a, b| {
        b.depth_m
            .total_cmp(&a.depth_m)
            .then(a.trt_min.cmp(&b.trt_min))
    });
    schedule
}

/// Flag the first row whose running time does not increase.
fn check_runtime_order(schedule: &[ScheduleRow], findings: &mut Findings) {
    if let Some(idx) = (1..schedule.len()).find(|&i| schedule[i].trt_min <= schedule[i - 1].trt_min) {
        findings.add_error(format!("TRT must be strictly increasing (row {}).", idx + 1));
    }
}

/// Validate a schedule and compute its exposure, gas usage and label.
///
/// Integrity problems, unknown mixtures included, are reported as findings
/// and never stop the computation; only malformed requests are errors.
pub fn validate(request: &LabelRequest, input_json: &str) -> Result<LabelResponse, RequestError> {
    check_request(request)?;

    let deco_limit = request.ppo2.deco;
    let gases_carried: Vec<String> = request.gases_carried.iter().map(|g| normalize_gas(g)).collect();
    let carried: HashSet<&str> = gases_carried.iter().map(String::as_str).collect();

    let mut findings = Findings::default();

    let mut mod_by_gas_m = GasTable::new();
    for gas in &gases_carried {
        match parse_fo2(gas) {
            Some(fo2) => mod_by_gas_m.set(gas, mod_for_fo2(fo2, deco_limit)),
            None => findings.add_error(format!(
                "Carried gas \"{gas}\" is not a recognised mixture."
            )),
        }
    }

    let schedule = sort_schedule(&request.schedule);
    check_runtime_order(&schedule, &mut findings);

    for (idx, row) in schedule.iter().enumerate() {
        if !carried.contains(row.gas.as_str()) {
            findings.add_error(format!("Row {}: gas \"{}\" not in gasesCarried.", idx + 1, row.gas));
        }
    }

    let mut otu_total = 0.0;
    let mut cns_percent_total = 0.0;
    let mut ppo2_by_stop = Vec::with_capacity(schedule.len());

    for (idx, row) in schedule.iter().enumerate() {
        // Unknown mixtures still count toward gas usage below.
        let Some(fo2) = parse_fo2(&row.gas) else {
            findings.add_error(format!(
                "Row {}: gas \"{}\" is not a recognised mixture.",
                idx + 1,
                row.gas
            ));
            continue;
        };

        let ppo2 = ppo2_at_depth(fo2, row.depth_m);
        ppo2_by_stop.push(StopPpo2 {
            depth_m: row.depth_m,
            gas: row.gas.clone(),
            ppo2,
        });

        if ppo2 > deco_limit + LIMIT_TOLERANCE {
            findings.add_error(format!(
                "Row {}: PPO2 {:.2} exceeds deco limit {}.",
                idx + 1,
                ppo2,
                deco_limit
            ));
        }

        let max_depth = mod_for_fo2(fo2, deco_limit);
        if row.depth_m > max_depth + LIMIT_TOLERANCE {
            findings.add_error(format!(
                "Row {}: depth {}m deeper than MOD {:.1}m for gas {} at PPO2 {}.",
                idx + 1,
                row.depth_m,
                max_depth,
                row.gas,
                deco_limit
            ));
        }

        let minutes = f64::from(row.stop_min);
        otu_total += otu_for_segment(ppo2, minutes);
        cns_percent_total += cns_percent_for_segment(ppo2, minutes);
    }

    let usage = estimate_gas_usage(
        &schedule,
        request.max_depth_m,
        request.sac.working_l_min,
        request.sac.deco_l_min,
    );
    if usage.working_time_min <= 0 {
        findings.add_warning(format!(
            "Pre-first-stop working time computed as {} min (check TRT/Stop values).",
            usage.working_time_min
        ));
    }
    findings.add_info(format!(
        "Working gas assumes {} min at max depth ({}m).",
        usage.working_time_min, request.max_depth_m
    ));

    let total_runtime_min = schedule.last().map(|r| r.trt_min).unwrap_or_default();

    let label_text = build_label_text(&LabelInput {
        max_depth_m: request.max_depth_m,
        total_runtime_min,
        gases_carried: &gases_carried,
        mod_by_gas_m: &mod_by_gas_m,
        schedule: &schedule,
        gradient_factors: request.gradient_factors,
        otu_total,
        cns_percent_total,
        gas_used_litres_by_gas: &usage.litres_by_gas,
        notes: request.notes.as_deref(),
        banner: findings.banner(),
    });

    tracing::debug!(
        rows = schedule.len(),
        errors = findings.errors.len(),
        warnings = findings.warnings.len(),
        "schedule validated"
    );

    Ok(LabelResponse {
        checks: findings,
        computed: Computed {
            total_runtime_min,
            otu_total,
            cns_percent_total,
            gas_used_litres_by_gas: usage.litres_by_gas,
            mod_by_gas_m,
            ppo2_by_stop,
        },
        label_text,
        input_hash: sha256_hex(input_json),
    })
}
