//! Data types for dive log import and schedule validation.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One depth reading from a dive computer log.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Seconds since dive start
    pub t_sec: f64,
    /// Depth in meters
    pub depth_m: f64,
    /// Gas label in use at `t_sec`
    pub gas: String,
}

/// Gas switch recorded by the dive computer.
#[derive(Debug, Clone, PartialEq)]
pub struct GasChangeEvent {
    pub t_sec: f64,
    /// Oxygen percentage of the gas switched to
    pub o2_percent: f64,
}

/// Run of samples at one rounded depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub depth_m: f64,
    pub start_sec: f64,
    pub end_sec: f64,
    pub gas: String,
}

impl Segment {
    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }
}

/// One stop of a decompression schedule.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    /// Stop depth in meters
    pub depth_m: f64,
    /// Time at the stop in minutes
    #[serde(deserialize_with = "whole_minutes")]
    pub stop_min: u32,
    /// Total running time at the end of the stop in minutes
    #[serde(deserialize_with = "whole_minutes")]
    pub trt_min: u32,
    /// Gas breathed at the stop
    pub gas: String,
}

/// Minutes as a whole number; JSON like `5.0` is accepted, `5.5` is not.
fn whole_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(D::Error::custom(format!(
            "expected a whole number of minutes, got {value}"
        )));
    }
    Ok(value as u32)
}

/// PPO2 ceilings in atmospheres.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Ppo2Limits {
    pub working: f64,
    pub deco: f64,
}

/// Surface air consumption rates in litres per minute.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SacRates {
    pub working_l_min: f64,
    pub deco_l_min: f64,
}

/// Gradient factors in percent, passed through to the label.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct GradientFactors {
    pub low: f64,
    pub high: f64,
}

/// Request payload for schedule validation and label rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    pub max_depth_m: f64,
    pub gases_carried: Vec<String>,
    pub ppo2: Ppo2Limits,
    pub sac: SacRates,
    #[serde(default)]
    pub gradient_factors: Option<GradientFactors>,
    pub schedule: Vec<ScheduleRow>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validation findings, by severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Findings {
    /// Integrity violations
    pub errors: Vec<String>,
    /// Suspicious but non-fatal values
    pub warnings: Vec<String>,
    /// Assumptions made while computing
    pub info: Vec<String>,
}

impl Findings {
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn add_info(&mut self, message: impl Into<String>) {
        self.info.push(message.into());
    }

    /// Banner text for the label, if anything needs attention.
    pub fn banner(&self) -> Option<&'static str> {
        if !self.errors.is_empty() {
            Some("ERRORS PRESENT")
        } else if !self.warnings.is_empty() {
            Some("WARNINGS PRESENT")
        } else {
            None
        }
    }
}

/// Per-gas values kept in first-seen order; serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GasTable(Vec<(String, f64)>);

impl GasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for `gas`, keeping its original position if already present.
    pub fn set(&mut self, gas: &str, value: f64) {
        match self.0.iter_mut().find(|(g, _)| g == gas) {
            Some((_, v)) => *v = value,
            None => self.0.push((gas.to_string(), value)),
        }
    }

    /// Add `value` to the running total for `gas`.
    pub fn add(&mut self, gas: &str, value: f64) {
        match self.0.iter_mut().find(|(g, _)| g == gas) {
            Some((_, v)) => *v += value,
            None => self.0.push((gas.to_string(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(g, v)| (g.as_str(), *v))
    }
}

#[cfg(test)]
impl GasTable {
    pub fn get(&self, gas: &str) -> Option<f64> {
        self.0.iter().find(|(g, _)| g == gas).map(|(_, v)| *v)
    }

    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, v)| v).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for GasTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (gas, value) in &self.0 {
            map.serialize_entry(gas, value)?;
        }
        map.end()
    }
}

/// PPO2 breathed at one stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPpo2 {
    pub depth_m: f64,
    pub gas: String,
    pub ppo2: f64,
}

/// Values computed from a schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Computed {
    pub total_runtime_min: u32,
    pub otu_total: f64,
    pub cns_percent_total: f64,
    pub gas_used_litres_by_gas: GasTable,
    pub mod_by_gas_m: GasTable,
    pub ppo2_by_stop: Vec<StopPpo2>,
}

/// Response payload from schedule validation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
    pub checks: Findings,
    pub computed: Computed,
    pub label_text: String,
    /// SHA256 hash of the request body
    pub input_hash: String,
}

/// Import bookkeeping returned next to the derived schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportMeta {
    pub dives_found: usize,
    pub samples_found: usize,
    pub segments_derived: usize,
    pub note: &'static str,
    /// SHA256 hash of the uploaded file
    pub source_hash: String,
}

/// Response payload from a dive log import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub max_depth_m: i64,
    pub gases_carried: Vec<String>,
    pub schedule: Vec<ScheduleRow>,
    pub meta: ImportMeta,
}
