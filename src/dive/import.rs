//! Dive log import: derive a stop schedule from a recorded depth profile.
//!
//! The log is scanned for dive records, the first record's samples are tagged
//! with the gas in use, and constant-depth runs become schedule rows.

use thiserror::Error;

use super::catalog::{Cylinder, GasCatalog};
use super::models::{GasChangeEvent, ImportMeta, ImportResponse, Sample, ScheduleRow};
use super::segments::{derive_segments, SegmentOptions};
use super::timeline::GasTimeline;
use super::tokens::{parse_depth_m, parse_duration_sec, parse_percent, percent_label};
use super::tree::Node;
use super::validator::sha256_hex;

const IMPORT_NOTE: &str = "Imported from Subsurface samples (not a planner stop table). \
With sparse samples, segments may be coarse. Gas set via gaschange events + PPO2 sanity.";

/// Gas assumed when the log declares no cylinder.
const DEFAULT_GAS: &str = "21";

/// Import errors. Each one aborts the import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No file uploaded")]
    NoUpload,
    #[error("Could not read dive log XML: {0}")]
    MalformedXml(#[from] roxmltree::Error),
    #[error("Could not find any dives in file.")]
    NoDives,
    #[error("Found dive but no <sample> data.")]
    NoSamples,
    #[error("Could not derive any segments from samples (file may be too sparse).")]
    NoSegments,
}

/// Import settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportOptions {
    pub segments: SegmentOptions,
    /// PPO2 ceiling used to pick a breathable gas for each derived stop
    pub ppo2_limit: f64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            segments: SegmentOptions::default(),
            ppo2_limit: 1.6,
        }
    }
}

fn text_field<'a>(node: &'a Node, keys: &[&str]) -> &'a str {
    node.field(keys).unwrap_or_default()
}

/// Gas switches among the log events, in log order.
fn parse_gas_changes(events: &[&Node]) -> Vec<GasChangeEvent> {
    events
        .iter()
        .filter(|e| text_field(e, &["name"]).eq_ignore_ascii_case("gaschange"))
        .filter_map(|e| {
            let o2_percent = e.field(&["o2", "O2", "oxygen"]).and_then(parse_percent)?;
            Some(GasChangeEvent {
                t_sec: parse_duration_sec(text_field(e, &["time"])),
                o2_percent,
            })
        })
        .collect()
}

fn parse_cylinder(node: &Node) -> Cylinder {
    Cylinder {
        o2_percent: node.field(&["o2"]).and_then(parse_percent),
        he_percent: node.field(&["he", "He", "helium"]).and_then(parse_percent),
    }
}

/// Max depth declared by a dive or dive computer record, if any.
fn declared_max_depth(node: &Node) -> Option<f64> {
    node.get("depth")
        .and_then(|d| d.field(&["max"]))
        .or_else(|| node.field(&["maxdepth", "maxDepth"]))
        .map(parse_depth_m)
        .filter(|d| *d > 0.0)
}

fn minutes(seconds: f64) -> u32 {
    (seconds / 60.0).round().max(1.0) as u32
}

/// Derive a stop schedule from a dive log XML document.
pub fn import_dive_log(xml: &str, options: &ImportOptions) -> Result<ImportResponse, ImportError> {
    let tree = Node::from_xml(xml)?;
    let dives = tree.find_records("dive");
    let dive = *dives.first().ok_or(ImportError::NoDives)?;

    let computer = dive.get("divecomputer").and_then(Node::first);

    let sample_nodes = computer
        .and_then(|dc| dc.get("sample"))
        .or_else(|| dive.get("sample"))
        .or_else(|| dive.get("samples").and_then(|s| s.get("sample")))
        .map(Node::items)
        .unwrap_or_default();
    if sample_nodes.is_empty() {
        return Err(ImportError::NoSamples);
    }

    let event_nodes = computer
        .and_then(|dc| dc.get("event"))
        .or_else(|| dive.get("event"))
        .map(Node::items)
        .unwrap_or_default();
    let changes = parse_gas_changes(&event_nodes);

    let cylinders: Vec<Cylinder> = dive
        .get("cylinder")
        .map(Node::items)
        .unwrap_or_default()
        .into_iter()
        .map(parse_cylinder)
        .collect();

    let default_gas = cylinders
        .first()
        .and_then(|c| c.o2_percent)
        .map(percent_label)
        .unwrap_or_else(|| DEFAULT_GAS.to_string());

    let catalog = GasCatalog::build(&default_gas, &cylinders, &changes);
    let timeline = GasTimeline::new(&changes, &default_gas);

    let mut samples: Vec<Sample> = sample_nodes
        .iter()
        .map(|node| {
            let t_sec = parse_duration_sec(text_field(node, &["time"]));
            Sample {
                t_sec,
                depth_m: parse_depth_m(text_field(node, &["depth"])),
                gas: timeline.gas_at(t_sec).to_string(),
            }
        })
        .collect();
    samples.sort_by(|a, b| a.t_sec.total_cmp(&b.t_sec));

    let segments = derive_segments(&samples, options.segments);
    if segments.is_empty() {
        return Err(ImportError::NoSegments);
    }

    let schedule: Vec<ScheduleRow> = segments
        .iter()
        .map(|seg| {
            let midpoint = ((seg.start_sec + seg.end_sec) / 2.0).round();
            let gas = timeline.breathable_gas_at(midpoint, seg.depth_m, options.ppo2_limit);
            ScheduleRow {
                depth_m: seg.depth_m.round(),
                stop_min: minutes(seg.duration_sec()),
                trt_min: minutes(seg.end_sec),
                gas: catalog.preferred_label(gas),
            }
        })
        .collect();

    let max_depth_m = declared_max_depth(dive)
        .or_else(|| computer.and_then(declared_max_depth))
        .unwrap_or_else(|| samples.iter().map(|s| s.depth_m).fold(0.0, f64::max));

    tracing::info!(
        dives = dives.len(),
        samples = samples.len(),
        segments = segments.len(),
        timeline_steps = timeline.entries().len(),
        "dive log imported"
    );

    Ok(ImportResponse {
        max_depth_m: max_depth_m.round() as i64,
        gases_carried: catalog.into_gases(),
        schedule,
        meta: ImportMeta {
            dives_found: dives.len(),
            samples_found: samples.len(),
            segments_derived: segments.len(),
            note: IMPORT_NOTE,
            source_hash: sha256_hex(xml),
        },
    })
}
