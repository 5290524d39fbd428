//! Segmentation of a sampled depth profile into constant-depth runs.

use super::models::{Sample, Segment};

/// Segmentation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentOptions {
    /// Depths are rounded to the nearest multiple of this many meters
    pub round_depth_m: f64,
    /// Runs shorter than this are dropped
    pub min_segment_sec: f64,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            round_depth_m: 1.0,
            min_segment_sec: 30.0,
        }
    }
}

fn round_to(depth_m: f64, step: f64) -> f64 {
    (depth_m / step).round() * step
}

/// Split samples into runs of equal rounded depth.
///
/// Samples are ordered by time first. A run ends at the last sample before the
/// depth changes, and the next run starts at that same instant, so adjacent
/// segments share a boundary. Runs shorter than `min_segment_sec` are dropped,
/// and so are runs with no duration at all. Each segment carries the gas of its last sample.
pub fn derive_segments(samples: &[Sample], options: SegmentOptions) -> Vec<Segment> {
    if samples.len() < 2 {
        return Vec::new();
    }

    let mut sorted: Vec<&Sample> = samples.iter().collect();
    sorted.sort_by(|a, b| a.t_sec.total_cmp(&b.t_sec));

    let step = if options.round_depth_m > 0.0 {
        options.round_depth_m
    } else {
        1.0
    };

    let mut segments = Vec::new();
    let mut current = Segment {
        depth_m: round_to(sorted[0].depth_m, step),
        start_sec: sorted[0].t_sec,
        end_sec: sorted[0].t_sec,
        gas: sorted[0].gas.clone(),
    };

    let mut flush = |segment: &Segment| {
        let duration = segment.duration_sec();
        if duration > 0.0 && duration >= options.min_segment_sec {
            segments.push(segment.clone());
        }
    };

    for pair in sorted.windows(2) {
        let (prev, sample) = (pair[0], pair[1]);
        let depth_m = round_to(sample.depth_m, step);

        if depth_m != current.depth_m {
            flush(&current);
            current.depth_m = depth_m;
            current.start_sec = prev.t_sec;
        }

        current.end_sec = sample.t_sec;
        if !sample.gas.is_empty() {
            current.gas.clone_from(&sample.gas);
        }
    }
    flush(&current);

    segments
}
