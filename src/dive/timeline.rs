//! Reconstruction of which gas was breathed when, from gas-change events.

use super::models::GasChangeEvent;
use super::physics::ppo2_at_depth;
use super::tokens::{parse_fo2, percent_label};

/// One step of the gas timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub t_sec: f64,
    pub gas: String,
}

/// Stepwise mapping from elapsed time to the gas label in use.
///
/// The first entry is always the default gas at `t = 0`; entries are sorted by
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct GasTimeline {
    entries: Vec<TimelineEntry>,
}

impl GasTimeline {
    /// Build a timeline from gas-change events and the gas breathed at the start.
    ///
    /// Events with a negative time or an oxygen percentage outside (0, 100] are
    /// ignored. Events at the same time keep their recorded order.
    pub fn new(events: &[GasChangeEvent], default_gas: &str) -> Self {
        let mut changes: Vec<TimelineEntry> = events
            .iter()
            .filter(|e| e.t_sec >= 0.0 && e.o2_percent > 0.0 && e.o2_percent <= 100.0)
            .map(|e| TimelineEntry {
                t_sec: e.t_sec,
                gas: percent_label(e.o2_percent),
            })
            .collect();
        changes.sort_by(|a, b| a.t_sec.total_cmp(&b.t_sec));

        let mut entries = Vec::with_capacity(changes.len() + 1);
        entries.push(TimelineEntry {
            t_sec: 0.0,
            gas: default_gas.to_string(),
        });
        entries.extend(changes);
        Self { entries }
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Index of the latest entry at or before `t_sec` (ties go to the later entry).
    fn active_index(&self, t_sec: f64) -> usize {
        self.entries
            .iter()
            .rposition(|e| e.t_sec <= t_sec)
            .unwrap_or(0)
    }

    /// Gas label in use at `t_sec`.
    pub fn gas_at(&self, t_sec: f64) -> &str {
        &self.entries[self.active_index(t_sec)].gas
    }

    /// Gas in use at `t_sec` that is breathable at `depth_m`.
    ///
    /// Walks back from the active entry to the most recent gas whose PPO2 at
    /// `depth_m` stays within `ppo2_limit`, skipping labels that are not
    /// mixtures. Falls back to the first gas of the dive.
    pub fn breathable_gas_at(&self, t_sec: f64, depth_m: f64, ppo2_limit: f64) -> &str {
        let active = self.active_index(t_sec);

        for entry in self.entries[..=active].iter().rev() {
            let Some(fo2) = parse_fo2(&entry.gas) else {
                tracing::debug!(gas = %entry.gas, "skipping unparseable gas in timeline");
                continue;
            };
            if ppo2_at_depth(fo2, depth_m) <= ppo2_limit + 1e-9 {
                return &entry.gas;
            }
        }

        &self.entries[0].gas
    }
}
