//! Catalog of the gases carried on a dive, built from cylinders and gas switches.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::models::GasChangeEvent;
use super::tokens::{is_trimix, percent_label, trimix_o2_percent};

/// Cylinder declaration from a dive log, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cylinder {
    pub o2_percent: Option<f64>,
    pub he_percent: Option<f64>,
}

impl Cylinder {
    /// Gas label for the cylinder: `Tx<o2>/<he>` when it holds helium, else `<o2>`.
    pub fn label(&self) -> Option<String> {
        let o2 = self.o2_percent?;
        match self.he_percent {
            Some(he) if he > 0.0 => Some(format!("Tx{}/{}", percent_label(o2), percent_label(he))),
            _ => Some(percent_label(o2)),
        }
    }
}

/// Deduplicated, ordered list of carried gases.
#[derive(Debug, Clone, PartialEq)]
pub struct GasCatalog {
    gases: Vec<String>,
    trimix_by_o2: HashMap<i64, String>,
}

fn numeric(label: &str) -> Option<f64> {
    label.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Trimix first, then plain percentages ascending, then anything else.
fn catalog_order(a: &str, b: &str) -> Ordering {
    fn rank(label: &str) -> (u8, f64) {
        if is_trimix(label) {
            (0, 0.0)
        } else if let Some(n) = numeric(label) {
            (1, n)
        } else {
            (2, 0.0)
        }
    }
    let (ra, na) = rank(a);
    let (rb, nb) = rank(b);
    ra.cmp(&rb).then(na.total_cmp(&nb))
}

impl GasCatalog {
    /// Build the catalog from the default gas, cylinder declarations and gas switches.
    ///
    /// A plain percentage is dropped when a trimix with the same oxygen
    /// percentage is carried; the trimix is taken as the real declaration.
    pub fn build(default_gas: &str, cylinders: &[Cylinder], events: &[GasChangeEvent]) -> Self {
        let candidates = std::iter::once(default_gas.to_string())
            .chain(cylinders.iter().filter_map(Cylinder::label))
            .chain(events.iter().map(|e| percent_label(e.o2_percent)));

        let mut gases: Vec<String> = Vec::new();
        for gas in candidates {
            let gas = gas.trim();
            if !gas.is_empty() && !gases.iter().any(|g| g == gas) {
                gases.push(gas.to_string());
            }
        }
        gases.sort_by(|a, b| catalog_order(a, b));

        let trimix_o2: Vec<i64> = gases
            .iter()
            .filter_map(|g| trimix_o2_percent(g))
            .map(|o2| o2.round() as i64)
            .collect();
        gases.retain(|g| match numeric(g) {
            Some(n) => !trimix_o2.contains(&(n.round() as i64)),
            None => true,
        });

        let mut trimix_by_o2 = HashMap::new();
        for gas in &gases {
            if let Some(o2) = trimix_o2_percent(gas) {
                // First declaration wins when two trimixes share an O2 percentage.
                trimix_by_o2
                    .entry(o2.round() as i64)
                    .or_insert_with(|| gas.clone());
            }
        }

        Self { gases, trimix_by_o2 }
    }

    #[cfg(test)]
    pub fn gases(&self) -> &[String] {
        &self.gases
    }

    pub fn into_gases(self) -> Vec<String> {
        self.gases
    }

    /// Label to use for `gas`: the carried trimix for a matching plain percentage,
    /// otherwise `gas` unchanged.
    pub fn preferred_label(&self, gas: &str) -> String {
        numeric(gas)
            .and_then(|n| self.trimix_by_o2.get(&(n.round() as i64)))
            .cloned()
            .unwrap_or_else(|| gas.to_string())
    }
}
