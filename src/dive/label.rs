//! Fixed-layout text label for a validated schedule.

use super::models::{GasTable, GradientFactors, ScheduleRow};

const DISCLAIMER: &str = "VERIFY AGAINST YOUR TRAINING + PLANNER. NOT A DIVE PLAN GENERATOR.";

/// Everything printed on the label.
#[derive(Debug, Clone)]
pub struct LabelInput<'a> {
    pub max_depth_m: f64,
    pub total_runtime_min: u32,
    pub gases_carried: &'a [String],
    pub mod_by_gas_m: &'a GasTable,
    pub schedule: &'a [ScheduleRow],
    pub gradient_factors: Option<GradientFactors>,
    pub otu_total: f64,
    pub cns_percent_total: f64,
    pub gas_used_litres_by_gas: &'a GasTable,
    pub notes: Option<&'a str>,
    pub banner: Option<&'a str>,
}

/// Nearest whole number, halves away from zero.
fn whole(value: f64) -> i64 {
    value.round() as i64
}

/// Render the label text. Lines are separated by `\n` with no trailing newline.
pub fn build_label_text(input: &LabelInput<'_>) -> String {
    let mut lines = Vec::with_capacity(input.schedule.len() + 10);

    if let Some(banner) = input.banner {
        lines.push(format!("*** {banner} ***"));
    }

    let gf = input
        .gradient_factors
        .map(|gf| format!(" | GF {}/{}", gf.low, gf.high))
        .unwrap_or_default();
    lines.push(format!(
        "MAX {}m | RT {}m{}",
        whole(input.max_depth_m),
        input.total_runtime_min,
        gf
    ));

    lines.push(format!("GASES: {}", input.gases_carried.join(" | ")));

    let mods: Vec<String> = input
        .mod_by_gas_m
        .iter()
        .map(|(gas, m)| format!("{gas}={}m", whole(m)))
        .collect();
    lines.push(format!("MOD@deco: {}", mods.join(", ")));

    lines.push("---- STOPS ----".to_string());
    for row in input.schedule {
        lines.push(format!(
            "{:>2}m  {:>2}'  TRT{:>2}  {}",
            row.depth_m, row.stop_min, row.trt_min, row.gas
        ));
    }
    lines.push("--------------".to_string());

    lines.push(format!(
        "OTU {} | CNS {}%",
        whole(input.otu_total),
        whole(input.cns_percent_total)
    ));

    let usage: Vec<String> = input
        .gas_used_litres_by_gas
        .iter()
        .map(|(gas, litres)| format!("{gas}={}", whole(litres)))
        .collect();
    lines.push(format!("GAS(L): {}", usage.join(" | ")));

    if let Some(notes) = input.notes.filter(|n| !n.is_empty()) {
        lines.push(format!("NOTES: {notes}"));
    }
    lines.push(DISCLAIMER.to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(depth_m: f64, stop_min: u32, trt_min: u32, gas: &str) -> ScheduleRow {
        ScheduleRow {
            depth_m,
            stop_min,
            trt_min,
            gas: gas.to_string(),
        }
    }

    #[test]
    fn test_full_label() {
        let gases = vec!["TX18/45".to_string(), "50".to_string(), "100".to_string()];
        let mut mods = GasTable::new();
        mods.set("TX18/45", 78.888);
        mods.set("50", 22.0);
        mods.set("100", 6.0);
        let mut usage = GasTable::new();
        usage.add("TX18/45", 3010.4);
        usage.add("50", 46.5);
        usage.add("100", 120.0);
        let schedule = vec![row(21.0, 1, 26, "50"), row(6.0, 5, 31, "100"), row(3.0, 12, 43, "100")];

        let text = build_label_text(&LabelInput {
            max_depth_m: 45.0,
            total_runtime_min: 43,
            gases_carried: &gases,
            mod_by_gas_m: &mods,
            schedule: &schedule,
            gradient_factors: Some(GradientFactors { low: 30.0, high: 70.0 }),
            otu_total: 41.5,
            cns_percent_total: 17.49,
            gas_used_litres_by_gas: &usage,
            notes: Some("Cave line at 21m"),
            banner: Some("WARNINGS PRESENT"),
        });

        let expected = "\
*** WARNINGS PRESENT ***
MAX 45m | RT 43m | GF 30/70
GASES: TX18/45 | 50 | 100
MOD@deco: TX18/45=79m, 50=22m, 100=6m
---- STOPS ----
21m   1'  TRT26  50
 6m   5'  TRT31  100
 3m  12'  TRT43  100
--------------
OTU 42 | CNS 17%
GAS(L): TX18/45=3010 | 50=47 | 100=120
NOTES: Cave line at 21m
VERIFY AGAINST YOUR TRAINING + PLANNER. NOT A DIVE PLAN GENERATOR.";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_minimal_label_has_no_banner_gf_or_notes() {
        let gases = vec!["21".to_string()];
        let mut mods = GasTable::new();
        mods.set("21", 66.19);
        let mut usage = GasTable::new();
        usage.add("21", 500.0);
        let schedule = vec![row(5.0, 3, 40, "21")];

        let text = build_label_text(&LabelInput {
            max_depth_m: 18.4,
            total_runtime_min: 40,
            gases_carried: &gases,
            mod_by_gas_m: &mods,
            schedule: &schedule,
            gradient_factors: None,
            otu_total: 0.0,
            cns_percent_total: 0.0,
            gas_used_litres_by_gas: &usage,
            notes: Some(""),
            banner: None,
        });

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "MAX 18m | RT 40m");
        assert!(!text.contains("NOTES"));
        assert!(!text.contains("***"));
        assert_eq!(lines.last().copied(), Some(DISCLAIMER));
    }

    #[test]
    fn test_fractional_depth_in_stop_table() {
        let gases = vec!["50".to_string()];
        let mods = GasTable::new();
        let usage = GasTable::new();
        let schedule = vec![row(4.5, 2, 9, "50")];

        let text = build_label_text(&LabelInput {
            max_depth_m: 10.0,
            total_runtime_min: 9,
            gases_carried: &gases,
            mod_by_gas_m: &mods,
            schedule: &schedule,
            gradient_factors: None,
            otu_total: 0.0,
            cns_percent_total: 0.0,
            gas_used_litres_by_gas: &usage,
            notes: None,
            banner: None,
        });

        assert!(text.contains("4.5m   2'  TRT 9  50"));
    }
}
