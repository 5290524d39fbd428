//! Parsers for the free-form text tokens found in dive logs and schedules.
//!
//! Log data is noisy, so duration and depth parsing is best-effort: anything
//! unrecognised becomes `0`. Mixture parsing reports failure as `None` so
//! callers can tell "unknown gas" apart from a real value.

use once_cell::sync::Lazy;

use regex::Regex;

static CLOCK_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+):(\d+)(?:\s*min)?").expect("valid regex"));
static MINUTES_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*min").expect("valid regex"));
static METRES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(-?\d+(?:\.\d+)?)\s*m").expect("valid regex"));
static PERCENT_MIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)$").expect("valid regex"));
static BINARY_MIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)/(\d+(?:\.\d+)?)$").expect("valid regex"));
static TRIMIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^TX(\d+(?:\.\d+)?)/(\d+(?:\.\d+)?)$").expect("valid regex"));

fn plain_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn capture_f64(caps: &regex::Captures<'_>, group: usize) -> Option<f64> {
    caps.get(group).and_then(|m| plain_number(m.as_str()))
}

/// Parse a duration into seconds.
///
/// Accepted, first match wins: `"MM:SS"` or `"MM:SS min"`, `"<minutes> min"`,
/// a bare number of seconds. Anything else is `0`.
pub fn parse_duration_sec(raw: &str) -> f64 {
    let s = raw.trim();

    if let Some(caps) = CLOCK_DURATION.captures(s) {
        if let (Some(mm), Some(ss)) = (capture_f64(&caps, 1), capture_f64(&caps, 2)) {
            return mm * 60.0 + ss;
        }
    }

    if let Some(minutes) = MINUTES_DURATION.captures(s).and_then(|c| capture_f64(&c, 1)) {
        return (minutes * 60.0).round();
    }

    plain_number(s).unwrap_or_else(|| {
        tracing::debug!(token = raw, "unparseable duration, assuming 0");
        0.0
    })
}

/// Parse a depth such as `"55.0 m"` or `"12"` into metres. Anything else is `0`.
pub fn parse_depth_m(raw: &str) -> f64 {
    let s = raw.trim();

    if let Some(depth) = METRES.captures(s).and_then(|c| capture_f64(&c, 1)) {
        return depth;
    }

    plain_number(s).unwrap_or_else(|| {
        tracing::debug!(token = raw, "unparseable depth, assuming 0");
        0.0
    })
}

/// Parse a percentage field such as `"50.0%"` or `"21"`.
pub fn parse_percent(raw: &str) -> Option<f64> {
    plain_number(raw.replace('%', "").trim())
}

/// Label for a whole-number oxygen percentage, e.g. `50.4` -> `"50"`.
pub fn percent_label(percent: f64) -> String {
    (percent.round() as i64).to_string()
}

/// Canonical form of a gas label: trimmed, uppercase, `O2` spelled `100`.
pub fn normalize_gas(label: &str) -> String {
    let s = label.trim().to_uppercase();
    if s == "O2" {
        "100".to_string()
    } else {
        s
    }
}

/// Oxygen fraction of a gas label (`"32"`, `"21/35"`, `"Tx18/45"`, `"O2"`).
///
/// Returns `None` for unrecognised labels and for oxygen outside (0, 100].
/// The helium part of a binary or trimix label only has to be numeric.
pub fn parse_fo2(label: &str) -> Option<f64> {
    let gas = normalize_gas(label);

    let o2 = if let Some(caps) = PERCENT_MIX.captures(&gas) {
        capture_f64(&caps, 1)?
    } else if let Some(caps) = BINARY_MIX
        .captures(&gas)
        .or_else(|| TRIMIX.captures(&gas))
    {
        capture_f64(&caps, 2).and(capture_f64(&caps, 1))?
    } else {
        return None;
    };

    if o2 <= 0.0 || o2 > 100.0 {
        return None;
    }

    Some(o2 / 100.0)
}

/// Whether a label is written in trimix form (`Tx<O2>/<He>`).
pub fn is_trimix(label: &str) -> bool {
    TRIMIX.is_match(label.trim())
}

/// Oxygen percentage of a trimix label, `None` for other forms.
pub fn trimix_o2_percent(label: &str) -> Option<f64> {
    TRIMIX
        .captures(label.trim())
        .and_then(|c| capture_f64(&c, 1))
}
