//! Stat lines shown next to a thruster, e.g. `180.0kN / 215.0kN (+25%)`.

use mixer_rescale::{RescaledStats, ThrusterBaseline, percent_change};

/// `(+N%)` or `(-N%)` relative to `original`; empty when unchanged.
pub fn format_change(original: f64, current: f64) -> String {
    let change = percent_change(original, current);
    if current > original && change != 0.0 {
        format!(" (+{change}%)")
    } else if current < original && change != 0.0 {
        format!(" ({change}%)")
    } else {
        String::new()
    }
}

/// Vacuum value with an optional sea-level value in front of it.
pub fn format_value(unit: &str, original: f64, current: f64, sea_level: Option<f64>) -> String {
    let mut line = match sea_level {
        Some(sea_level) => format!("{sea_level:.1}{unit} / {current:.1}{unit}"),
        None => format!("{current:.1}{unit}"),
    };
    line.push_str(&format_change(original, current));
    line
}

pub fn thrust_line(baseline: &ThrusterBaseline, stats: &RescaledStats) -> String {
    let sea_level = stats.isp_sea_level.map(|isp| {
        if stats.isp_vacuum > 0.0 {
            stats.max_thrust * isp / stats.isp_vacuum
        } else {
            0.0
        }
    });
    format_value("kN", baseline.max_thrust, stats.max_thrust, sea_level)
}

pub fn isp_line(baseline: &ThrusterBaseline, stats: &RescaledStats) -> String {
    format_value("s", baseline.isp_vacuum, stats.isp_vacuum, stats.isp_sea_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_lines_show_signed_change() {
        assert_eq!(format_value("kN", 100.0, 125.0, None), "125.0kN (+25%)");
        assert_eq!(
            format_value("s", 320.0, 300.0, Some(260.0)),
            "260.0s / 300.0s (-6%)"
        );
        assert_eq!(format_value("s", 320.0, 320.0, None), "320.0s");
    }
}
