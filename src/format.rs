//! Human-readable figures
//!
//! Text renderings of engine output for reports and UIs. Values are rounded
//! to whole minutes; the sign always comes from the unrounded value.

use crate::types::MS_PER_MINUTE;

/// Text used when a figure has no value
pub const NOT_AVAILABLE: &str = "N/A";

fn hours_minutes(ms: f64) -> (u64, u64) {
    let total_minutes = (ms.abs() / MS_PER_MINUTE).round() as u64;
    (total_minutes / 60, total_minutes % 60)
}

/// Duration without a sign: `"7h 45m"`, `"45m"`
pub fn format_duration(ms: f64) -> String {
    if !ms.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    match hours_minutes(ms) {
        (0, minutes) => format!("{}m", minutes),
        (hours, minutes) => format!("{}h {}m", hours, minutes),
    }
}

/// Drift with an explicit sign: `"+1h 30m"`, `"-10m"`, `"+0m"`
pub fn format_signed_duration(ms: f64) -> String {
    if !ms.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let sign = if ms < 0.0 { '-' } else { '+' };
    format!("{}{}", sign, format_duration(ms))
}

/// Cycle length as weeks and days: `"4w 5d"`, `"6d"`, `"N/A"` for no drift
pub fn format_cycle_length(days: u32) -> String {
    match (days / 7, days % 7) {
        (0, 0) => NOT_AVAILABLE.to_string(),
        (0, d) => format!("{}d", d),
        (w, 0) => format!("{}w", w),
        (w, d) => format!("{}w {}d", w, d),
    }
}

/// Average rating on the 5-point scale: `"3.4/5"`
pub fn format_rating(avg_rating: f64) -> String {
    if !avg_rating.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.1}/5", avg_rating)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MS_PER_HOUR;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(7.75 * MS_PER_HOUR), "7h 45m");
        assert_eq!(format_duration(45.0 * MS_PER_MINUTE), "45m");
        assert_eq!(format_duration(0.0), "0m");
        assert_eq!(format_duration(f64::NAN), NOT_AVAILABLE);
    }

    #[test]
    fn test_format_signed_duration() {
        assert_eq!(format_signed_duration(1.5 * MS_PER_HOUR), "+1h 30m");
        assert_eq!(format_signed_duration(-10.0 * MS_PER_MINUTE), "-10m");
        assert_eq!(format_signed_duration(0.0), "+0m");
        assert_eq!(format_signed_duration(-12.0 * MS_PER_HOUR), "-12h 0m");
        assert_eq!(format_signed_duration(f64::NAN), NOT_AVAILABLE);
    }

    #[test]
    fn test_rounding_to_minutes() {
        assert_eq!(format_signed_duration(29.6 * MS_PER_MINUTE), "+30m");
        assert_eq!(format_signed_duration(59.5 * MS_PER_MINUTE), "+1h 0m");
    }

    #[test]
    fn test_format_cycle_length() {
        assert_eq!(format_cycle_length(0), NOT_AVAILABLE);
        assert_eq!(format_cycle_length(6), "6d");
        assert_eq!(format_cycle_length(14), "2w");
        assert_eq!(format_cycle_length(33), "4w 5d");
        assert_eq!(format_cycle_length(48), "6w 6d");
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating(3.44), "3.4/5");
        assert_eq!(format_rating(f64::NAN), NOT_AVAILABLE);
    }
}
