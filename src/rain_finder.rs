//! Backward scans over chronologically ordered history.
//!
//! Both scans expect `history` oldest-first, exactly as the parsers produce it, and walk
//! it from the most recent day backwards. Neither reorders its input.

use crate::types::daily_record::DailyRecord;

/// Default threshold: any measured precipitation counts.
pub const DEFAULT_THRESHOLD: f64 = 0.0;

/// The most recent day with precipitation strictly greater than `threshold`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use dsir::{find_by_threshold, DailyRecord};
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
/// let history = vec![
///     DailyRecord::new(day(1), 0.8),
///     DailyRecord::new(day(2), 0.1),
///     DailyRecord::new(day(3), 0.0),
/// ];
///
/// assert_eq!(find_by_threshold(&history, 0.0).unwrap().date, day(2));
/// assert_eq!(find_by_threshold(&history, 0.5).unwrap().date, day(1));
/// assert!(find_by_threshold(&history, 0.8).is_none());
/// ```
pub fn find_by_threshold(history: &[DailyRecord], threshold: f64) -> Option<&DailyRecord> {
    history
        .iter()
        .rev()
        .find(|day| day.precipitation > threshold)
}

/// The most recent day tagged with a `rain` or `snow` event, whatever amount was measured.
///
/// Catches days where a provider records a qualitative event (e.g. trace snow) with zero
/// measured precipitation.
pub fn find_by_event(history: &[DailyRecord]) -> Option<&DailyRecord> {
    history
        .iter()
        .rev()
        .find(|day| day.has_precipitation_event())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn history(days: &[(f64, &[&str])]) -> Vec<DailyRecord> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        days.iter()
            .enumerate()
            .map(|(i, (precip, events))| {
                DailyRecord::new(start + Duration::days(i as i64), *precip).with_events(events.iter())
            })
            .collect()
    }

    #[test]
    fn test_threshold_returns_latest_match() {
        let h = history(&[(0.5, &[]), (0.0, &[]), (0.3, &[]), (0.0, &["rain"])]);
        let found = find_by_threshold(&h, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(found, &h[2]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let h = history(&[(0.25, &[]), (1.0, &[])]);
        assert_eq!(find_by_threshold(&h, 0.25).unwrap(), &h[1]);
        assert!(find_by_threshold(&h, 1.0).is_none());
    }

    #[test]
    fn test_threshold_property_holds_for_every_prefix() {
        let h = history(&[
            (0.0, &[]),
            (0.4, &["rain"]),
            (0.1, &[]),
            (0.0, &["snow"]),
            (2.0, &[]),
            (0.0, &[]),
        ]);
        for threshold in [0.0, 0.05, 0.1, 0.4, 1.0, 2.0, 3.0] {
            for end in 0..=h.len() {
                let slice = &h[..end];
                match find_by_threshold(slice, threshold) {
                    Some(found) => {
                        assert!(found.precipitation > threshold);
                        let pos = slice.iter().position(|d| d == found).unwrap();
                        assert!(slice[pos + 1..].iter().all(|d| d.precipitation <= threshold));
                    }
                    None => assert!(slice.iter().all(|d| d.precipitation <= threshold)),
                }
            }
        }
    }

    #[test]
    fn test_event_ignores_amount() {
        let h = history(&[(1.5, &["rain"]), (0.0, &["snow"]), (3.0, &["fog"])]);
        assert_eq!(find_by_event(&h).unwrap(), &h[1]);
    }

    #[test]
    fn test_event_property_holds_for_every_prefix() {
        let h = history(&[(0.0, &["rain"]), (0.2, &[]), (0.0, &["fog", "snow"]), (0.9, &["thunderstorm"])]);
        for end in 0..=h.len() {
            let slice = &h[..end];
            match find_by_event(slice) {
                Some(found) => {
                    assert!(found.has_precipitation_event());
                    let pos = slice.iter().position(|d| d == found).unwrap();
                    assert!(slice[pos + 1..].iter().all(|d| !d.has_precipitation_event()));
                }
                None => assert!(slice.iter().all(|d| !d.has_precipitation_event())),
            }
        }
    }

    #[test]
    fn test_empty_history() {
        assert!(find_by_threshold(&[], 0.0).is_none());
        assert!(find_by_event(&[]).is_none());
    }
}
