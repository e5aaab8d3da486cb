//! Daily, gap-free series built from irregular observations.

use crate::core::observation::DatedObservation;
use crate::error::{EngineError, Result};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// A regular series with exactly one slot per calendar day.
///
/// Slots hold `Option<f64>`: `None` marks a day with no observation that
/// interpolation could not resolve.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl DailySeries {
    /// Create a series from parallel date and value vectors.
    ///
    /// Dates must advance by exactly one day between neighbours.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(EngineError::InvalidParameter(format!(
                "expected {} values for {} dates, got {}",
                dates.len(),
                dates.len(),
                values.len()
            )));
        }
        for w in dates.windows(2) {
            if w[1] - w[0] != Duration::days(1) {
                return Err(EngineError::InvalidParameter(format!(
                    "dates must be consecutive days: {} follows {}",
                    w[1], w[0]
                )));
            }
        }
        Ok(Self { dates, values })
    }

    /// Create a fully populated series starting at `start`.
    pub fn from_values(start: NaiveDate, values: Vec<f64>) -> Self {
        let dates = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        Self {
            dates,
            values: values.into_iter().map(Some).collect(),
        }
    }

    /// Days [`resample`](Self::resample) would produce, without allocating them.
    pub fn span_days(observations: &[DatedObservation]) -> usize {
        let first = observations.iter().map(|o| o.date).min();
        let last = observations.iter().map(|o| o.date).max();
        match (first, last) {
            (Some(first), Some(last)) => (last - first).num_days() as usize + 1,
            _ => 0,
        }
    }

    /// Bucket observations onto a daily grid.
    ///
    /// Multiple observations on one day are averaged. Days between the earliest
    /// and latest observation with no usable amount stay `None`. Input order
    /// does not matter.
    pub fn resample(observations: &[DatedObservation]) -> Self {
        let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for obs in observations {
            let bucket = buckets.entry(obs.date).or_insert((0.0, 0));
            if let Some(amount) = obs.amount {
                bucket.0 += amount;
                bucket.1 += 1;
            }
        }

        let (first, last) = match (buckets.keys().next(), buckets.keys().next_back()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Self::default(),
        };

        let span = (last - first).num_days() as usize + 1;
        let dates: Vec<NaiveDate> = first.iter_days().take(span).collect();
        let values = dates
            .iter()
            .map(|day| match buckets.get(day) {
                Some(&(sum, count)) if count > 0 => Some(sum / count as f64),
                _ => None,
            })
            .collect();

        Self { dates, values }
    }

    /// Number of days covered.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Value on the last day, if resolved.
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    /// Count of unresolved days.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(Option::is_none)
    }

    /// Return a copy with interior gaps filled by linear interpolation.
    ///
    /// Leading and trailing gaps have a known value on one side only and stay
    /// `None`.
    pub fn interpolated(&self) -> DailySeries {
        DailySeries {
            dates: self.dates.clone(),
            values: interpolate_interior(&self.values),
        }
    }

    /// The trailing `max_len` days, or the whole series if it is shorter.
    pub fn tail(&self, max_len: usize) -> DailySeries {
        let start = self.len().saturating_sub(max_len);
        DailySeries {
            dates: self.dates[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }

    /// Plain values for a model, failing if any day is unresolved.
    pub fn complete_values(&self) -> Result<Vec<f64>> {
        self.values
            .iter()
            .map(|v| v.ok_or(EngineError::MissingValues))
            .collect()
    }

    /// `count` consecutive days starting the day after the last date.
    pub fn following_dates(&self, count: usize) -> Vec<NaiveDate> {
        match self.last_date() {
            Some(last) => (1..=count as i64)
                .map(|i| last + Duration::days(i))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Linear interpolation over runs of `None` bounded by known values.
fn interpolate_interior(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = values.to_vec();
    let n = result.len();

    let mut i = 0;
    while i < n {
        if result[i].is_some() {
            i += 1;
            continue;
        }

        let start = i;
        while i < n && result[i].is_none() {
            i += 1;
        }
        let end = i;

        let left = if start > 0 { result[start - 1] } else { None };
        let right = if end < n { result[end] } else { None };

        if let (Some(l), Some(r)) = (left, right) {
            // end - start missing slots split the span into end - start + 1 steps
            let steps = (end - start + 1) as f64;
            for (j, slot) in result[start..end].iter_mut().enumerate() {
                let t = (j + 1) as f64 / steps;
                *slot = Some(l + t * (r - l));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn obs(d: u32, amount: f64) -> DatedObservation {
        DatedObservation::new(day(d), Some(amount))
    }

    #[test]
    fn resample_spans_first_to_last_day() {
        let series = DailySeries::resample(&[obs(3, 30.0), obs(1, 10.0), obs(6, 60.0)]);

        assert_eq!(series.len(), 6);
        assert_eq!(series.first_date(), Some(day(1)));
        assert_eq!(series.last_date(), Some(day(6)));
        assert_eq!(
            series.values(),
            &[Some(10.0), None, Some(30.0), None, None, Some(60.0)]
        );
    }

    #[test]
    fn resample_averages_same_day_observations() {
        let series = DailySeries::resample(&[obs(1, 10.0), obs(1, 20.0), obs(2, 5.0)]);

        assert_eq!(series.values(), &[Some(15.0), Some(5.0)]);
    }

    #[test]
    fn resample_ignores_null_amounts_in_mean() {
        let series = DailySeries::resample(&[
            obs(1, 8.0),
            DatedObservation::new(day(1), None),
            DatedObservation::new(day(2), None),
            obs(3, 4.0),
        ]);

        assert_eq!(series.values(), &[Some(8.0), None, Some(4.0)]);
    }

    #[test]
    fn span_days_matches_resampled_length() {
        let observations = [obs(9, 1.0), obs(2, 2.0), obs(4, 3.0)];
        assert_eq!(DailySeries::span_days(&observations), 8);
        assert_eq!(
            DailySeries::span_days(&observations),
            DailySeries::resample(&observations).len()
        );
        assert_eq!(DailySeries::span_days(&[obs(5, 1.0)]), 1);
        assert_eq!(DailySeries::span_days(&[]), 0);
    }

    #[test]
    fn resample_of_nothing_is_empty() {
        let series = DailySeries::resample(&[]);
        assert!(series.is_empty());
        assert_eq!(series.last_date(), None);
        assert!(series.following_dates(3).is_empty());
    }

    #[test]
    fn interpolation_fills_single_interior_gap() {
        let series = DailySeries::resample(&[obs(1, 1.0), obs(2, 2.0), obs(4, 8.0), obs(5, 9.0)]);
        let filled = series.interpolated();

        assert_relative_eq!(filled.values()[2].unwrap(), 5.0, epsilon = 1e-10);
        assert!(!filled.has_missing_values());
    }

    #[test]
    fn interpolation_spreads_longer_gaps_evenly() {
        let series = DailySeries::new(
            (1..=5).map(day).collect(),
            vec![Some(1.0), None, None, Some(4.0), Some(5.0)],
        )
        .unwrap();
        let filled = series.interpolated();

        let values: Vec<f64> = filled.values().iter().map(|v| v.unwrap()).collect();
        assert_relative_eq!(values[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(values[2], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn interpolation_leaves_edges_unresolved() {
        let series = DailySeries::new(
            (1..=5).map(day).collect(),
            vec![None, None, Some(3.0), Some(4.0), None],
        )
        .unwrap();
        let filled = series.interpolated();

        assert_eq!(filled.values()[0], None);
        assert_eq!(filled.values()[1], None);
        assert_eq!(filled.values()[4], None);
        assert_eq!(filled.missing_count(), 3);
        assert!(matches!(
            filled.complete_values(),
            Err(EngineError::MissingValues)
        ));
    }

    #[test]
    fn tail_keeps_trailing_days() {
        let start = day(1);
        let series = DailySeries::from_values(start, (0..100).map(|i| i as f64).collect());

        let window = series.tail(80);
        assert_eq!(window.len(), 80);
        assert_eq!(window.first_date(), Some(start + Duration::days(20)));
        assert_eq!(window.complete_values().unwrap()[0], 20.0);

        let short = DailySeries::from_values(start, vec![1.0; 50]);
        assert_eq!(short.tail(80).len(), 50);
    }

    #[test]
    fn following_dates_start_after_last_day() {
        let series = DailySeries::from_values(day(30), vec![1.0, 2.0, 3.0]);
        let next = series.following_dates(3);

        assert_eq!(
            next,
            vec![
                NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 4).unwrap(),
            ]
        );
    }

    #[test]
    fn constructor_rejects_non_consecutive_dates() {
        let result = DailySeries::new(vec![day(1), day(3)], vec![Some(1.0), Some(2.0)]);
        assert!(matches!(result, Err(EngineError::InvalidParameter(_))));

        let result = DailySeries::new(vec![day(2), day(1)], vec![Some(1.0), Some(2.0)]);
        assert!(result.is_err());

        let result = DailySeries::new(vec![day(1)], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn last_value_reads_final_slot() {
        let series = DailySeries::new(vec![day(1), day(2)], vec![Some(1.5), Some(2.5)]).unwrap();
        assert_eq!(series.last_value(), Some(2.5));

        let series = DailySeries::new(vec![day(1), day(2)], vec![Some(1.5), None]).unwrap();
        assert_eq!(series.last_value(), None);
    }
}
