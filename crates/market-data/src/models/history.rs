use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of trading days kept in a [`HistorySeries`].
pub const HISTORY_WINDOW: usize = 30;

/// Daily closing price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

impl HistoryPoint {
    pub fn new(date: NaiveDate, price: Decimal) -> Self {
        Self { date, price }
    }
}

/// Daily price history, strictly ascending by date, oldest first.
///
/// The constructor enforces the ordering: input may arrive in any order and
/// may contain duplicate days; only the most recent `window` distinct days are
/// kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<HistoryPoint>", into = "Vec<HistoryPoint>")]
pub struct HistorySeries {
    points: Vec<HistoryPoint>,
}

impl HistorySeries {
    /// Build a series from points in arbitrary order, keeping the most recent
    /// `window` days. For a duplicated date the first occurrence wins.
    pub fn from_unordered(points: impl IntoIterator<Item = HistoryPoint>, window: usize) -> Self {
        let mut points: Vec<HistoryPoint> = points.into_iter().collect();

        // Stable sort keeps the first occurrence of a duplicated date in front.
        points.sort_by(|a, b| a.date.cmp(&b.date));
        points.dedup_by(|later, earlier| later.date == earlier.date);

        if points.len() > window {
            points.drain(..points.len() - window);
        }

        Self { points }
    }

    pub fn points(&self) -> &[HistoryPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryPoint> {
        self.points.iter()
    }

    /// Most recent point, if any.
    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.last()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Deserialized series go through the same normalization as provider data.
impl From<Vec<HistoryPoint>> for HistorySeries {
    fn from(points: Vec<HistoryPoint>) -> Self {
        Self::from_unordered(points, HISTORY_WINDOW)
    }
}

impl From<HistorySeries> for Vec<HistoryPoint> {
    fn from(series: HistorySeries) -> Self {
        series.points
    }
}

impl<'a> IntoIterator for &'a HistorySeries {
    type Item = &'a HistoryPoint;
    type IntoIter = std::slice::Iter<'a, HistoryPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_series_sorts_oldest_first() {
        let series = HistorySeries::from_unordered(
            vec![
                HistoryPoint::new(day(5), dec!(105)),
                HistoryPoint::new(day(1), dec!(101)),
                HistoryPoint::new(day(3), dec!(103)),
            ],
            HISTORY_WINDOW,
        );

        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(1), day(3), day(5)]);
        assert_eq!(series.latest().unwrap().price, dec!(105));
    }

    #[test]
    fn test_series_keeps_most_recent_window() {
        let points = (1..=20).map(|d| HistoryPoint::new(day(d), Decimal::from(d)));
        let series = HistorySeries::from_unordered(points, 5);

        assert_eq!(series.len(), 5);
        assert_eq!(series.first_date(), Some(day(16)));
        assert_eq!(series.last_date(), Some(day(20)));
    }

    #[test]
    fn test_series_drops_duplicate_dates() {
        let series = HistorySeries::from_unordered(
            vec![
                HistoryPoint::new(day(2), dec!(10)),
                HistoryPoint::new(day(2), dec!(11)),
                HistoryPoint::new(day(1), dec!(9)),
            ],
            HISTORY_WINDOW,
        );

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[1].price, dec!(10));
    }

    #[test]
    fn test_deserialize_normalizes_points() {
        let json = serde_json::json!([
            {"date": "2024-03-05", "price": 105.0},
            {"date": "2024-03-01", "price": 101.0},
            {"date": "2024-03-05", "price": 999.0},
        ]);

        let series: HistorySeries = serde_json::from_value(json).unwrap();

        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(1), day(5)]);
        assert_eq!(series.latest().unwrap().price, dec!(105));
        assert_eq!(serde_json::to_value(&series).unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_deserialize_truncates_to_window() {
        let points: Vec<_> = (0..40)
            .map(|i| HistoryPoint::new(day(1) + chrono::Days::new(i), dec!(1)))
            .collect();
        let json = serde_json::to_value(&points).unwrap();

        let series: HistorySeries = serde_json::from_value(json).unwrap();

        assert_eq!(series.len(), HISTORY_WINDOW);
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 4, 9));
    }

    #[test]
    fn test_empty_series() {
        let series = HistorySeries::from_unordered(Vec::new(), HISTORY_WINDOW);
        assert!(series.is_empty());
        assert!(series.latest().is_none());
    }
}
