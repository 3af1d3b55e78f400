use crate::date::{day_number, from_day_number};
use chrono::NaiveDate;
use serde::Serialize;

// Absorbs f32 pixel rounding so a mapped date inverts back to itself.
const INVERT_EPSILON_DAYS: f64 = 1e-3;

/// Linear map from calendar days onto a pixel range.
///
/// A single-date domain maps to the middle of the range; an empty domain maps
/// everything to the range start and never inverts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeScale {
    domain: Option<(NaiveDate, NaiveDate)>,
    range: (f32, f32),
}

impl TimeScale {
    pub fn new(domain: Option<(NaiveDate, NaiveDate)>, range: (f32, f32)) -> Self {
        let domain = domain.map(|(a, b)| if a <= b { (a, b) } else { (b, a) });
        Self { domain, range }
    }

    pub fn domain(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    pub fn map(&self, date: NaiveDate) -> f32 {
        let (r0, r1) = self.range;
        let Some((min, max)) = self.domain else {
            return r0;
        };
        if min == max {
            return (r0 + r1) / 2.0;
        }
        let (d0, d1) = (day_number(min), day_number(max));
        let t = (day_number(date) - d0) / (d1 - d0);
        (f64::from(r0) + t * f64::from(r1 - r0)) as f32
    }

    /// Pixel to date without clamping; `None` for an empty domain.
    pub fn invert(&self, px: f32) -> Option<NaiveDate> {
        let (min, max) = self.domain?;
        let (r0, r1) = self.range;
        if min == max || r0 == r1 {
            return Some(min);
        }
        let (d0, d1) = (day_number(min), day_number(max));
        let t = f64::from(px - r0) / f64::from(r1 - r0);
        from_day_number(d0 + t * (d1 - d0) + INVERT_EPSILON_DAYS)
    }

    /// Pixel to date, clamped into the domain.
    pub fn invert_clamped(&self, px: f32) -> Option<NaiveDate> {
        let (min, max) = self.domain?;
        Some(self.invert(px).map_or(min, |date| date.clamp(min, max)))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.domain
            .is_some_and(|(min, max)| (min..=max).contains(&date))
    }
}

/// Evenly spaced positions for an ordered set of names, centred in the range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointScale {
    domain: Vec<String>,
    range: (f32, f32),
    padding: f32,
}

impl PointScale {
    pub fn new(domain: Vec<String>, range: (f32, f32), padding: f32) -> Self {
        Self {
            domain,
            range,
            padding: padding.max(0.0),
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn step(&self) -> f32 {
        let (r0, r1) = self.range;
        let n = self.domain.len() as f32;
        (r1 - r0) / (n - 1.0 + 2.0 * self.padding).max(1.0)
    }

    /// Position of the first lane named `name`.
    pub fn map(&self, name: &str) -> Option<f32> {
        let index = self.domain.iter().position(|entry| entry == name)?;
        Some(self.position(index))
    }

    pub fn position(&self, index: usize) -> f32 {
        let (r0, r1) = self.range;
        let step = self.step();
        let n = self.domain.len() as f32;
        let start = r0 + (r1 - r0 - step * (n - 1.0)) / 2.0;
        start + step * index as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn maps_endpoints_onto_range() {
        let scale = TimeScale::new(Some((ymd(2024, 1, 1), ymd(2024, 12, 31))), (100.0, 900.0));
        assert_eq!(scale.map(ymd(2024, 1, 1)), 100.0);
        assert_eq!(scale.map(ymd(2024, 12, 31)), 900.0);
        let mid = scale.map(ymd(2024, 7, 1));
        assert!(mid > 490.0 && mid < 510.0, "{mid}");
    }

    #[test]
    fn inverts_mapped_dates() {
        let scale = TimeScale::new(Some((ymd(2024, 1, 1), ymd(2024, 12, 31))), (37.5, 1133.0));
        for date in [ymd(2024, 1, 1), ymd(2024, 2, 29), ymd(2024, 9, 17), ymd(2024, 12, 31)] {
            assert_eq!(scale.invert(scale.map(date)), Some(date));
        }
    }

    #[test]
    fn invert_clamped_stays_in_domain() {
        let scale = TimeScale::new(Some((ymd(2024, 1, 1), ymd(2024, 12, 31))), (0.0, 100.0));
        assert_eq!(scale.invert_clamped(-50.0), Some(ymd(2024, 1, 1)));
        assert_eq!(scale.invert_clamped(500.0), Some(ymd(2024, 12, 31)));
        assert!(scale.invert(-50.0).unwrap() < ymd(2024, 1, 1));
    }

    #[test]
    fn degenerate_domains() {
        let single = TimeScale::new(Some((ymd(2024, 5, 5), ymd(2024, 5, 5))), (0.0, 100.0));
        assert_eq!(single.map(ymd(2024, 5, 5)), 50.0);
        assert_eq!(single.invert(10.0), Some(ymd(2024, 5, 5)));

        let empty = TimeScale::new(None, (20.0, 100.0));
        assert_eq!(empty.map(ymd(2024, 5, 5)), 20.0);
        assert_eq!(empty.invert(50.0), None);
        assert_eq!(empty.invert_clamped(50.0), None);
        assert!(!empty.contains(ymd(2024, 5, 5)));
    }

    #[test]
    fn point_scale_pads_and_centres() {
        let names: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let scale = PointScale::new(names, (0.0, 250.0), 0.25);
        assert_eq!(scale.step(), 100.0);
        assert_eq!(scale.map("a"), Some(25.0));
        assert_eq!(scale.map("c"), Some(225.0));
        assert_eq!(scale.map("z"), None);

        let single = PointScale::new(vec!["only".to_string()], (0.0, 100.0), 0.0);
        assert_eq!(single.map("only"), Some(50.0));
    }
}
