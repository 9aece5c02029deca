//! Date-range normalization.
//!
//! Raw date expressions in finding aids come in many shapes: bare years
//! ("1915"), year ranges ("1910-1915"), shared-context day spans
//! ("14-15 Oct 1839"), month-years, full dates, and free text with no date at
//! all. This module resolves each end of a range independently to the most
//! specific calendar unit recoverable and derives sortable integer keys that
//! totally order partial dates against complete ones: a missing month or day
//! snaps to the earliest possible value on the start side and to the latest
//! possible value within the known unit on the end side.
//!
//! Normalization is total. Unrecoverable text yields unset endpoints, never
//! an error; a range written in reverse chronological order is swapped and
//! marked so the caller can flag it for review.

use std::{fmt, sync::LazyLock};

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::config::Config;

/// A calendar date known down to the year, month, or day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialDate {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
}

impl PartialDate {
    /// A date known only to the year.
    #[must_use]
    pub const fn year_only(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    /// The year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The month, if known (1–12).
    #[must_use]
    pub const fn month(&self) -> Option<u32> {
        self.month
    }

    /// The day of month, if known.
    #[must_use]
    pub const fn day(&self) -> Option<u32> {
        self.day
    }

    /// True only when year, month, and day are all known.
    #[must_use]
    pub const fn complete(&self) -> bool {
        self.month.is_some() && self.day.is_some()
    }

    /// Sort key treating missing units as the earliest possible instant.
    ///
    /// A bare "1915" used as a start sorts as 1915-01-01.
    #[must_use]
    pub fn sortable_floor(&self) -> i64 {
        sortable(self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
    }

    /// Sort key treating missing units as the latest possible instant within
    /// the known unit.
    ///
    /// A bare "1915" used as an end sorts as 1915-12-31, so partial dates
    /// never artificially outrank more specific ones.
    #[must_use]
    pub fn sortable_ceil(&self) -> i64 {
        let month = self.month.unwrap_or(12);
        let day = self.day.unwrap_or_else(|| last_day_of_month(self.year, month));
        sortable(self.year, month, day)
    }
}

impl fmt::Display for PartialDate {
    /// Partial-ISO rendering: `1915`, `1915-10`, or `1915-10-14`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{month:02}")?;
            if let Some(day) = self.day {
                write!(f, "-{day:02}")?;
            }
        }
        Ok(())
    }
}

fn sortable(year: i32, month: u32, day: u32) -> i64 {
    i64::from(year) * 10_000 + i64::from(month) * 100 + i64::from(day)
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let first_of_next = if month >= 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}

/// A normalized date range: both endpoints resolved independently, with the
/// swap marker set when the raw text implied reverse chronological order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizedDateRange {
    /// The resolved start, if recoverable.
    pub start: Option<PartialDate>,
    /// The resolved end, if recoverable. Unset for open-ended ranges.
    pub end: Option<PartialDate>,
    /// True when start and end were swapped to restore chronological order.
    pub swapped: bool,
}

impl NormalizedDateRange {
    /// Partial-ISO rendering of the start.
    #[must_use]
    pub fn start_formatted(&self) -> Option<String> {
        self.start.map(|d| d.to_string())
    }

    /// Partial-ISO rendering of the end.
    #[must_use]
    pub fn end_formatted(&self) -> Option<String> {
        self.end.map(|d| d.to_string())
    }

    /// Sortable key for the start (missing units snap to the floor).
    #[must_use]
    pub fn start_sortable(&self) -> Option<i64> {
        self.start.map(|d| d.sortable_floor())
    }

    /// Sortable key for the end (missing units snap to the ceiling).
    #[must_use]
    pub fn end_sortable(&self) -> Option<i64> {
        self.end.map(|d| d.sortable_ceil())
    }

    /// True when the start is known to the day.
    #[must_use]
    pub fn start_complete(&self) -> bool {
        self.start.is_some_and(|d| d.complete())
    }

    /// True when the end is known to the day.
    #[must_use]
    pub fn end_complete(&self) -> bool {
        self.end.is_some_and(|d| d.complete())
    }

    /// True when neither endpoint was recovered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// The single-date sort key kept for downstream consumers of the original
/// columns: the left segment of the expression, floored, with a far-future
/// sentinel for undated rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateKey {
    /// `YYYY-MM-DD`, or `9999-12-31` when nothing was recoverable.
    pub sortable: String,
    /// True when the left segment carried a day and month.
    pub complete: bool,
}

/// Sentinel sort key for rows with no recoverable date.
const UNDATED_SENTINEL: &str = "9999-12-31";

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("valid regex"));
static DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([1-9]|[12]\d|3[01])\b").expect("valid regex"));
static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\b",
    )
    .expect("valid regex")
});
static NUMERIC_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[/.](\d{1,2})[/.](\d{4})\b").expect("valid regex"));
static RANGE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*(?:-|\bto\b|\band\b|&)\s*").expect("valid regex"));

/// Normalizes a raw date expression into a start/end pair.
///
/// When only `raw_start` is given it is split range-aware (connectors `-`,
/// `to`, `and`, `&`, en/em dashes); when both sides are given each is
/// resolved independently. A single-ended range mirrors onto the missing
/// side unless the raw text carries an explicit open-ended marker (trailing
/// dash, or a marker such as `n.d.`).
///
/// Total: malformed input yields unset endpoints, never an error.
#[must_use]
pub fn normalize(
    raw_start: Option<&str>,
    raw_end: Option<&str>,
    config: &Config,
) -> NormalizedDateRange {
    let start_text = raw_start.map(clean).unwrap_or_default();
    let end_text = raw_end.map(clean).unwrap_or_default();

    let (start, end, start_open, end_open) = if end_text.is_empty() {
        let (start, end, end_open) = split_and_resolve(&start_text, config);
        (start, end, false, end_open)
    } else {
        // Each side resolves independently; a no-date marker on either side
        // leaves that end explicitly open.
        let start = resolve_endpoint(&start_text, &start_text, config);
        let end = resolve_endpoint(&end_text, &end_text, config);
        let start_open = config.is_open_range_marker(&start_text);
        let end_open = config.is_open_range_marker(&end_text);
        (start, end, start_open, end_open)
    };

    // Mirror a single-ended range unless the missing side is explicitly open.
    let (start, end) = match (start, end) {
        (Some(s), None) if !end_open => (Some(s), Some(s)),
        (None, Some(e)) if !start_open => (Some(e), Some(e)),
        other => other,
    };

    // Restore chronological order if the source wrote the range in reverse.
    if let (Some(s), Some(e)) = (start, end) {
        if e.sortable_ceil() < s.sortable_floor() {
            return NormalizedDateRange {
                start: Some(e),
                end: Some(s),
                swapped: true,
            };
        }
    }

    NormalizedDateRange {
        start,
        end,
        swapped: false,
    }
}

/// The single-date view over the whole expression: left segment only,
/// floored, with the `9999-12-31` sentinel for undated rows.
#[must_use]
pub fn date_key(raw: Option<&str>, config: &Config) -> DateKey {
    let undated = || DateKey {
        sortable: UNDATED_SENTINEL.to_string(),
        complete: false,
    };

    let Some(raw) = raw else { return undated() };
    let s = clean(raw);
    if s.is_empty() || config.is_open_range_marker(&s) || s.ends_with('-') {
        return undated();
    }

    let left = left_segment(&s);
    resolve_endpoint(left, &s, config).map_or_else(undated, |date| DateKey {
        sortable: format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month().unwrap_or(1),
            date.day().unwrap_or(1)
        ),
        complete: date.complete(),
    })
}

/// Normalizes dashes and whitespace and strips the trailing punctuation that
/// finding aids accumulate.
fn clean(raw: &str) -> String {
    let s = raw.replace(['–', '—'], "-");
    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    s.trim().trim_end_matches([' ', '.', ';', ',', '/']).to_string()
}

/// The portion before a range connector, then before any `;` list separator.
fn left_segment(s: &str) -> &str {
    let first = RANGE_SPLIT_RE.split(s).next().unwrap_or(s);
    first.split(';').next().unwrap_or(first).trim()
}

/// Splits a raw expression into resolved endpoints, carrying shared
/// month/year context into each side.
///
/// Returns `(start, end, end_open)`; `end_open` is true when the text marks
/// the end as explicitly open (trailing dash).
fn split_and_resolve(
    raw: &str,
    config: &Config,
) -> (Option<PartialDate>, Option<PartialDate>, bool) {
    if raw.is_empty() || config.is_open_range_marker(raw) {
        return (None, None, false);
    }

    // Multi-date lists use the first date.
    let raw = raw.split(';').next().unwrap_or(raw).trim();

    // A dangling dash marks an open-ended range: "1910-".
    let (raw, end_open) = raw
        .strip_suffix('-')
        .map_or((raw, false), |prefix| (prefix.trim(), true));

    if raw.is_empty() {
        return (None, None, end_open);
    }

    let pieces: Vec<&str> = RANGE_SPLIT_RE
        .split(raw)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match pieces.as_slice() {
        [] => (None, None, end_open),
        [single] => {
            let date = resolve_endpoint(single, raw, config);
            if end_open {
                (date, None, true)
            } else {
                (date, date, false)
            }
        }
        [first, .., last] => {
            let start = resolve_endpoint(first, raw, config);
            let end = if end_open {
                None
            } else {
                resolve_endpoint(last, raw, config)
            };
            (start, end, end_open)
        }
    }
}

/// Resolves one endpoint piece to the most specific unit recoverable,
/// borrowing missing year/month context from the whole expression.
fn resolve_endpoint(piece: &str, whole: &str, config: &Config) -> Option<PartialDate> {
    let piece = piece.trim().trim_end_matches([' ', '.', ';', ',', '/']);
    if piece.is_empty() || config.is_open_range_marker(piece) {
        return None;
    }

    // Numeric dd/mm/yyyy (or dd.mm.yyyy) dates, day-first order.
    if let Some(captures) = NUMERIC_DATE_RE.captures(piece) {
        let day: u32 = captures[1].parse().ok()?;
        let month: u32 = captures[2].parse().ok()?;
        let year: i32 = captures[3].parse().ok()?;
        if (1..=12).contains(&month) && config.year_in_window(year) {
            return Some(build_date(year, Some(month), Some(day)));
        }
    }

    let year = find_year(piece, config);
    let month = find_month(piece);
    let day = find_last_day(piece);

    let default_year = find_year(whole, config);
    let default_month = find_month(whole);

    match (year, month, day) {
        (Some(y), Some(m), d) => Some(build_date(y, Some(m), d)),
        (Some(y), None, Some(d)) => {
            // A day without a month is only usable with borrowed context.
            default_month.map_or(Some(PartialDate::year_only(y)), |m| {
                Some(build_date(y, Some(m), Some(d)))
            })
        }
        (Some(y), None, None) => Some(PartialDate::year_only(y)),
        (None, Some(m), d) => default_year.map(|y| build_date(y, Some(m), d)),
        (None, None, Some(d)) => match (default_year, default_month) {
            (Some(y), Some(m)) => Some(build_date(y, Some(m), Some(d))),
            _ => None,
        },
        (None, None, None) => None,
    }
}

/// Assembles a date, dropping a day that does not exist in the month
/// (an OCR "31 Nov" keeps the month, loses the day).
fn build_date(year: i32, month: Option<u32>, day: Option<u32>) -> PartialDate {
    let day = match (month, day) {
        (Some(m), Some(d)) => NaiveDate::from_ymd_opt(year, m, d).map(|_| d),
        _ => None,
    };
    PartialDate { year, month, day }
}

fn find_year(s: &str, config: &Config) -> Option<i32> {
    YEAR_RE
        .captures_iter(s)
        .filter_map(|c| c[1].parse::<i32>().ok())
        .find(|&y| config.year_in_window(y))
}

fn find_month(s: &str) -> Option<u32> {
    let captures = MONTH_RE.captures(s)?;
    let name = captures[1].to_lowercase();
    let month = match &name[..3] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// The last standalone one-or-two-digit token; four-digit years never match
/// because of the word boundaries.
fn find_last_day(s: &str) -> Option<u32> {
    DAY_RE
        .captures_iter(s)
        .last()
        .and_then(|c| c[1].parse().ok())
}

#[cfg(test)]
#[allow(clippy::inconsistent_digit_grouping)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn config() -> Config {
        Config::default()
    }

    fn normalize_one(raw: &str) -> NormalizedDateRange {
        normalize(Some(raw), None, &config())
    }

    #[test]
    fn year_range_resolves_both_ends() {
        let range = normalize_one("1910-1915");
        assert_eq!(range.start_formatted().as_deref(), Some("1910"));
        assert_eq!(range.end_formatted().as_deref(), Some("1915"));
        assert!(!range.start_complete());
        assert!(!range.end_complete());
        assert!(range.start_sortable().unwrap() < range.end_sortable().unwrap());
    }

    #[test]
    fn shared_month_year_day_span() {
        let range = normalize_one("14-15 Oct 1839");
        assert_eq!(range.start_formatted().as_deref(), Some("1839-10-14"));
        assert_eq!(range.end_formatted().as_deref(), Some("1839-10-15"));
        assert!(range.start_complete());
        assert!(range.end_complete());
    }

    #[test]
    fn day_span_with_leading_year() {
        let range = normalize_one("1839, 14-15 Oct.");
        assert_eq!(range.start_formatted().as_deref(), Some("1839-10-14"));
        assert_eq!(range.end_formatted().as_deref(), Some("1839-10-15"));
    }

    #[test]
    fn single_year_mirrors() {
        let range = normalize_one("1915");
        assert_eq!(range.start_formatted().as_deref(), Some("1915"));
        assert_eq!(range.end_formatted().as_deref(), Some("1915"));
        // Floor and ceiling keys differ even though both ends mirror.
        assert_eq!(range.start_sortable(), Some(1915_01_01));
        assert_eq!(range.end_sortable(), Some(1915_12_31));
    }

    #[test]
    fn month_year_units() {
        let range = normalize_one("Oct 1915");
        assert_eq!(range.start_formatted().as_deref(), Some("1915-10"));
        assert_eq!(range.start_sortable(), Some(1915_10_01));
        assert_eq!(range.end_sortable(), Some(1915_10_31));
        assert!(!range.start_complete());
    }

    #[test]
    fn end_month_length_is_calendar_aware() {
        let range = normalize_one("Feb 1904");
        assert_eq!(range.end_sortable(), Some(1904_02_29));

        let range = normalize_one("Feb 1905");
        assert_eq!(range.end_sortable(), Some(1905_02_28));
    }

    #[test]
    fn full_single_date() {
        let range = normalize_one("14 Oct 1839");
        assert_eq!(range.start_formatted().as_deref(), Some("1839-10-14"));
        assert_eq!(range.end_formatted().as_deref(), Some("1839-10-14"));
        assert!(range.start_complete());
        assert!(range.end_complete());
    }

    #[test]
    fn numeric_date_is_day_first() {
        let range = normalize_one("14/10/1839");
        assert_eq!(range.start_formatted().as_deref(), Some("1839-10-14"));
        assert!(range.start_complete());
    }

    #[test]
    fn year_borrowed_across_range() {
        let range = normalize_one("Oct 1914 - Dec");
        assert_eq!(range.start_formatted().as_deref(), Some("1914-10"));
        assert_eq!(range.end_formatted().as_deref(), Some("1914-12"));
    }

    #[test_case(""; "empty")]
    #[test_case("no date"; "no date marker")]
    #[test_case("n.d."; "nd marker")]
    #[test_case("undated correspondence"; "free text")]
    fn unrecoverable_text_leaves_both_ends_unset(raw: &str) {
        let range = normalize_one(raw);
        assert!(range.is_empty());
        assert!(!range.start_complete());
        assert!(!range.end_complete());
    }

    #[test]
    fn dangling_dash_leaves_end_open() {
        let range = normalize_one("1910-");
        assert_eq!(range.start_formatted().as_deref(), Some("1910"));
        assert_eq!(range.end, None);
        assert!(!range.swapped);
    }

    #[test]
    fn explicit_end_side_is_resolved_independently() {
        let range = normalize(Some("1910"), Some("Oct 1912"), &config());
        assert_eq!(range.start_formatted().as_deref(), Some("1910"));
        assert_eq!(range.end_formatted().as_deref(), Some("1912-10"));
    }

    #[test]
    fn no_date_marker_in_end_column_leaves_end_open() {
        let range = normalize(Some("1910"), Some("n.d."), &config());
        assert_eq!(range.start_formatted().as_deref(), Some("1910"));
        assert_eq!(range.end, None);
        assert!(!range.swapped);
    }

    #[test]
    fn no_date_marker_in_start_column_leaves_start_open() {
        let range = normalize(Some("no date"), Some("1912"), &config());
        assert_eq!(range.start, None);
        assert_eq!(range.end_formatted().as_deref(), Some("1912"));
    }

    #[test]
    fn end_only_mirrors_onto_start() {
        let range = normalize(None, Some("1912"), &config());
        assert_eq!(range.start_formatted().as_deref(), Some("1912"));
        assert_eq!(range.end_formatted().as_deref(), Some("1912"));
    }

    #[test]
    fn reversed_range_is_swapped_and_marked() {
        let range = normalize_one("1915-1910");
        assert!(range.swapped);
        assert_eq!(range.start_formatted().as_deref(), Some("1910"));
        assert_eq!(range.end_formatted().as_deref(), Some("1915"));
        assert!(range.end_sortable().unwrap() >= range.start_sortable().unwrap());
    }

    #[test]
    fn semicolon_list_uses_first_date() {
        let range = normalize_one("1910; 1920; 1930");
        assert_eq!(range.start_formatted().as_deref(), Some("1910"));
        assert_eq!(range.end_formatted().as_deref(), Some("1910"));
    }

    #[test]
    fn to_connector_splits_range() {
        let range = normalize_one("1812 to 1815");
        assert_eq!(range.start_formatted().as_deref(), Some("1812"));
        assert_eq!(range.end_formatted().as_deref(), Some("1815"));
    }

    #[test]
    fn years_outside_window_are_ignored() {
        let range = normalize_one("item 4923");
        assert!(range.is_empty());
    }

    #[test]
    fn invalid_day_keeps_the_month() {
        let range = normalize_one("31 Nov 1910");
        assert_eq!(range.start_formatted().as_deref(), Some("1910-11"));
        assert!(!range.start_complete());
    }

    #[test]
    fn sortable_keys_total_order_partial_against_complete() {
        let year = normalize_one("1915");
        let full = normalize_one("14 Oct 1915");
        assert!(year.start_sortable().unwrap() < full.start_sortable().unwrap());
        assert!(year.end_sortable().unwrap() > full.end_sortable().unwrap());
    }

    #[test_case("14 Oct 1839", "1839-10-14", true; "complete date")]
    #[test_case("Oct 1839", "1839-10-01", false; "month year floors the day")]
    #[test_case("1839", "1839-01-01", false; "bare year floors both")]
    #[test_case("14 Oct 1839 - 2 Jan 1840", "1839-10-14", true; "range uses left side")]
    #[test_case("1839 to 1850", "1839-01-01", false; "to range uses left side")]
    #[test_case("14/10/1839", "1839-10-14", true; "numeric date")]
    fn date_key_left_segment(raw: &str, sortable: &str, complete: bool) {
        let key = date_key(Some(raw), &config());
        assert_eq!(key.sortable, sortable);
        assert_eq!(key.complete, complete);
    }

    #[test_case(None; "missing")]
    #[test_case(Some(""); "empty")]
    #[test_case(Some("no date"); "marker")]
    #[test_case(Some("1910-"); "dangling dash")]
    fn date_key_sentinel_for_undated(raw: Option<&str>) {
        let key = date_key(raw, &config());
        assert_eq!(key.sortable, UNDATED_SENTINEL);
        assert!(!key.complete);
    }

    #[test]
    fn em_dash_and_en_dash_split_ranges() {
        let range = normalize_one("1910–1915");
        assert_eq!(range.start_formatted().as_deref(), Some("1910"));
        assert_eq!(range.end_formatted().as_deref(), Some("1915"));
    }
}
