//! Timezone resolution and timestamp construction.
//!
//! A [`TimeZoneSpec`] is resolved once per run into a [`ResolvedZone`],
//! which is then threaded explicitly into every timestamp built for that
//! run. Resolution order:
//!
//! 1. empty / `local` / `none` selects the process's local zone
//! 2. exact IANA name (`chrono-tz`)
//! 3. secondary resolver: case-insensitive IANA name, common abbreviation,
//!    or numeric UTC offset
//! 4. the local zone's own abbreviation falls back to local
//! 5. otherwise [`ScheduleError::UnknownTimeZone`]

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScheduleError;
use crate::window::ClockTime;

/// Which zone timestamps should be expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimeZoneSpec {
    /// The process's local zone.
    #[default]
    Local,
    /// A zone name, abbreviation or offset to resolve.
    Named(String),
}

impl TimeZoneSpec {
    /// Interpret user input. Blank, `local` and `none` mean local.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("local")
            || trimmed.eq_ignore_ascii_case("none")
        {
            Self::Local
        } else {
            Self::Named(trimmed.to_string())
        }
    }
}

impl From<&str> for TimeZoneSpec {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for TimeZoneSpec {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<TimeZoneSpec> for String {
    fn from(value: TimeZoneSpec) -> Self {
        match value {
            TimeZoneSpec::Local => String::new(),
            TimeZoneSpec::Named(name) => name,
        }
    }
}

/// A zone fixed for the duration of one scheduling run.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedZone {
    Local,
    Named(Tz),
    Fixed { name: String, offset: FixedOffset },
}

impl ResolvedZone {
    pub fn name(&self) -> String {
        match self {
            Self::Local => "local".to_string(),
            Self::Named(tz) => tz.name().to_string(),
            Self::Fixed { name, .. } => name.clone(),
        }
    }

    /// Attach this zone to a naive local date-time.
    ///
    /// Ambiguous times (clocks turned back) take the later, standard-time
    /// instant. Times inside a spring-forward gap map to the first instant
    /// after the transition, so later wall-clock times never resolve to
    /// earlier instants.
    pub fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>, ScheduleError> {
        match self {
            Self::Local => localize_in(&Local, naive, self),
            Self::Named(tz) => localize_in(tz, naive, self),
            Self::Fixed { offset, .. } => localize_in(offset, naive, self),
        }
    }
}

impl fmt::Display for ResolvedZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Longest spring-forward gap searched, in minutes.
const MAX_GAP_MINUTES: i64 = 3 * 60;

fn localize_in<Z: TimeZone>(
    zone: &Z,
    naive: NaiveDateTime,
    resolved: &ResolvedZone,
) -> Result<DateTime<FixedOffset>, ScheduleError> {
    if let Some(dt) = zone.from_local_datetime(&naive).latest() {
        return Ok(dt.fixed_offset());
    }

    // Transitions happen on whole minutes: the first valid local minute
    // after `naive` is the transition instant itself.
    let Some(minute_start) = naive.with_second(0) else {
        return Err(nonexistent(naive, resolved));
    };
    for step in 1..=MAX_GAP_MINUTES {
        let probe = minute_start + Duration::minutes(step);
        if let Some(after) = zone.from_local_datetime(&probe).earliest() {
            return Ok(after.fixed_offset());
        }
    }

    Err(nonexistent(naive, resolved))
}

fn nonexistent(naive: NaiveDateTime, resolved: &ResolvedZone) -> ScheduleError {
    ScheduleError::NonexistentLocalTime {
        datetime: naive.to_string(),
        zone: resolved.name(),
    }
}

/// Resolve a zone spec once for a run.
///
/// # Errors
/// [`ScheduleError::UnknownTimeZone`] when no resolver recognises the name.
pub fn resolve_zone(spec: &TimeZoneSpec) -> Result<ResolvedZone, ScheduleError> {
    let name = match spec {
        TimeZoneSpec::Local => return Ok(ResolvedZone::Local),
        TimeZoneSpec::Named(name) => name.as_str(),
    };

    if let Ok(tz) = name.parse::<Tz>() {
        return Ok(ResolvedZone::Named(tz));
    }

    if let Some(zone) = resolve_secondary(name) {
        return Ok(zone);
    }

    if is_local_abbreviation(name, &local_abbreviations()) {
        return Ok(ResolvedZone::Local);
    }

    Err(ScheduleError::UnknownTimeZone(name.to_string()))
}

fn resolve_secondary(name: &str) -> Option<ResolvedZone> {
    if let Ok(tz) = Tz::from_str_insensitive(name) {
        return Some(ResolvedZone::Named(tz));
    }

    let upper = name.to_ascii_uppercase();
    if let Some((_, secs)) = ABBREVIATIONS.iter().find(|(abbr, _)| *abbr == upper) {
        let offset = FixedOffset::east_opt(*secs)?;
        return Some(ResolvedZone::Fixed { name: upper, offset });
    }

    parse_utc_offset(name).map(|offset| ResolvedZone::Fixed {
        name: name.to_string(),
        offset,
    })
}

/// Abbreviations absent from the zone database, as fixed offsets (seconds east).
const ABBREVIATIONS: &[(&str, i32)] = &[
    ("PST", -8 * 3600),
    ("PDT", -7 * 3600),
    ("MDT", -6 * 3600),
    ("CST", -6 * 3600),
    ("CDT", -5 * 3600),
    ("EDT", -4 * 3600),
    ("AKST", -9 * 3600),
    ("AKDT", -8 * 3600),
    ("BRT", -3 * 3600),
    ("ART", -3 * 3600),
    ("BST", 3600),
    ("WEST", 3600),
    ("WAT", 3600),
    ("CEST", 2 * 3600),
    ("SAST", 2 * 3600),
    ("CAT", 2 * 3600),
    ("EEST", 3 * 3600),
    ("MSK", 3 * 3600),
    ("EAT", 3 * 3600),
    ("GST", 4 * 3600),
    ("PKT", 5 * 3600),
    ("IST", 5 * 3600 + 1800),
    ("NPT", 5 * 3600 + 2700),
    ("ICT", 7 * 3600),
    ("WIB", 7 * 3600),
    ("SGT", 8 * 3600),
    ("HKT", 8 * 3600),
    ("PHT", 8 * 3600),
    ("AWST", 8 * 3600),
    ("JST", 9 * 3600),
    ("KST", 9 * 3600),
    ("ACST", 9 * 3600 + 1800),
    ("AEST", 10 * 3600),
    ("AEDT", 11 * 3600),
    ("NZST", 12 * 3600),
    ("NZDT", 13 * 3600),
];

/// Parse `+05:30`, `-0300`, `+5`, `UTC+5`, `GMT-03:00`.
fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let mut rest = s.trim();
    if !rest.is_ascii() {
        return None;
    }
    for prefix in ["UTC", "GMT"] {
        if rest.get(..prefix.len()).is_some_and(|p| p.eq_ignore_ascii_case(prefix)) {
            rest = &rest[prefix.len()..];
            break;
        }
    }

    let sign = match rest.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits = &rest[1..];

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => (&digits[..2], &digits[2..]),
        None => (digits, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.is_empty() || minutes.len() > 2 {
        return None;
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Abbreviations the local zone answers to.
///
/// The system zone is looked up by IANA name and rendered through the zone
/// database, since `Local` only renders numeric offsets. The alphabetic
/// prefix of a POSIX `TZ` value such as `PKT-5` also counts.
fn local_abbreviations() -> Vec<String> {
    let mut names = Vec::new();
    let system_zone = iana_time_zone::get_timezone()
        .ok()
        .and_then(|iana| iana.parse::<Tz>().ok());
    if let Some(tz) = system_zone {
        names.extend(zone_abbreviations(tz, Utc::now()));
    }
    if let Ok(tz) = std::env::var("TZ") {
        let abbr: String = tz.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        if abbr.len() >= 3 && !names.contains(&abbr) {
            names.push(abbr);
        }
    }
    names
}

/// Alphabetic abbreviations `tz` uses now and in January and July of the
/// same year, covering both standard and daylight time.
fn zone_abbreviations(tz: Tz, now: DateTime<Utc>) -> Vec<String> {
    let probes = [1, 7]
        .into_iter()
        .filter_map(|month| Utc.with_ymd_and_hms(now.year(), month, 1, 12, 0, 0).single());

    let mut names: Vec<String> = Vec::new();
    for instant in std::iter::once(now).chain(probes) {
        let abbr = instant.with_timezone(&tz).format("%Z").to_string();
        if abbr.bytes().all(|b| b.is_ascii_alphabetic()) && !names.contains(&abbr) {
            names.push(abbr);
        }
    }
    names
}

fn is_local_abbreviation(name: &str, local: &[String]) -> bool {
    local.iter().any(|abbr| abbr.eq_ignore_ascii_case(name))
}

/// Build the timestamp for an allocator placement.
///
/// `seconds_into_day` counts from `daily_start`; the sum must stay inside
/// the calendar day, which any valid [`DayWindow`](crate::window::DayWindow)
/// guarantees.
pub fn resolve_timestamp(
    day: NaiveDate,
    seconds_into_day: u32,
    daily_start: ClockTime,
    zone: &ResolvedZone,
) -> Result<DateTime<FixedOffset>, ScheduleError> {
    let seconds_of_day = daily_start.seconds_from_midnight() + seconds_into_day;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds_of_day, 0).ok_or_else(|| {
        ScheduleError::InvalidTimeRange {
            start: daily_start.to_string(),
            end: format!("+{seconds_into_day}s"),
        }
    })?;
    zone.localize(day.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(s: &str) -> TimeZoneSpec {
        TimeZoneSpec::parse(s)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_local_sentinels() {
        for s in ["", "   ", "local", "LOCAL", "None"] {
            assert_eq!(TimeZoneSpec::parse(s), TimeZoneSpec::Local);
        }
        assert_eq!(resolve_zone(&TimeZoneSpec::Local).unwrap(), ResolvedZone::Local);
    }

    #[test]
    fn test_iana_names() {
        assert_eq!(resolve_zone(&named("UTC")).unwrap(), ResolvedZone::Named(Tz::UTC));
        assert_eq!(
            resolve_zone(&named("Asia/Karachi")).unwrap(),
            ResolvedZone::Named(Tz::Asia__Karachi)
        );
    }

    #[test]
    fn test_case_insensitive_names() {
        assert_eq!(
            resolve_zone(&named("europe/berlin")).unwrap(),
            ResolvedZone::Named(Tz::Europe__Berlin)
        );
    }

    #[test]
    fn test_abbreviations() {
        let zone = resolve_zone(&named("PKT")).unwrap();
        assert_eq!(
            zone,
            ResolvedZone::Fixed {
                name: "PKT".into(),
                offset: FixedOffset::east_opt(5 * 3600).unwrap()
            }
        );
        let zone = resolve_zone(&named("ist")).unwrap();
        assert_eq!(zone.name(), "IST");
    }

    #[test]
    fn test_numeric_offsets() {
        assert_eq!(parse_utc_offset("+05:30"), FixedOffset::east_opt(19_800));
        assert_eq!(parse_utc_offset("-0300"), FixedOffset::west_opt(10_800));
        assert_eq!(parse_utc_offset("UTC+5"), FixedOffset::east_opt(18_000));
        assert_eq!(parse_utc_offset("gmt-03:00"), FixedOffset::west_opt(10_800));
        assert_eq!(parse_utc_offset("+15"), None);
        assert_eq!(parse_utc_offset("05:00"), None);
        assert_eq!(parse_utc_offset("+5:xx"), None);
    }

    #[test]
    fn test_unknown_zone() {
        let err = resolve_zone(&named("Mars/Olympus_Mons")).unwrap_err();
        assert_eq!(err, ScheduleError::UnknownTimeZone("Mars/Olympus_Mons".into()));
    }

    #[test]
    fn test_resolve_timestamp_in_utc() {
        let zone = ResolvedZone::Named(Tz::UTC);
        let ts = resolve_timestamp(date(2024, 1, 1), 14_400, ClockTime::parse("09:00").unwrap(), &zone).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-01T13:00:00+00:00");
    }

    #[test]
    fn test_resolve_timestamp_splits_seconds() {
        let zone = ResolvedZone::Named(Tz::UTC);
        let ts = resolve_timestamp(date(2024, 1, 1), 3_725, ClockTime::parse("08:30").unwrap(), &zone).unwrap();
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (9, 32, 5));
    }

    #[test]
    fn test_named_zone_offset() {
        let zone = resolve_zone(&named("America/New_York")).unwrap();
        let winter = resolve_timestamp(date(2024, 1, 15), 0, ClockTime::parse("09:00").unwrap(), &zone).unwrap();
        let summer = resolve_timestamp(date(2024, 7, 15), 0, ClockTime::parse("09:00").unwrap(), &zone).unwrap();
        assert_eq!(winter.to_rfc3339(), "2024-01-15T09:00:00-05:00");
        assert_eq!(summer.to_rfc3339(), "2024-07-15T09:00:00-04:00");
    }

    #[test]
    fn test_spring_forward_gap_maps_to_transition() {
        let zone = ResolvedZone::Named(Tz::America__New_York);
        for (h, m, s) in [(2, 0, 0), (2, 30, 0), (2, 59, 59)] {
            let naive = date(2024, 3, 10).and_hms_opt(h, m, s).unwrap();
            let ts = zone.localize(naive).unwrap();
            assert_eq!(ts.to_rfc3339(), "2024-03-10T03:00:00-04:00");
        }
    }

    #[test]
    fn test_gap_never_overtakes_later_wall_clock_times() {
        let zone = ResolvedZone::Named(Tz::America__New_York);
        let day = date(2024, 3, 10);
        let stamps: Vec<_> = [(1, 59, 59), (2, 50, 0), (3, 0, 0), (3, 10, 0)]
            .into_iter()
            .map(|(h, m, s)| zone.localize(day.and_hms_opt(h, m, s).unwrap()).unwrap())
            .collect();
        assert!(stamps.windows(2).all(|pair| pair[0] <= pair[1]), "{stamps:?}");
    }

    #[test]
    fn test_fall_back_takes_standard_time_instant() {
        let zone = ResolvedZone::Named(Tz::America__New_York);
        let naive = date(2024, 11, 3).and_hms_opt(1, 30, 0).unwrap();
        let ts = zone.localize(naive).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-11-03T01:30:00-05:00");

        let before = zone.localize(date(2024, 11, 3).and_hms_opt(0, 59, 0).unwrap()).unwrap();
        assert!(before < ts);
    }

    #[test]
    fn test_zone_abbreviations_cover_standard_and_daylight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let karachi = zone_abbreviations(Tz::Asia__Karachi, now);
        assert_eq!(karachi, vec!["PKT".to_string()]);

        let chicago = zone_abbreviations(Tz::America__Chicago, now);
        assert!(chicago.contains(&"CST".to_string()));
        assert!(chicago.contains(&"CDT".to_string()));

        // numeric renderings are not abbreviations
        assert!(zone_abbreviations(Tz::Asia__Dubai, now).is_empty());
    }

    #[test]
    fn test_local_abbreviation_match_ignores_case() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let local = zone_abbreviations(Tz::America__Halifax, now);
        assert!(is_local_abbreviation("ast", &local));
        assert!(is_local_abbreviation("ADT", &local));
        assert!(!is_local_abbreviation("PKT", &local));
    }

    #[test]
    fn test_spec_serde_round_trip_through_string() {
        let json = serde_json::to_string(&TimeZoneSpec::Local).unwrap();
        assert_eq!(json, "\"\"");
        let spec: TimeZoneSpec = serde_json::from_str("\"Asia/Tokyo\"").unwrap();
        assert_eq!(spec, TimeZoneSpec::Named("Asia/Tokyo".into()));
    }
}
