//! Turns section rows into Google Calendar recurring-event payloads

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::sections::SectionRecord;

/// Timezone the source database's dates and times are expressed in
pub const SOURCE_TIMEZONE: Tz = New_York;

/// RFC 5545 weekday abbreviations keyed by the registrar's day codes
/// https://tools.ietf.org/html/rfc5545#section-3.3.10
const RFC5545_DAYS: [(char, &str); 7] = [
    ('U', "SU"),
    ('M', "MO"),
    ('T', "TU"),
    ('W', "WE"),
    ('R', "TH"),
    ('F', "FR"),
    ('S', "SA"),
];

/// Event boundary as the Calendar API expects it: a UTC instant for
/// transport plus the timezone the event should display in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: DateTime<Utc>,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub recurrence: Vec<String>,
    pub location: String,
    pub description: String,
    pub summary: String,
}

fn rfc5545_day(code: char) -> Result<&'static str> {
    RFC5545_DAYS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, day)| *day)
        .ok_or_else(|| anyhow!("Unrecognized day code '{}'", code))
}

/// Weekly recurrence rule with one BYDAY entry per input character, kept
/// in input order, bounded by the UTC instant of the last occurrence
pub fn weekly_rrule(days: &str, until: DateTime<Utc>) -> Result<String> {
    let by_day = days
        .chars()
        .map(rfc5545_day)
        .collect::<Result<Vec<_>>>()?
        .join(",");
    Ok(format!(
        "RRULE:FREQ=WEEKLY;BYDAY={};UNTIL={}",
        by_day,
        until.format("%Y%m%dT%H%M%SZ")
    ))
}

/// Interpret "YYYY-MM-DD" + "HH:MM" as Eastern wall-clock time and
/// convert to UTC using the IANA rules in force on that date, so dates on
/// either side of a DST transition come out right.
pub fn to_utc(date: &str, time: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M")
        .with_context(|| format!("Invalid date/time '{} {}'", date, time))?;
    let local = SOURCE_TIMEZONE
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| {
            anyhow!(
                "Local time '{} {}' does not exist or is ambiguous in {}",
                date,
                time,
                SOURCE_TIMEZONE
            )
        })?;
    Ok(local.with_timezone(&Utc))
}

pub fn format_event(section: &SectionRecord) -> Result<EventPayload> {
    let start = to_utc(&section.start_date, &section.start_time)?;
    let end = to_utc(&section.start_date, &section.end_time)?;
    // The last occurrence ends at endDate + endTime
    let until = to_utc(&section.end_date, &section.end_time)?;

    Ok(EventPayload {
        start: EventDateTime {
            date_time: start,
            time_zone: SOURCE_TIMEZONE.name().to_string(),
        },
        end: EventDateTime {
            date_time: end,
            time_zone: SOURCE_TIMEZONE.name().to_string(),
        },
        recurrence: vec![weekly_rrule(&section.days, until)?],
        location: section.location.clone(),
        description: section.title.clone(),
        summary: format!("{} {}", section.department, section.code),
    })
}

/// Format every section, aborting on the first bad record rather than
/// silently dropping it
pub fn format_events(sections: &[SectionRecord]) -> Result<Vec<EventPayload>> {
    sections.iter().map(format_event).collect()
}
