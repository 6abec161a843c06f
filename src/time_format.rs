use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};

pub const MISSING_DATE: &str = "N/A";
pub const INVALID_DATE: &str = "Invalid date";

/// How hard the UI should shout about a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    None,
    Low,
    Medium,
    High,
    Critical,
    Expired,
}

#[derive(Debug, Clone)]
pub struct DeadlineDisplay {
    pub label: String,
    pub urgency: Urgency,
}

/// Parses the backend's ISO-8601 UTC strings. Lenient about a trailing `Z`,
/// fractional seconds and missing seconds; anything else is rejected.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    let naive = trimmed.trim_end_matches('Z').replace(' ', "T");
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&naive, format) {
            return Some(Utc.from_utc_datetime(&parsed));
        }
    }
    None
}

/// Kickoff rendered the way the fixture list shows it: "Today at 3:00 PM",
/// "Tomorrow at 7:30 PM", a weekday name for 2-6 days out, a full date
/// beyond that. Past kickoffs fall through to the full date.
pub fn format_kickoff_time(raw: &str, now: DateTime<Utc>) -> String {
    format_kickoff_time_with_offset(raw, now, local_offset(now))
}

pub fn format_kickoff_time_with_offset(
    raw: &str,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> String {
    if raw.trim().is_empty() {
        return MISSING_DATE.to_string();
    }
    let Some(kickoff) = parse_utc(raw) else {
        return INVALID_DATE.to_string();
    };

    let kickoff_local = kickoff.with_timezone(&offset);
    let now_local = now.with_timezone(&offset);
    let time = kickoff_local.format("%-I:%M %p");

    let day_diff = kickoff_local
        .date_naive()
        .signed_duration_since(now_local.date_naive())
        .num_days();

    match day_diff {
        0 => format!("Today at {time}"),
        1 => format!("Tomorrow at {time}"),
        2..=6 => format!("{} at {time}", kickoff_local.format("%A")),
        _ => format!("{} at {time}", kickoff_local.format("%-d %b %Y")),
    }
}

/// Deadline countdown and its urgency bucket. Thresholds are presentational:
/// expired at or past the deadline, critical inside an hour, high inside
/// six, medium inside a day, low beyond that.
pub fn format_deadline_time(raw: &str, now: DateTime<Utc>) -> DeadlineDisplay {
    let Some(deadline) = parse_utc(raw) else {
        let label = if raw.trim().is_empty() {
            MISSING_DATE
        } else {
            INVALID_DATE
        };
        return DeadlineDisplay {
            label: label.to_string(),
            urgency: Urgency::None,
        };
    };

    let remaining = deadline.signed_duration_since(now);
    let seconds = remaining.num_seconds();
    if seconds <= 0 {
        return DeadlineDisplay {
            label: "Deadline passed".to_string(),
            urgency: Urgency::Expired,
        };
    }

    let minutes = remaining.num_minutes();
    let hours = remaining.num_hours();
    let urgency = if seconds <= 3_600 {
        Urgency::Critical
    } else if seconds <= 6 * 3_600 {
        Urgency::High
    } else if seconds <= 24 * 3_600 {
        Urgency::Medium
    } else {
        Urgency::Low
    };

    let label = if minutes < 60 {
        format!("{} min left", minutes.max(1))
    } else if hours < 24 {
        format!("{}h {}m left", hours, minutes - hours * 60)
    } else {
        let days = remaining.num_days();
        format!("{}d {}h left", days, hours - days * 24)
    };

    DeadlineDisplay { label, urgency }
}

fn local_offset(now: DateTime<Utc>) -> FixedOffset {
    Local.offset_from_utc_datetime(&now.naive_utc()).fix()
}
