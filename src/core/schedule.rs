//! Daily trigger times

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, Utc};
use std::fmt::Display;

/// Fires once a day at `at`, read as wall-clock time in `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
    offset: FixedOffset,
}

impl DailySchedule {
    pub fn new(at: NaiveTime, offset: FixedOffset) -> Self {
        Self { at, offset }
    }

    /// Parses `"HH:MM"` and a UTC offset such as `"+05:30"`, `"-04:00"` or `"Z"`.
    pub fn parse(time: &str, utc_offset: &str) -> Result<Self> {
        let at = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .with_context(|| format!("Invalid schedule time: {time}"))?;
        let offset = parse_offset(utc_offset)?;
        Ok(Self::new(at, offset))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// First trigger strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_date = now.with_timezone(&self.offset).date_naive();
        let local_trigger = local_date.and_time(self.at);
        let shift = TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        let candidate = (local_trigger - shift).and_utc();

        if candidate > now {
            candidate
        } else {
            candidate + TimeDelta::days(1)
        }
    }

    pub fn upcoming(&self, now: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        let mut triggers = Vec::with_capacity(count);
        let mut cursor = now;
        for _ in 0..count {
            cursor = self.next_after(cursor);
            triggers.push(cursor);
        }
        triggers
    }
}

impl Display for DailySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "daily at {} ({})", self.at.format("%H:%M"), self.offset)
    }
}

fn parse_offset(value: &str) -> Result<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| anyhow!("Invalid UTC offset: {value}"));
    }
    value
        .parse::<FixedOffset>()
        .map_err(|e| anyhow!("Invalid UTC offset: {value} ({e})"))
}
