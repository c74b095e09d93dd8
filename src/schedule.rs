use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use time::{Date, OffsetDateTime, Time};

use crate::error::{AuraRelayError, Result};

/// Default heartbeat window: top of every hour from 10:00 to 18:00, every day.
pub const DEFAULT_HEARTBEAT_SCHEDULE: &str = "0 0 10-18 * * *";

// Give up looking for a matching date after four years (covers Feb 29).
const MAX_SEARCH_DAYS: u32 = 366 * 4 + 1;

#[derive(Debug, Clone)]
pub enum Schedule {
    Interval(Duration),
    Cron(CronSchedule),
}

impl Schedule {
    /// First run strictly after `after`, or `None` if the schedule never fires
    /// again.
    pub fn next_run(&self, after: OffsetDateTime) -> Option<OffsetDateTime> {
        match self {
            Schedule::Interval(interval) => {
                after.checked_add(time::Duration::try_from(*interval).ok()?)
            }
            Schedule::Cron(cron) => cron.next_after(after),
        }
    }

    /// Time to wait from `now` until the next run.
    pub fn next_delay(&self, now: OffsetDateTime) -> Option<Duration> {
        let next = self.next_run(now)?;
        Duration::try_from(next - now).ok()
    }
}

/// Six-field cron expression: `sec min hour day-of-month month day-of-week`.
///
/// Each field accepts `*`, a number, a range `a-b`, a step `*/n` or `a-b/n`,
/// and comma separated lists of those. Day-of-week counts from Sunday = 0
/// (7 is also Sunday). When both day fields are restricted a date matches if
/// either does, as in classic cron.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    source: String,
    seconds: u64,
    minutes: u64,
    hours: u64,
    days_of_month: u64,
    months: u64,
    days_of_week: u64,
    dom_any: bool,
    dow_any: bool,
}

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(AuraRelayError::Config(format!(
                "cron expression '{expr}' must have 6 fields, found {}",
                fields.len()
            )));
        }

        let mut days_of_week = parse_field(fields[5], 0, 7)?;
        if days_of_week & (1 << 7) != 0 {
            days_of_week = (days_of_week & !(1 << 7)) | 1;
        }

        Ok(Self {
            source: fields.join(" "),
            seconds: parse_field(fields[0], 0, 59)?,
            minutes: parse_field(fields[1], 0, 59)?,
            hours: parse_field(fields[2], 0, 23)?,
            days_of_month: parse_field(fields[3], 1, 31)?,
            months: parse_field(fields[4], 1, 12)?,
            days_of_week,
            dom_any: fields[3] == "*",
            dow_any: fields[5] == "*",
        })
    }

    /// First instant strictly after `after` that matches, in `after`'s offset.
    pub fn next_after(&self, after: OffsetDateTime) -> Option<OffsetDateTime> {
        let start = after.replace_nanosecond(0).ok()? + time::Duration::seconds(1);
        let mut date = start.date();
        let mut floor = start.time();

        for _ in 0..MAX_SEARCH_DAYS {
            if self.matches_date(date) {
                if let Some(time) = self.first_time_from(floor) {
                    return Some(date.with_time(time).assume_offset(after.offset()));
                }
            }
            date = date.next_day()?;
            floor = Time::MIDNIGHT;
        }
        None
    }

    /// The next `count` fire times after `after`.
    pub fn upcoming(&self, after: OffsetDateTime, count: usize) -> Vec<OffsetDateTime> {
        let mut out = Vec::with_capacity(count);
        let mut cursor = after;
        while out.len() < count {
            match self.next_after(cursor) {
                Some(next) => {
                    out.push(next);
                    cursor = next;
                }
                None => break,
            }
        }
        out
    }

    fn matches_date(&self, date: Date) -> bool {
        if !has(self.months, u8::from(date.month())) {
            return false;
        }
        let dom = has(self.days_of_month, date.day());
        let dow = has(
            self.days_of_week,
            date.weekday().number_days_from_sunday(),
        );
        match (self.dom_any, self.dow_any) {
            (true, true) => true,
            (true, false) => dow,
            (false, true) => dom,
            (false, false) => dom || dow,
        }
    }

    fn first_time_from(&self, floor: Time) -> Option<Time> {
        for hour in floor.hour()..24 {
            if !has(self.hours, hour) {
                continue;
            }
            let min_start = if hour == floor.hour() { floor.minute() } else { 0 };
            for minute in min_start..60 {
                if !has(self.minutes, minute) {
                    continue;
                }
                let sec_start = if hour == floor.hour() && minute == floor.minute() {
                    floor.second()
                } else {
                    0
                };
                if let Some(second) = (sec_start..60).find(|s| has(self.seconds, *s)) {
                    return Time::from_hms(hour, minute, second).ok();
                }
            }
        }
        None
    }
}

impl FromStr for CronSchedule {
    type Err = AuraRelayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn has(mask: u64, value: u8) -> bool {
    mask & (1u64 << value) != 0
}

fn parse_field(field: &str, min: u8, max: u8) -> Result<u64> {
    let mut mask = 0u64;
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: u8 = step
                    .parse()
                    .map_err(|_| invalid(field, "step is not a number"))?;
                if step == 0 {
                    return Err(invalid(field, "step must be positive"));
                }
                (range, step)
            }
            None => (part, 1),
        };

        let (lo, hi) = if range == "*" {
            (min, max)
        } else if let Some((lo, hi)) = range.split_once('-') {
            (parse_bound(field, lo)?, parse_bound(field, hi)?)
        } else {
            let value = parse_bound(field, range)?;
            // `5/15` means "from 5 to the end in steps of 15".
            if step > 1 {
                (value, max)
            } else {
                (value, value)
            }
        };

        if lo < min || hi > max || lo > hi {
            return Err(invalid(field, &format!("values must lie within {min}-{max}")));
        }
        let mut value = lo;
        while value <= hi {
            mask |= 1u64 << value;
            value = match value.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    }
    Ok(mask)
}

fn parse_bound(field: &str, raw: &str) -> Result<u8> {
    raw.parse()
        .map_err(|_| invalid(field, &format!("'{raw}' is not a number")))
}

fn invalid(field: &str, reason: &str) -> AuraRelayError {
    AuraRelayError::Config(format!("invalid cron field '{field}': {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn default_heartbeat_window() {
        let cron = CronSchedule::parse(DEFAULT_HEARTBEAT_SCHEDULE).unwrap();

        let next = cron.next_after(datetime!(2025-03-27 09:15:00 UTC)).unwrap();
        assert_eq!(next, datetime!(2025-03-27 10:00:00 UTC));

        let next = cron.next_after(datetime!(2025-03-27 10:00:00 UTC)).unwrap();
        assert_eq!(next, datetime!(2025-03-27 11:00:00 UTC));

        let next = cron.next_after(datetime!(2025-03-27 18:00:00 UTC)).unwrap();
        assert_eq!(next, datetime!(2025-03-28 10:00:00 UTC));

        let next = cron.next_after(datetime!(2025-12-31 23:59:59 UTC)).unwrap();
        assert_eq!(next, datetime!(2026-01-01 10:00:00 UTC));
    }

    #[test]
    fn upcoming_covers_nine_runs_per_day() {
        let cron = CronSchedule::parse(DEFAULT_HEARTBEAT_SCHEDULE).unwrap();
        let runs = cron.upcoming(datetime!(2025-03-27 00:00:00 UTC), 10);
        assert_eq!(runs.len(), 10);
        assert_eq!(runs[8], datetime!(2025-03-27 18:00:00 UTC));
        assert_eq!(runs[9], datetime!(2025-03-28 10:00:00 UTC));
    }

    #[test]
    fn steps_lists_and_weekdays() {
        let cron = CronSchedule::parse("*/30 5,10 * * * 1-5").unwrap();
        // 2025-03-29 is a Saturday.
        let next = cron.next_after(datetime!(2025-03-29 12:00:00 UTC)).unwrap();
        assert_eq!(next, datetime!(2025-03-31 00:05:00 UTC));
        let next = cron.next_after(next).unwrap();
        assert_eq!(next, datetime!(2025-03-31 00:05:30 UTC));

        let sunday = CronSchedule::parse("0 0 12 * * 7").unwrap();
        let next = sunday.next_after(datetime!(2025-03-27 00:00:00 UTC)).unwrap();
        assert_eq!(next, datetime!(2025-03-30 12:00:00 UTC));
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert!(CronSchedule::parse("0 0 10-18 * *").is_err());
        assert!(CronSchedule::parse("0 0 25 * * *").is_err());
        assert!(CronSchedule::parse("0 0 18-10 * * *").is_err());
        assert!(CronSchedule::parse("0 */0 * * * *").is_err());
        assert!("x 0 * * * *".parse::<CronSchedule>().is_err());
    }

    #[test]
    fn cron_delay_is_relative_to_now() {
        let schedule = Schedule::Cron(CronSchedule::parse(DEFAULT_HEARTBEAT_SCHEDULE).unwrap());
        let delay = schedule
            .next_delay(datetime!(2025-03-27 09:59:30 UTC))
            .unwrap();
        assert_eq!(delay, Duration::from_secs(30));

        let interval = Schedule::Interval(Duration::from_millis(10));
        assert_eq!(
            interval.next_delay(datetime!(2025-03-27 09:59:30 UTC)),
            Some(Duration::from_millis(10))
        );
    }
}
