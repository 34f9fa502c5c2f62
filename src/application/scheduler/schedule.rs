//! Next-run-time computation for the three `CronSchedule` variants. The
//! cron parser is hand-rolled: nothing in the dependency stack parses
//! cron expressions.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

use crate::domain::cron_job::CronSchedule;

const MAX_DAY_SEARCH: i64 = 366 * 4;

/// Computes the next run time in epoch millis. For `At`, an already-passed
/// deadline is reported as `-1` (a sentinel distinct from any
/// real future timestamp, but still `<= now` so the tick loop's catch-up
/// step still fires it).
pub fn next_run_at_ms(schedule: &CronSchedule, now_ms: i64) -> i64 {
    match schedule {
        CronSchedule::At { at_ms } => {
            if *at_ms > now_ms { *at_ms } else { -1 }
        }
        CronSchedule::Every {
            period_ms,
            anchor_ms,
        } => {
            if *period_ms <= 0 {
                return -1;
            }
            let anchor = anchor_ms.unwrap_or(0);
            let elapsed_periods = (now_ms - anchor) / period_ms + 1;
            anchor + elapsed_periods * period_ms
        }
        CronSchedule::Cron { expr, .. } => match parse_cron(expr) {
            Some(fields) => next_cron_occurrence(&fields, now_ms),
            None => now_ms + 60_000,
        },
    }
}

#[derive(Debug, Clone, Copy)]
struct CronFields {
    minute: Option<u32>,
    hour: Option<u32>,
    day_of_month: Option<u32>,
    month: Option<u32>,
    day_of_week: Option<u32>,
}

/// Parses `m h dom mon dow`; each field is `*` or a single non-negative
/// integer. Ranges/steps are not supported (documented minimum per spec
/// §4.E); any other shape is treated as unparseable.
fn parse_cron(expr: &str) -> Option<CronFields> {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    if parts.len() != 5 {
        return None;
    }

    let field = |s: &str| -> Option<Option<u32>> {
        if s == "*" {
            Some(None)
        } else {
            s.parse::<u32>().ok().map(Some)
        }
    };

    Some(CronFields {
        minute: field(parts[0])?,
        hour: field(parts[1])?,
        day_of_month: field(parts[2])?,
        month: field(parts[3])?,
        day_of_week: field(parts[4])?,
    })
}

fn date_matches(fields: &CronFields, date: chrono::NaiveDate) -> bool {
    fields.day_of_month.is_none_or(|d| d == date.day())
        && fields.month.is_none_or(|m| m == date.month())
        && fields
            .day_of_week
            .is_none_or(|d| d == date.weekday().num_days_from_sunday())
}

/// Earliest (hour, minute) on a day matching `fields.hour`/`fields.minute`
/// that is strictly after `after`, or from midnight if `after` is `None`
/// (used once the search has moved past the current day). Returns `None`
/// when no matching time remains before midnight — the caller then advances
/// to the next day and retries with `after = None`.
fn earliest_matching_time(fields: &CronFields, after: Option<(u32, u32)>) -> Option<(u32, u32)> {
    match (fields.hour, fields.minute) {
        (Some(h), Some(m)) => match after {
            None => Some((h, m)),
            Some(a) => ((h, m) > a).then_some((h, m)),
        },
        (Some(h), None) => match after {
            None => Some((h, 0)),
            Some((ah, am)) => {
                if h > ah {
                    Some((h, 0))
                } else if h == ah && am < 59 {
                    Some((h, am + 1))
                } else {
                    None
                }
            }
        },
        (None, Some(m)) => match after {
            None => Some((0, m)),
            Some((ah, am)) => {
                if m > am && ah <= 23 {
                    Some((ah, m))
                } else if ah < 23 {
                    Some((ah + 1, m))
                } else {
                    None
                }
            }
        },
        (None, None) => match after {
            None => Some((0, 0)),
            Some((ah, am)) => {
                if am < 59 {
                    Some((ah, am + 1))
                } else if ah < 23 {
                    Some((ah + 1, 0))
                } else {
                    None
                }
            }
        },
    }
}

fn next_cron_occurrence(fields: &CronFields, now_ms: i64) -> i64 {
    let now = DateTime::from_timestamp_millis(now_ms).unwrap_or_else(Utc::now);

    let mut date = now.date_naive();
    let mut after = Some((now.hour(), now.minute()));

    for _ in 0..=MAX_DAY_SEARCH {
        if date_matches(fields, date) {
            if let Some((hour, minute)) = earliest_matching_time(fields, after) {
                if let chrono::LocalResult::Single(dt) =
                    Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), hour, minute, 0)
                {
                    return dt.timestamp_millis();
                }
            }
        }
        date = date.succ_opt().unwrap_or(date);
        after = None;
    }

    now_ms + 60_000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap().timestamp_millis()
    }

    #[test]
    fn at_schedule_reports_future_timestamp() {
        let sched = CronSchedule::At {
            at_ms: at(2026, 8, 1, 0, 0),
        };
        assert_eq!(
            next_run_at_ms(&sched, at(2026, 7, 28, 0, 0)),
            at(2026, 8, 1, 0, 0)
        );
    }

    #[test]
    fn at_schedule_reports_sentinel_when_passed() {
        let sched = CronSchedule::At {
            at_ms: at(2026, 7, 1, 0, 0),
        };
        assert_eq!(next_run_at_ms(&sched, at(2026, 7, 28, 0, 0)), -1);
    }

    #[test]
    fn every_schedule_is_monotonic_and_period_spaced() {
        let sched = CronSchedule::Every {
            period_ms: 30_000,
            anchor_ms: None,
        };
        let t0 = at(2026, 7, 28, 0, 0);
        let r1 = next_run_at_ms(&sched, t0);
        let r2 = next_run_at_ms(&sched, r1);
        let r3 = next_run_at_ms(&sched, r2);
        assert!(r1 > t0);
        assert_eq!(r2 - r1, 30_000);
        assert_eq!(r3 - r2, 30_000);
    }

    #[test]
    fn every_star_cron_fires_each_minute() {
        let sched = CronSchedule::Cron {
            expr: "* * * * *".to_string(),
            tz: None,
        };
        let now = at(2026, 7, 28, 10, 30);
        let next = next_run_at_ms(&sched, now);
        assert_eq!(next, now + 60_000);
    }

    #[test]
    fn fixed_hour_minute_cron_targets_next_occurrence() {
        let sched = CronSchedule::Cron {
            expr: "0 9 * * *".to_string(),
            tz: None,
        };
        let now = at(2026, 7, 28, 10, 0);
        let next = next_run_at_ms(&sched, now);
        assert_eq!(next, at(2026, 7, 29, 9, 0));
    }

    #[test]
    fn unparseable_cron_falls_back_to_next_minute() {
        let sched = CronSchedule::Cron {
            expr: "garbage".to_string(),
            tz: None,
        };
        let now = at(2026, 7, 28, 10, 0);
        assert_eq!(next_run_at_ms(&sched, now), now + 60_000);
    }
}
