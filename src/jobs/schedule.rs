//! Next-run arithmetic

use crate::jobs::{CrawlJob, JobError, JobStatus, ScheduleType};
use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

/// Parses an `HH:MM` time of day
pub fn parse_schedule_time(value: &str) -> Result<NaiveTime, JobError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| JobError::InvalidScheduleTime(value.to_string()))
}

/// First run of a newly created job
///
/// Daily and weekly jobs run at the next occurrence of their time of day,
/// today if it is still ahead, otherwise tomorrow. Hourly jobs run an hour
/// from now. Manual jobs are never scheduled.
pub fn first_run(
    schedule_type: ScheduleType,
    schedule_time: &str,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    match schedule_type {
        ScheduleType::Daily | ScheduleType::Weekly => {
            let time = parse_schedule_time(schedule_time).ok()?;
            let today = now.date().and_time(time);
            if today > now {
                Some(today)
            } else {
                Some((now.date() + Duration::days(1)).and_time(time))
            }
        }
        ScheduleType::Hourly => Some(next_hour(now)),
        ScheduleType::Manual => None,
    }
}

/// Next run after a recurring job finished at `now`
///
/// Daily jobs move to tomorrow at their time of day and weekly jobs to the
/// same day next week; hourly jobs run an hour later. Returns None for manual
/// jobs or an unparseable time of day.
pub fn next_run_after(
    schedule_type: ScheduleType,
    schedule_time: &str,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let days = match schedule_type {
        ScheduleType::Daily => 1,
        ScheduleType::Weekly => 7,
        ScheduleType::Hourly => return Some(next_hour(now)),
        ScheduleType::Manual => return None,
    };
    let time = parse_schedule_time(schedule_time).ok()?;
    Some((now.date() + Duration::days(days)).and_time(time))
}

/// True if the scheduler should start the job at `now`
pub fn is_due(job: &CrawlJob, now: NaiveDateTime) -> bool {
    job.status == JobStatus::Scheduled && job.next_run.map_or(false, |next| next <= now)
}

fn next_hour(now: NaiveDateTime) -> NaiveDateTime {
    let truncated = now
        .with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .unwrap_or(now);
    truncated + Duration::hours(1)
}
