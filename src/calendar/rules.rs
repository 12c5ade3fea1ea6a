//! Recurrence normalization and task-occurrence generation.
//!
//! [`normalize_recurrence`] validates and canonicalizes a rule;
//! [`generate_tasks`] expands a [`TaskSchedule`] over a [`GenerationWindow`]
//! into concrete [`CareTask`] occurrences ordered by due date.

use std::collections::HashSet;

use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use crate::calendar::dates::{
    days_between, days_in_month, format_date_only, month_index, parse_date_only, year_month,
};
use crate::calendar::types::{CareTask, GenerationWindow, Recurrence, TaskSchedule, Weekday};
use crate::error::{CareError, Result};

/// Highest valid day-of-month selector.
const MAX_MONTH_DAY: u32 = 31;

/// Validate a recurrence rule and return its canonical form.
///
/// Weekdays are de-duplicated keeping first-seen order; month days are
/// de-duplicated and sorted ascending.
///
/// # Errors
///
/// Returns [`CareError::Rule`] if the interval is zero, a weekly rule has no
/// weekdays, or a monthly rule has no days or a day outside `1..=31`.
pub fn normalize_recurrence(rule: &Recurrence) -> Result<Recurrence> {
    if rule.interval() == 0 {
        return Err(CareError::Rule(format!(
            "recurrence interval must be a positive integer (got {})",
            rule.interval()
        )));
    }

    match rule {
        Recurrence::Daily { interval } => Ok(Recurrence::Daily { interval: *interval }),
        Recurrence::Weekly { interval, weekdays } => {
            let mut seen = HashSet::new();
            let unique: Vec<Weekday> = weekdays
                .iter()
                .copied()
                .filter(|d| seen.insert(*d))
                .collect();
            if unique.is_empty() {
                return Err(CareError::Rule(
                    "weekly recurrence must include weekdays".to_owned(),
                ));
            }
            Ok(Recurrence::Weekly {
                interval: *interval,
                weekdays: unique,
            })
        }
        Recurrence::Monthly {
            interval,
            month_days,
        } => {
            let mut days = month_days.clone();
            days.sort_unstable();
            days.dedup();
            if days.is_empty() {
                return Err(CareError::Rule(
                    "monthly recurrence must include month days".to_owned(),
                ));
            }
            let invalid: Vec<u32> = days
                .iter()
                .copied()
                .filter(|d| !(1..=MAX_MONTH_DAY).contains(d))
                .collect();
            if !invalid.is_empty() {
                return Err(CareError::Rule(format!(
                    "monthly recurrence contains invalid days: {invalid:?}"
                )));
            }
            Ok(Recurrence::Monthly {
                interval: *interval,
                month_days: days,
            })
        }
    }
}

/// Expand `schedule` into task occurrences between its start date and
/// `window.end_date`, both inclusive.
///
/// Output is ascending by due date and truncated at `window.max_tasks`.
/// Every task carries `window.status` (default pending) and the normalized
/// rule.
///
/// # Errors
///
/// Returns [`CareError::Rule`] if either date is malformed, the end date is
/// before the start date, or the recurrence is invalid.
pub fn generate_tasks(schedule: &TaskSchedule, window: &GenerationWindow) -> Result<Vec<CareTask>> {
    let start = parse_date_only(&schedule.start_date).ok_or_else(|| {
        CareError::Rule(format!("invalid start date format: {:?}", schedule.start_date))
    })?;
    let end = parse_date_only(&window.end_date)
        .ok_or_else(|| CareError::Rule(format!("invalid end date format: {:?}", window.end_date)))?;
    if end < start {
        return Err(CareError::Rule(format!(
            "end date {} must be on or after start date {}",
            window.end_date, schedule.start_date
        )));
    }

    let rule = normalize_recurrence(&schedule.recurrence)?;
    let limit = window.max_tasks.unwrap_or(usize::MAX);

    let dates = match &rule {
        Recurrence::Daily { interval } => daily_dates(start, end, *interval, limit),
        Recurrence::Weekly { interval, weekdays } => {
            weekly_dates(start, end, *interval, weekdays, limit)
        }
        Recurrence::Monthly {
            interval,
            month_days,
        } => monthly_dates(start, end, *interval, month_days, limit),
    };

    let status = window.status.unwrap_or_default();
    let tasks: Vec<CareTask> = dates
        .into_iter()
        .map(|due| {
            let due_date = format_date_only(due);
            CareTask {
                id: CareTask::occurrence_id(&schedule.plant_id, schedule.task_type, &due_date),
                plant_id: schedule.plant_id.clone(),
                plant_name: schedule.plant_name.clone(),
                task_type: schedule.task_type,
                title: schedule.title.clone(),
                due_date,
                status,
                recurrence: Some(rule.clone()),
                completed_at: None,
                notes: None,
            }
        })
        .collect();

    debug!(
        plant_id = %schedule.plant_id,
        task_type = %schedule.task_type,
        rule = %rule,
        count = tasks.len(),
        "generated care tasks"
    );
    Ok(tasks)
}

/// Merge freshly generated occurrences into an existing task list.
///
/// Existing tasks win: their status, completion time and notes are kept.
/// Only occurrences whose id is not already present are appended, so
/// regenerating an overlapping window is a no-op for known dates.
pub fn merge_generated(existing: Vec<CareTask>, generated: Vec<CareTask>) -> Vec<CareTask> {
    let known: HashSet<String> = existing.iter().map(|t| t.id.clone()).collect();
    let mut merged = existing;
    merged.extend(generated.into_iter().filter(|t| !known.contains(&t.id)));
    merged
}

fn daily_dates(start: NaiveDate, end: NaiveDate, interval: u32, limit: usize) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut current = Some(start);
    while let Some(day) = current {
        if day > end || out.len() >= limit {
            break;
        }
        out.push(day);
        current = day.checked_add_days(Days::new(u64::from(interval)));
    }
    out
}

/// Week boundaries are anchored to `start`, not to the calendar week.
fn weekly_dates(
    start: NaiveDate,
    end: NaiveDate,
    interval: u32,
    weekdays: &[Weekday],
    limit: usize,
) -> Vec<NaiveDate> {
    let wanted: HashSet<Weekday> = weekdays.iter().copied().collect();
    let interval = i64::from(interval);
    let mut out = Vec::new();
    for day in start.iter_days().take_while(|d| *d <= end) {
        if out.len() >= limit {
            break;
        }
        let week_index = days_between(start, day) / 7;
        if week_index % interval == 0 && wanted.contains(&Weekday::from(day.weekday())) {
            out.push(day);
        }
    }
    out
}

/// Month days that do not exist in a month (e.g. the 31st of February) are
/// skipped, not rolled forward.
fn monthly_dates(
    start: NaiveDate,
    end: NaiveDate,
    interval: u32,
    month_days: &[u32],
    limit: usize,
) -> Vec<NaiveDate> {
    let first = month_index(start);
    let last = month_index(end);
    let step = i64::from(interval);
    let mut out = Vec::new();

    let mut index = first;
    while index <= last {
        let (year, month) = year_month(index);
        let length = days_in_month(year, month);
        for &day in month_days.iter().filter(|d| **d <= length) {
            let Some(due) = NaiveDate::from_ymd_opt(year, month, day) else {
                continue;
            };
            if due < start || due > end {
                continue;
            }
            if out.len() >= limit {
                return out;
            }
            out.push(due);
        }
        index += step;
    }
    out
}
