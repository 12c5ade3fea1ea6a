use verdant::CareError;
use verdant::calendar::dates::{days_between, format_date_only};
use verdant::calendar::{
    GenerationWindow, Recurrence, Weekday, generate_tasks, normalize_recurrence,
};

use crate::helpers::{date, schedule};

fn due_dates(s: &verdant::TaskSchedule, end: &str) -> Vec<String> {
    generate_tasks(s, &GenerationWindow::until(end))
        .unwrap()
        .into_iter()
        .map(|t| t.due_date)
        .collect()
}

#[test]
fn daily_count_matches_interval_arithmetic() {
    let start = "2024-01-01";
    for end in ["2024-01-01", "2024-01-31", "2024-03-15", "2025-01-01"] {
        for interval in [1u32, 2, 5, 7, 30] {
            let dates = due_dates(&schedule("p", start, Recurrence::Daily { interval }), end);
            let span = days_between(date(start), date(end));
            assert_eq!(dates.len() as i64, span / i64::from(interval) + 1);
            assert_eq!(dates[0], start);
            for pair in dates.windows(2) {
                assert_eq!(days_between(date(&pair[0]), date(&pair[1])), i64::from(interval));
            }
            assert!(date(dates.last().unwrap()) <= date(end));
        }
    }
}

#[test]
fn weekly_mon_thu_first_week() {
    let s = schedule(
        "p",
        "2024-01-01",
        Recurrence::Weekly {
            interval: 1,
            weekdays: vec![Weekday::Mon, Weekday::Thu],
        },
    );
    assert_eq!(due_dates(&s, "2024-01-07"), vec!["2024-01-01", "2024-01-04"]);
}

#[test]
fn weekly_every_other_week_is_anchored_to_start() {
    let s = schedule(
        "p",
        "2024-01-01",
        Recurrence::Weekly {
            interval: 2,
            weekdays: vec![Weekday::Mon],
        },
    );
    assert_eq!(due_dates(&s, "2024-01-21"), vec!["2024-01-01", "2024-01-15"]);
}

#[test]
fn monthly_skips_nonexistent_days() {
    let s = schedule(
        "p",
        "2024-01-10",
        Recurrence::Monthly {
            interval: 1,
            month_days: vec![1, 15, 31],
        },
    );
    assert_eq!(
        due_dates(&s, "2024-03-05"),
        vec!["2024-01-15", "2024-01-31", "2024-02-01", "2024-02-15", "2024-03-01"]
    );
}

#[test]
fn monthly_day_31_only_hits_long_months() {
    let s = schedule(
        "p",
        "2024-01-01",
        Recurrence::Monthly {
            interval: 1,
            month_days: vec![31],
        },
    );
    let dates = due_dates(&s, "2024-12-31");
    assert_eq!(dates.len(), 7);
    assert!(dates.iter().all(|d| d.ends_with("-31")));
}

#[test]
fn normalize_rejects_invalid_rules() {
    let invalid = [
        Recurrence::Daily { interval: 0 },
        Recurrence::Weekly {
            interval: 1,
            weekdays: vec![],
        },
        Recurrence::Monthly {
            interval: 1,
            month_days: vec![],
        },
        Recurrence::Monthly {
            interval: 1,
            month_days: vec![32],
        },
        Recurrence::Monthly {
            interval: 0,
            month_days: vec![1],
        },
    ];
    for rule in &invalid {
        assert!(
            matches!(normalize_recurrence(rule), Err(CareError::Rule(_))),
            "expected rejection for {rule:?}"
        );
    }
}

#[test]
fn rule_json_with_negative_interval_does_not_parse() {
    let parsed: Result<Recurrence, _> =
        serde_json::from_str(r#"{"frequency":"daily","interval":-1}"#);
    assert!(parsed.is_err());
    let fractional: Result<Recurrence, _> =
        serde_json::from_str(r#"{"frequency":"daily","interval":1.5}"#);
    assert!(fractional.is_err());
}

#[test]
fn generate_rejects_end_before_start() {
    let s = schedule("p", "2024-03-01", Recurrence::Daily { interval: 1 });
    let err = generate_tasks(&s, &GenerationWindow::until("2024-02-29")).unwrap_err();
    assert_eq!(err.code(), "RULE_INVALID");
}

#[test]
fn output_is_strictly_increasing_for_every_variant() {
    let rules = [
        Recurrence::Daily { interval: 4 },
        Recurrence::Weekly {
            interval: 3,
            weekdays: vec![Weekday::Sun, Weekday::Wed, Weekday::Fri],
        },
        Recurrence::Monthly {
            interval: 2,
            month_days: vec![28, 2, 30],
        },
    ];
    for rule in rules {
        let dates = due_dates(&schedule("p", "2023-11-17", rule), "2024-11-17");
        assert!(!dates.is_empty());
        for pair in dates.windows(2) {
            assert!(date(&pair[0]) < date(&pair[1]));
        }
        assert_eq!(format_date_only(date(&dates[0])), dates[0]);
    }
}
