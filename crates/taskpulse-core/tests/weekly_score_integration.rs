//! Integration tests for the weekly performance view and score.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use taskpulse_core::{aggregate_week, score, ScoreTier, Task, TaskAction};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 8, 12, 0, 0).unwrap()
}

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0).unwrap()
}

fn open(due: &str) -> Task {
    let mut task = Task::new(due, &at(1, 8, 0));
    task.due_date = Some(due.parse().unwrap());
    task
}

fn finished(due: Option<&str>, done: DateTime<Utc>) -> Task {
    let mut task = Task::new("done", &at(1, 8, 0));
    task.due_date = due.map(|d| d.parse().unwrap());
    task.apply(TaskAction::ToggleComplete, &done)
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

#[test]
fn test_week_of_mixed_results() {
    let tasks = vec![
        finished(Some("2026-03-05"), at(5, 10, 0)),
        finished(Some("2026-03-04T12:00"), at(4, 13, 0)),
        finished(Some("2026-03-03T09:00"), at(3, 9, 0)),
        finished(None, at(7, 18, 30)),
        finished(Some("2026-02-20"), at(2, 20, 0) - Duration::days(10)),
        open("2026-03-06"),
        open("2026-03-08"),
        open("2026-03-08T12:00"),
        open("2026-02-25"),
    ];

    let report = aggregate_week(&tasks, &now());
    assert_eq!(report.first_day(), date(2));
    assert_eq!(report.last_day(), date(8));

    let day = |d: u32| report.days[(d - 2) as usize].counts;
    assert_eq!(day(3).on_time, 1, "completed exactly at the deadline");
    assert_eq!(day(4).late, 1);
    assert_eq!(day(5).on_time, 1);
    assert_eq!(day(6).overdue, 1);
    assert_eq!(day(7).on_time, 1, "no deadline counts as on time");
    assert_eq!(day(8).total(), 0, "deadlines later today are not overdue yet");

    assert_eq!(report.totals.on_time, 3);
    assert_eq!(report.totals.late, 1);
    assert_eq!(report.totals.overdue, 1);
    assert_eq!(report.max, 1);

    // 3*3 + 1 - 2 = 8 of 12
    let s = score(&report.totals);
    assert_eq!(s.points, 8);
    assert_eq!(s.max_possible, 12);
    assert_eq!(s.value, 67);
    assert_eq!(s.tier, ScoreTier::B);
    assert_eq!(s.label, "Good");
}

#[test]
fn test_reopened_task_only_counts_as_overdue() {
    // Reopening clears the completion, so only the passed deadline remains.
    let reopened = finished(Some("2026-03-04T12:00"), at(5, 9, 0))
        .apply(TaskAction::ToggleComplete, &at(5, 10, 0));
    let report = aggregate_week(&[reopened], &now());
    assert_eq!(report.totals.late, 0);
    assert_eq!(report.totals.overdue, 1);
    assert_eq!(report.days[2].counts.overdue, 1);
}

#[test]
fn test_busy_day_sets_max() {
    let tasks: Vec<Task> = (0..4)
        .map(|_| finished(None, at(6, 10, 0)))
        .chain(std::iter::once(finished(None, at(7, 10, 0))))
        .collect();
    let report = aggregate_week(&tasks, &now());
    assert_eq!(report.max, 4);
    assert_eq!(report.totals.on_time, 5);
}

#[test]
fn test_empty_week() {
    let report = aggregate_week(&[], &now());
    assert_eq!(report.totals.total(), 0);
    assert_eq!(report.max, 1);
    assert!(report.days.iter().all(|d| d.counts.total() == 0));

    let s = score(&report.totals);
    assert_eq!(s.value, 0);
    assert_eq!(s.max_possible, 1);
    assert_eq!(s.tier, ScoreTier::C);
}

#[test]
fn test_days_follow_local_calendar() {
    // 2026-03-08 23:30 UTC is already 03-09 in UTC+2.
    let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
    let local_now = plus_two.with_ymd_and_hms(2026, 3, 9, 8, 0, 0).unwrap();
    let late_night = Utc.with_ymd_and_hms(2026, 3, 8, 23, 30, 0).unwrap();
    let tasks = vec![finished(None, late_night)];

    let report = aggregate_week(&tasks, &local_now);
    assert_eq!(report.last_day(), date(9));
    assert_eq!(report.days[6].counts.on_time, 1);

    let utc_now = Utc.with_ymd_and_hms(2026, 3, 9, 8, 0, 0).unwrap();
    let utc_report = aggregate_week(&tasks, &utc_now);
    assert_eq!(utc_report.last_day(), date(9));
    assert_eq!(utc_report.days[5].counts.on_time, 1);
}

#[test]
fn test_report_json_shape() {
    let report = aggregate_week(&[finished(None, at(8, 9, 0))], &now());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["days"].as_array().unwrap().len(), 7);
    assert_eq!(json["days"][6]["date"], "2026-03-08");
    assert_eq!(json["days"][6]["onTime"], 1);
    assert_eq!(json["totals"]["overdue"], 0);

    let s = serde_json::to_value(score(&report.totals)).unwrap();
    assert_eq!(s["value"], 100);
    assert_eq!(s["tier"], "s");
}
