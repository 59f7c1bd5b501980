use super::*;
use chrono::NaiveDate;

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn day(d: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, d)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn slots() -> Vec<NaiveTime> {
    vec![at(9, 0), at(12, 0), at(18, 0), at(21, 0)]
}

#[test]
fn picks_next_slot_today() {
    assert_eq!(next_posting_time(&slots(), day(10, 10, 30)), Some(day(10, 12, 0)));
    assert_eq!(next_posting_time(&slots(), day(10, 0, 0)), Some(day(10, 9, 0)));
}

#[test]
fn slot_equal_to_now_is_skipped() {
    assert_eq!(next_posting_time(&slots(), day(10, 12, 0)), Some(day(10, 18, 0)));
}

#[test]
fn rolls_over_to_tomorrow() {
    assert_eq!(next_posting_time(&slots(), day(10, 21, 30)), Some(day(11, 9, 0)));
    assert_eq!(next_posting_time(&slots(), day(31, 23, 59)), Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(9, 0, 0).unwrap()));
}

#[test]
fn no_times_no_slot() {
    assert_eq!(next_posting_time(&[], day(10, 10, 0)), None);
}

#[test]
fn daemon_sleeps_to_each_slot_and_survives_failures() {
    let mut now = day(10, 11, 0);
    let mut sleeps = Vec::new();
    let mut calls = 0;

    let runs = {
        let now_cell = std::cell::Cell::new(now);
        let mut clock = || now_cell.get();
        let mut sleep = |d: Duration| {
            sleeps.push(d);
            now_cell.set(now_cell.get() + TimeDelta::from_std(d).unwrap());
        };
        let mut job = || {
            calls += 1;
            if calls == 1 {
                Err(ReelError::render("boom"))
            } else {
                Ok(())
            }
        };
        let runs = run_daemon(&slots(), &mut clock, &mut sleep, &mut job, Some(2)).unwrap();
        now = now_cell.get();
        runs
    };

    assert_eq!(runs, 2);
    assert_eq!(calls, 2);
    assert_eq!(
        sleeps,
        vec![Duration::from_secs(3600), Duration::from_secs(6 * 3600)]
    );
    assert_eq!(now, day(10, 18, 0));
}

#[test]
fn daemon_without_times_is_config_error() {
    let err = run_daemon(
        &[],
        &mut || day(1, 0, 0),
        &mut |_| {},
        &mut || Ok(()),
        Some(1),
    )
    .unwrap_err();
    assert!(matches!(err, ReelError::Config(_)));
}
