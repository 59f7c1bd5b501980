use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use crate::foundation::error::{ReelError, ReelResult};

/// First slot strictly after `now` today, otherwise the first slot tomorrow.
///
/// `times` must be sorted; `None` when it is empty.
pub fn next_posting_time(times: &[NaiveTime], now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = now.date();
    if let Some(t) = times.iter().find(|t| **t > now.time()) {
        return Some(today.and_time(*t));
    }
    let first = times.first()?;
    Some((today + TimeDelta::days(1)).and_time(*first))
}

/// Sleep until each posting slot and run `job` there.
///
/// Job failures are logged and the loop continues. Stops after `max_runs` when given.
pub fn run_daemon(
    times: &[NaiveTime],
    clock: &mut dyn FnMut() -> NaiveDateTime,
    sleep: &mut dyn FnMut(Duration),
    job: &mut dyn FnMut() -> ReelResult<()>,
    max_runs: Option<u64>,
) -> ReelResult<u64> {
    let mut runs = 0u64;
    loop {
        if max_runs.is_some_and(|max| runs >= max) {
            return Ok(runs);
        }
        let now = clock();
        let next = next_posting_time(times, now)
            .ok_or_else(|| ReelError::config("schedule has no posting times"))?;
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tracing::info!(next = %next, wait_secs = wait.as_secs(), "waiting for next posting slot");
        sleep(wait);

        match job() {
            Ok(()) => tracing::info!(slot = %next, "scheduled run completed"),
            Err(e) => tracing::error!(slot = %next, error = %e, "scheduled run failed"),
        }
        runs += 1;
    }
}

#[cfg(test)]
#[path = "../tests/unit/schedule.rs"]
mod tests;
