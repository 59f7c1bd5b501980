use super::*;
use serde_json::json;

struct ScriptedApi {
    statuses: Vec<&'static str>,
    failing_polls: Vec<u32>,
    polls: u32,
    publishes: u32,
}

impl ScriptedApi {
    fn new(statuses: Vec<&'static str>) -> Self {
        Self {
            statuses,
            failing_polls: Vec::new(),
            polls: 0,
            publishes: 0,
        }
    }
}

impl PublishApi for ScriptedApi {
    fn create_container(&mut self, video_url: &str, caption: &str) -> ReelResult<String> {
        assert_eq!(video_url, "https://example.test/v.mp4");
        assert_eq!(caption, "cap");
        Ok("c1".to_owned())
    }

    fn container_status(&mut self, creation_id: &str) -> ReelResult<StatusReport> {
        assert_eq!(creation_id, "c1");
        let code = self.statuses[(self.polls as usize).min(self.statuses.len() - 1)];
        self.polls += 1;
        if self.failing_polls.contains(&self.polls) {
            return Err(ReelError::http("unexpected status 503: try later"));
        }
        Ok(StatusReport {
            status: ContainerStatus::parse(code),
            payload: json!({ "status_code": code, "id": "c1" }),
        })
    }

    fn publish(&mut self, creation_id: &str) -> ReelResult<String> {
        assert_eq!(creation_id, "c1");
        self.publishes += 1;
        Ok("m1".to_owned())
    }
}

fn policy(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_secs(10),
        max_attempts,
    }
}

fn job() -> PublishJob {
    PublishJob::new("drive-1", "https://example.test/v.mp4", "cap")
}

#[test]
fn finished_on_third_poll_publishes_once() {
    let mut api = ScriptedApi::new(vec!["IN_PROGRESS", "IN_PROGRESS", "FINISHED"]);
    let mut job = job();
    let mut sleeps = Vec::new();
    let out = run_publish(&mut api, &mut job, policy(12), &mut |d| sleeps.push(d)).unwrap();

    assert_eq!(api.polls, 3);
    assert_eq!(api.publishes, 1);
    assert_eq!(out.polls, 3);
    assert_eq!(out.media_id, "m1");
    assert_eq!(sleeps, vec![Duration::from_secs(10); 2]);
    assert_eq!(job.stage, PublishStage::Published("m1".into()));
    assert_eq!(job.creation_id.as_deref(), Some("c1"));
}

#[test]
fn error_on_first_poll_never_publishes() {
    let mut api = ScriptedApi::new(vec!["ERROR"]);
    let mut job = job();
    let err = run_publish(&mut api, &mut job, policy(12), &mut |_| {}).unwrap_err();
    assert!(matches!(err, ReelError::RemoteProcessing(ref m) if m.contains("ERROR")));
    assert_eq!(api.polls, 1);
    assert_eq!(api.publishes, 0);
    assert_eq!(job.stage, PublishStage::Failed);
}

#[test]
fn expired_is_terminal_failure() {
    let mut api = ScriptedApi::new(vec!["IN_PROGRESS", "EXPIRED"]);
    let err = run_publish(&mut api, &mut job(), policy(12), &mut |_| {}).unwrap_err();
    assert!(matches!(err, ReelError::RemoteProcessing(_)));
    assert_eq!(api.publishes, 0);
}

#[test]
fn bounded_polling_times_out() {
    let mut api = ScriptedApi::new(vec!["IN_PROGRESS"]);
    let mut job = job();
    let mut sleeps = 0;
    let err = run_publish(&mut api, &mut job, policy(4), &mut |_| sleeps += 1).unwrap_err();
    assert!(matches!(err, ReelError::Timeout { attempts: 4 }));
    assert_eq!(api.polls, 4);
    assert_eq!(sleeps, 3);
    assert_eq!(api.publishes, 0);
    assert_eq!(job.stage, PublishStage::TimedOut);
}

#[test]
fn unknown_status_keeps_polling() {
    let mut api = ScriptedApi::new(vec!["", "SOMETHING_NEW", "FINISHED"]);
    let out = run_publish(&mut api, &mut job(), policy(12), &mut |_| {}).unwrap();
    assert_eq!(out.polls, 3);
    assert_eq!(api.publishes, 1);
}

#[test]
fn failed_status_request_is_retried() {
    let mut api = ScriptedApi::new(vec!["FINISHED"]);
    api.failing_polls = vec![1];
    let mut job = job();
    let mut sleeps = 0;
    let out = run_publish(&mut api, &mut job, policy(12), &mut |_| sleeps += 1).unwrap();

    assert_eq!(api.polls, 2);
    assert_eq!(out.polls, 2);
    assert_eq!(sleeps, 1);
    assert_eq!(api.publishes, 1);
    assert_eq!(out.media_id, "m1");
}

#[test]
fn failed_status_requests_count_toward_the_bound() {
    let mut api = ScriptedApi::new(vec!["IN_PROGRESS"]);
    api.failing_polls = vec![1, 2, 3];
    let mut sleeps = 0;
    let err = run_publish(&mut api, &mut job(), policy(3), &mut |_| sleeps += 1).unwrap_err();
    assert!(matches!(err, ReelError::Timeout { attempts: 3 }));
    assert_eq!(api.polls, 3);
    assert_eq!(sleeps, 2);
    assert_eq!(api.publishes, 0);
}

#[test]
fn already_published_container_is_not_published_again() {
    let mut api = ScriptedApi::new(vec!["IN_PROGRESS", "PUBLISHED"]);
    let mut job = job();
    let out = run_publish(&mut api, &mut job, policy(12), &mut |_| {}).unwrap();
    assert_eq!(api.publishes, 0);
    assert_eq!(out.polls, 2);
    assert_eq!(out.media_id, "c1");
    assert_eq!(job.stage, PublishStage::Published("c1".into()));
}

#[test]
fn status_codes_parse_and_display() {
    assert_eq!(ContainerStatus::parse("FINISHED"), ContainerStatus::Finished);
    assert!(ContainerStatus::parse("FINISHED").is_ready());
    let published = ContainerStatus::parse("PUBLISHED");
    assert!(!published.is_ready() && !published.is_failed());
    assert!(ContainerStatus::parse("EXPIRED").is_failed());
    let unknown = ContainerStatus::parse("WAT");
    assert!(!unknown.is_ready() && !unknown.is_failed());
    assert_eq!(unknown.to_string(), "WAT");
    assert_eq!(ContainerStatus::InProgress.to_string(), "IN_PROGRESS");
}
