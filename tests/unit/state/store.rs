use super::*;
use chrono::TimeDelta;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "quotereel_store_{name}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[test]
fn absent_file_yields_fresh_state() {
    let dir = temp_dir("absent");
    let store = ProgressStore::new(dir.join("progress.json"));
    let now = at("2026-03-01T10:00:00Z");
    assert_eq!(store.load(now), RotationState::fresh(now));
}

#[test]
fn save_then_load_round_trips() {
    let dir = temp_dir("roundtrip");
    let store = ProgressStore::new(dir.join("nested").join("progress.json"));
    let state = RotationState {
        quote_index: 4,
        music_index: 2,
        effect_index: 1,
        last_reset: at("2026-02-20T08:30:00Z"),
    };
    store.save(&state).unwrap();
    assert_eq!(store.load(Utc::now()), state);
    assert!(!with_suffix(store.path(), ".tmp").exists());
}

#[test]
fn legacy_file_without_effect_index_and_naive_timestamp_loads() {
    let dir = temp_dir("legacy");
    let path = dir.join("progress.json");
    std::fs::write(
        &path,
        r#"{"quote_index": 3, "music_index": 1, "last_reset": "2026-01-05T09:15:00.123456"}"#,
    )
    .unwrap();
    let state = ProgressStore::new(&path).load(Utc::now());
    assert_eq!(state.quote_index, 3);
    assert_eq!(state.music_index, 1);
    assert_eq!(state.effect_index, 0);

    let expected = Local
        .from_local_datetime(
            &NaiveDateTime::parse_from_str("2026-01-05T09:15:00.123456", "%Y-%m-%dT%H:%M:%S%.f")
                .unwrap(),
        )
        .earliest()
        .unwrap()
        .with_timezone(&Utc);
    assert_eq!(state.last_reset, expected);
}

#[test]
fn corrupt_file_falls_back_to_fresh_state() {
    let dir = temp_dir("corrupt");
    let path = dir.join("progress.json");
    std::fs::write(&path, b"{not json").unwrap();
    let now = at("2026-03-01T10:00:00Z");
    assert_eq!(ProgressStore::new(&path).load(now), RotationState::fresh(now));
}

#[test]
fn parse_timestamp_accepts_offsets() {
    let t = parse_timestamp("2026-01-05T09:15:00+02:00").unwrap();
    assert_eq!(t, at("2026-01-05T07:15:00Z"));
    assert!(parse_timestamp("yesterday").is_err());
    assert_eq!(
        at("2026-01-08T00:00:00Z") - at("2026-01-01T00:00:00Z"),
        TimeDelta::days(7)
    );
}

#[test]
fn second_lock_fails_until_first_is_dropped() {
    let dir = temp_dir("lock");
    let store = ProgressStore::new(dir.join("progress.json"));

    let first = store.lock().unwrap();
    assert!(first.path().exists());
    assert!(matches!(store.lock(), Err(ReelError::Locked(_))));

    let lock_path = first.path().to_path_buf();
    drop(first);
    assert!(!lock_path.exists());
    let _again = store.lock().unwrap();
}
