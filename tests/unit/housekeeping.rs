use super::*;
use crate::sources::music::MusicAsset;
use std::time::Duration;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "quotereel_housekeeping_{name}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn touch(dir: &Path, name: &str, age_secs: u64) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"x").unwrap();
    let f = std::fs::File::options().write(true).open(&path).unwrap();
    f.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
        .unwrap();
    path
}

#[test]
fn keeps_newest_matching_videos() {
    let dir = temp_dir("keep");
    for (i, age) in [50u64, 40, 30, 20, 10].iter().enumerate() {
        touch(&dir, &format!("quote_video_{i}.mp4"), *age);
    }
    let other = touch(&dir, "other_0.mp4", 1000);
    let notes = touch(&dir, "quote_video_notes.txt", 1000);

    let removed = cleanup_old_videos(&dir, "quote_video", 3).unwrap();
    let mut names: Vec<_> = removed
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["quote_video_0.mp4", "quote_video_1.mp4"]);
    assert!(dir.join("quote_video_4.mp4").exists());
    assert!(other.exists());
    assert!(notes.exists());
}

#[test]
fn nothing_removed_under_the_limit() {
    let dir = temp_dir("under");
    touch(&dir, "quote_video_a.mp4", 5);
    assert!(cleanup_old_videos(&dir, "quote_video", 5).unwrap().is_empty());
}

#[test]
fn missing_directory_is_an_error() {
    let dir = temp_dir("missing").join("nope");
    assert!(cleanup_old_videos(&dir, "quote_video", 5).is_err());
}

struct EmptyMusic;

impl MusicSource for EmptyMusic {
    fn list(&mut self) -> ReelResult<Vec<MusicAsset>> {
        Ok(Vec::new())
    }

    fn fetch(&mut self, _asset: &MusicAsset, _dest_dir: &Path) -> ReelResult<PathBuf> {
        unreachable!("nothing to fetch")
    }
}

#[test]
fn empty_music_source_is_reported() {
    let report = check_prerequisites(&mut EmptyMusic, &TextConfig::default());
    assert!(!report.is_ok());
    assert_eq!(report.music_tracks, 0);
    assert!(
        report
            .problems
            .iter()
            .any(|p| p.contains("no tracks"))
    );
}
