use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "quotereel_music_{name}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn local_dir_lists_matching_files_sorted_by_name() {
    let dir = temp_dir("list");
    for name in ["b.mp3", "a.MP3", "c.wav", "notes.txt"] {
        std::fs::write(dir.join(name), b"x").unwrap();
    }
    std::fs::create_dir_all(dir.join("sub.mp3")).unwrap();

    let mut src = LocalMusicDir::new(&dir, &["mp3".to_owned()]);
    let names: Vec<String> = src
        .list()
        .unwrap()
        .into_iter()
        .map(|a| a.display_name)
        .collect();
    assert_eq!(names, vec!["a.MP3", "b.mp3"]);

    let mut src = LocalMusicDir::new(&dir, &[".wav".to_owned(), "mp3".to_owned()]);
    assert_eq!(src.list().unwrap().len(), 3);
}

#[test]
fn local_fetch_copies_to_temp_name() {
    let dir = temp_dir("fetch");
    let lib = dir.join("lib");
    std::fs::create_dir_all(&lib).unwrap();
    std::fs::write(lib.join("song.mp3"), b"pcm").unwrap();

    let mut src = LocalMusicDir::new(&lib, &["mp3".to_owned()]);
    let asset = src.list().unwrap().remove(0);
    let work = dir.join("work");
    let path = src.fetch(&asset, &work).unwrap();
    assert_eq!(path, work.join("temp_song.mp3"));
    assert_eq!(std::fs::read(path).unwrap(), b"pcm");
}

#[test]
fn missing_directory_is_an_error() {
    let dir = temp_dir("missing");
    let mut src = LocalMusicDir::new(dir.join("absent"), &["mp3".to_owned()]);
    assert!(src.list().is_err());
}
