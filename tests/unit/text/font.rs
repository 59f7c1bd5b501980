use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "quotereel_font_{name}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn sfnt_magic_detection() {
    assert!(looks_like_font(&[0, 1, 0, 0, 9, 9]));
    assert!(looks_like_font(b"OTTO...."));
    assert!(looks_like_font(b"ttcf...."));
    assert!(!looks_like_font(b"<svg"));
    assert!(!looks_like_font(b"ab"));
}

#[test]
fn missing_candidate_is_render_error() {
    let dir = temp_dir("missing");
    let err = read_candidate(&dir.join("nope.ttf")).unwrap_err();
    assert!(matches!(err, ReelError::Render(_)));
}

#[test]
fn non_font_candidate_is_rejected() {
    let dir = temp_dir("garbage");
    let path = dir.join("fake.ttf");
    std::fs::write(&path, b"definitely not a font").unwrap();
    assert!(read_candidate(&path).is_err());
}

#[test]
fn fallback_source_is_flagged() {
    assert!(
        FontSource::SystemFallback {
            family: "DejaVu Sans".into()
        }
        .is_fallback()
    );
    assert!(!FontSource::File(PathBuf::from("a.ttf")).is_fallback());
}
