use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::fatal_fetch("x")
            .to_string()
            .contains("quote source error:")
    );
    assert!(ReelError::empty_pool("x").to_string().contains("empty pool:"));
    assert!(ReelError::render("x").to_string().contains("render error:"));
    assert!(ReelError::upload("x").to_string().contains("upload error:"));
    assert!(
        ReelError::remote_processing("x")
            .to_string()
            .contains("remote processing error:")
    );
    assert!(ReelError::config("x").to_string().contains("config error:"));
}

#[test]
fn timeout_reports_attempts() {
    let err = ReelError::Timeout { attempts: 12 };
    assert_eq!(err.to_string(), "timed out after 12 status polls");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
