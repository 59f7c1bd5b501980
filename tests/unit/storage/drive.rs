use super::*;

#[test]
fn public_url_uses_download_export() {
    assert_eq!(
        public_url("abc123"),
        "https://drive.google.com/uc?id=abc123&export=download"
    );
}

#[test]
fn file_list_page_parses() {
    let page: FileList = serde_json::from_str(
        r#"{"nextPageToken":"t2","files":[{"id":"1","name":"b.mp3"},{"id":"2","name":"a.mp3"}]}"#,
    )
    .unwrap();
    assert_eq!(page.files.len(), 2);
    assert_eq!(page.next_page_token.as_deref(), Some("t2"));

    let last: FileList = serde_json::from_str(r#"{}"#).unwrap();
    assert!(last.files.is_empty());
    assert!(last.next_page_token.is_none());
}

#[test]
fn client_trims_trailing_slashes() {
    let c = DriveClient::new(
        "tok",
        "https://www.googleapis.com/drive/v3/",
        "https://www.googleapis.com/upload/drive/v3//",
        5,
    )
    .unwrap();
    assert_eq!(c.api_base, "https://www.googleapis.com/drive/v3");
    assert_eq!(c.upload_base, "https://www.googleapis.com/upload/drive/v3");
}
