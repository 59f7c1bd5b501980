use super::*;

#[test]
fn default_caption_has_quote_author_and_tags() {
    let cfg = CaptionConfig::default();
    let caption = build_caption("Stay hungry.", "Steve Jobs", &cfg);
    assert_eq!(
        caption,
        "\"Stay hungry.\"\n\n- Steve Jobs\n\n#quotes #motivation #inspiration #quoteoftheday"
    );
}

#[test]
fn disabled_blocks_are_dropped_without_stray_separators() {
    let cfg = CaptionConfig {
        include_quote: false,
        include_author: true,
        hashtags: vec![],
    };
    assert_eq!(build_caption("q", "Ada", &cfg), "- Ada");

    let cfg = CaptionConfig {
        include_quote: false,
        include_author: false,
        hashtags: vec!["#a".into(), " ".into(), "#b".into()],
    };
    assert_eq!(build_caption("q", "Ada", &cfg), "#a #b");
}
