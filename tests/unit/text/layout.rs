use super::*;

fn chars(s: &str) -> f32 {
    s.chars().count() as f32
}

fn canvas(width: u32, height: u32) -> Canvas {
    Canvas { width, height }
}

const METRICS: BlockMetrics = BlockMetrics {
    font_size: 70.0,
    line_spacing: 15.0,
    margin: 50.0,
};

#[test]
fn wrap_closes_line_when_next_word_overflows() {
    assert_eq!(wrap("a b c", chars, 3.0), vec!["a b", "c"]);
}

#[test]
fn wrap_emits_overlong_word_alone() {
    assert_eq!(
        wrap("hi extraordinarily ok", chars, 5.0),
        vec!["hi", "extraordinarily", "ok"]
    );
    assert_eq!(wrap("extraordinarily", chars, 5.0), vec!["extraordinarily"]);
}

#[test]
fn wrap_is_deterministic_and_collapses_whitespace() {
    let text = "  the quick   brown fox\tjumps over the lazy dog ";
    let a = wrap(text, chars, 10.0);
    let b = wrap(text, chars, 10.0);
    assert_eq!(a, b);
    assert_eq!(a, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
    assert!(wrap("   ", chars, 10.0).is_empty());
}

#[test]
fn centered_block_is_vertically_centered() {
    let lines = vec!["abcd".to_owned(), "ab".to_owned()];
    let out = position_lines(&lines, chars, canvas(1080, 1920), METRICS, Placement::Centered);
    // total = 2 * 85 = 170 -> y = (1920 - 170) / 2 = 875
    assert_eq!(out[0].y, 875);
    assert_eq!(out[1].y, 960);
    assert_eq!(out[0].x, (1080 - 4) / 2);
    assert_eq!(out[1].x, (1080 - 2) / 2);
}

#[test]
fn tall_block_pins_to_top_margin() {
    let lines: Vec<String> = (0..30).map(|i| i.to_string()).collect();
    let out = position_lines(&lines, chars, canvas(1080, 1920), METRICS, Placement::Centered);
    assert_eq!(out[0].y, 50);
}

#[test]
fn wide_line_pins_to_left_margin() {
    let wide = "x".repeat(1200);
    let out = position_lines(&[wide], chars, canvas(1080, 1920), METRICS, Placement::Centered);
    assert_eq!(out[0].x, 50);
}

#[test]
fn near_edge_line_is_clamped_inside_margin() {
    // (200 - 120) / 2 = 40 < margin.
    let line = "x".repeat(120);
    let out = position_lines(&[line], chars, canvas(200, 400), METRICS, Placement::Centered);
    assert_eq!(out[0].x, 50);
}

#[test]
fn top_placement_pins_first_line() {
    let lines = vec!["- Seneca".to_owned(), "the younger".to_owned()];
    let out = position_lines(
        &lines,
        chars,
        canvas(1080, 1920),
        BlockMetrics {
            font_size: 50.0,
            ..METRICS
        },
        Placement::Top(1440.0),
    );
    assert_eq!(out[0].y, 1440);
    assert_eq!(out[1].y, 1440 + 65);
}
