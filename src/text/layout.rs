use crate::foundation::core::Canvas;
use crate::foundation::math::clamp_to_margin;

/// Greedy word wrap.
///
/// Words are joined with single spaces while `measure(candidate) <= max_width`. A word that does
/// not fit on an empty line is emitted alone, unsplit.
pub fn wrap(text: &str, mut measure: impl FnMut(&str) -> f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_owned()
        } else {
            format!("{current} {word}")
        };

        if measure(&candidate) <= max_width {
            current = candidate;
        } else if current.is_empty() {
            lines.push(word.to_owned());
        } else {
            lines.push(std::mem::replace(&mut current, word.to_owned()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Vertical anchoring of a text block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Centered on the canvas, kept `margin` away from the top and bottom edges.
    Centered,
    /// Top edge pinned at this `y`.
    Top(f32),
}

/// Block geometry shared by every line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockMetrics {
    /// Font size in pixels.
    pub font_size: f32,
    /// Added to the font size to get the line advance.
    pub line_spacing: f32,
    /// Minimum distance from the canvas edges.
    pub margin: f32,
}

impl BlockMetrics {
    /// Vertical advance between consecutive lines.
    pub fn line_height(&self) -> f32 {
        self.font_size + self.line_spacing
    }
}

/// A wrapped line with the top-left corner it is drawn at.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedLine {
    /// Line text.
    pub text: String,
    /// Left edge in pixels.
    pub x: i64,
    /// Top edge in pixels.
    pub y: i64,
}

/// Place `lines` on `canvas`. Each line is centered horizontally; both axes clamp to the margin.
///
/// When the block is taller (or a line wider) than the canvas minus margins, the clamp pins it to
/// the top (or left) margin.
pub fn position_lines(
    lines: &[String],
    mut measure: impl FnMut(&str) -> f32,
    canvas: Canvas,
    metrics: BlockMetrics,
    placement: Placement,
) -> Vec<PositionedLine> {
    let w = i64::from(canvas.width);
    let h = i64::from(canvas.height);
    let margin = metrics.margin.round() as i64;
    let line_height = metrics.line_height().round() as i64;
    let total = line_height * lines.len() as i64;

    let top = match placement {
        Placement::Centered => clamp_to_margin((h - total).div_euclid(2), margin, h - total - margin),
        Placement::Top(y) => y.round() as i64,
    };

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let line_width = measure(line).ceil() as i64;
            let x = clamp_to_margin((w - line_width).div_euclid(2), margin, w - line_width - margin);
            PositionedLine {
                text: line.clone(),
                x,
                y: top + i as i64 * line_height,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
