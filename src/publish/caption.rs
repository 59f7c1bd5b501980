use crate::config::CaptionConfig;

/// Post caption: quoted text, `- author`, then hashtags, each block separated by a blank line.
/// Disabled or empty blocks are left out entirely.
pub fn build_caption(quote: &str, author: &str, cfg: &CaptionConfig) -> String {
    let mut blocks = Vec::with_capacity(3);
    if cfg.include_quote {
        blocks.push(format!("\"{quote}\""));
    }
    if cfg.include_author {
        blocks.push(format!("- {author}"));
    }
    let tags = cfg
        .hashtags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !tags.is_empty() {
        blocks.push(tags);
    }
    blocks.join("\n\n")
}

#[cfg(test)]
#[path = "../../tests/unit/publish/caption.rs"]
mod tests;
