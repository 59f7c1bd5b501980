use std::path::{Path, PathBuf};

use crate::foundation::error::{ReelError, ReelResult};

/// Where the active font came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// A configured candidate file.
    File(PathBuf),
    /// The system default sans-serif face, used when no candidate loads.
    SystemFallback {
        /// Family name reported by the system font database.
        family: String,
    },
}

impl FontSource {
    /// Whether output quality is degraded by the fallback.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::SystemFallback { .. })
    }
}

impl std::fmt::Display for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::SystemFallback { family } => write!(f, "system fallback ({family})"),
        }
    }
}

/// Raw font bytes plus the face index inside a collection file.
#[derive(Clone, Debug)]
pub(crate) struct FontBytes {
    pub(crate) data: Vec<u8>,
    pub(crate) index: u32,
    pub(crate) source: FontSource,
}

/// Read a candidate font file. Fails on unreadable or obviously non-font files.
pub(crate) fn read_candidate(path: &Path) -> ReelResult<FontBytes> {
    let data = std::fs::read(path)
        .map_err(|e| ReelError::render(format!("read font '{}': {e}", path.display())))?;
    if !looks_like_font(&data) {
        return Err(ReelError::render(format!(
            "'{}' is not a TrueType/OpenType font",
            path.display()
        )));
    }
    Ok(FontBytes {
        data,
        index: 0,
        source: FontSource::File(path.to_path_buf()),
    })
}

/// Load the system default sans-serif face through `fontdb`.
pub(crate) fn system_sans_serif() -> ReelResult<FontBytes> {
    use usvg::fontdb::{Database, Family, Query};

    let mut db = Database::new();
    db.load_system_fonts();
    let id = db
        .query(&Query {
            families: &[Family::SansSerif],
            ..Default::default()
        })
        .or_else(|| db.faces().next().map(|f| f.id))
        .ok_or_else(|| ReelError::render("no system fonts available"))?;

    let family = db
        .face(id)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_else(|| "sans-serif".to_owned());
    let (data, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| ReelError::render(format!("failed to read system font '{family}'")))?;

    Ok(FontBytes {
        data,
        index,
        source: FontSource::SystemFallback { family },
    })
}

/// sfnt magic numbers: TrueType, OpenType CFF, `true`, and TrueType collections.
fn looks_like_font(data: &[u8]) -> bool {
    matches!(
        data.get(0..4),
        Some([0x00, 0x01, 0x00, 0x00]) | Some(b"OTTO") | Some(b"true") | Some(b"ttcf")
    )
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
