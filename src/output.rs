//! Rendered figure output

use crate::figure::Figure;
use crate::resolve::PointGroup;
use crate::selection::Selection;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Selection as echoed back alongside the figure
#[derive(Debug, Clone, Serialize)]
pub struct SelectionEcho {
    #[serde(rename = "pca-type")]
    pub pca_type: String,
    #[serde(rename = "include-xy")]
    pub include_xy: String,
    #[serde(rename = "group-by")]
    pub group_by: String,
}

impl From<Selection> for SelectionEcho {
    fn from(sel: Selection) -> Self {
        SelectionEcho {
            pca_type: sel.method.to_string(),
            include_xy: sel.features.to_string(),
            group_by: sel.scheme.to_string(),
        }
    }
}

/// Everything the 3D surface needs for one selection
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    /// Version of the tool
    pub version: String,
    pub selection: SelectionEcho,
    /// Number of points per trace, in trace order
    pub group_sizes: Vec<usize>,
    pub figure: Figure,
}

impl RenderOutput {
    pub fn new(selection: Selection, groups: &[PointGroup]) -> Self {
        RenderOutput {
            version: env!("CARGO_PKG_VERSION").to_string(),
            selection: selection.into(),
            group_sizes: groups.iter().map(|g| g.points.len()).collect(),
            figure: Figure::for_selection(selection, groups),
        }
    }

    pub fn to_json(&self, compact: bool) -> Result<String> {
        let json = if compact {
            serde_json::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        Ok(json)
    }

    /// Save to pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json(false)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Save to compact JSON (no pretty print, smaller file)
    pub fn save_compact<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json(true)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Save to gzipped JSON file
    pub fn save_gzip<P: AsRef<Path>>(&self, path: P, compact: bool) -> Result<()> {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(self.to_json(compact)?.as_bytes())?;
        encoder.finish()?;
        Ok(())
    }
}

/// Gzip a response body in memory
pub fn gzip_bytes(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
