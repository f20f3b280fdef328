//! Grouping schemes: canonical category order plus label and color lookups

use crate::config::SchemeConfig;
use crate::error::{DataLoadError, InvalidColorError};
use crate::selection::GroupingScheme;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// An opaque RGB marker color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = InvalidColorError;

    /// Accepts `rgb(r,g,b)` and `#rrggbb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidColorError(s.to_string());
        let t = s.trim();

        if let Some(hex) = t.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(invalid());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            return Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
        }

        let inner = t
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let channel = |p: &str| p.parse::<u8>().map_err(|_| invalid());
        Ok(Color::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Color as written in config or lookup files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Css(String),
    Rgb([u8; 3]),
}

impl ColorSpec {
    pub fn to_color(&self) -> Result<Color, InvalidColorError> {
        match self {
            ColorSpec::Css(s) => s.parse(),
            ColorSpec::Rgb([r, g, b]) => Ok(Color::rgb(*r, *g, *b)),
        }
    }
}

/// One category of a scheme with its resolved label and color
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub code: String,
    pub label: String,
    pub color: Color,
}

/// A fully loaded grouping scheme
#[derive(Debug, Clone)]
pub struct Scheme {
    /// Canonical order; determines output group order
    pub categories: Vec<Category>,
}

impl Scheme {
    /// Load a scheme from inline values or JSON lookup files
    pub fn load(kind: GroupingScheme, cfg: &SchemeConfig) -> Result<Self, DataLoadError> {
        let categories: Vec<String> = inline_or_file(&cfg.categories, &cfg.categories_file, "categories")?;
        let labels: HashMap<String, String> = inline_or_file(&cfg.labels, &cfg.labels_file, "labels")?;
        let specs: HashMap<String, ColorSpec> = inline_or_file(&cfg.colors, &cfg.colors_file, "colors")?;

        // Only declared categories need a usable color
        let colors = categories
            .iter()
            .filter_map(|code| specs.get(code).map(|spec| (code, spec)))
            .map(|(code, spec)| -> Result<(String, Color), DataLoadError> {
                let color = spec.to_color().map_err(|source| DataLoadError::InvalidColor {
                    path: origin(&cfg.colors_file),
                    scheme: kind.as_str().to_string(),
                    category: code.clone(),
                    source,
                })?;
                Ok((code.clone(), color))
            })
            .collect::<Result<HashMap<_, _>, DataLoadError>>()?;

        Self::new(kind, origin(&cfg.categories_file), categories, &labels, &colors)
    }

    /// Resolve every category's label and color.
    ///
    /// The category list must be non-empty and free of duplicates; a missing
    /// label or color is an error. `source` names where the list came from.
    pub fn new(
        kind: GroupingScheme,
        source: impl Into<PathBuf>,
        codes: Vec<String>,
        labels: &HashMap<String, String>,
        colors: &HashMap<String, Color>,
    ) -> Result<Self, DataLoadError> {
        let source = source.into();
        if codes.is_empty() {
            return Err(DataLoadError::malformed(
                source,
                format!("{} declares no categories", kind.as_str()),
            ));
        }
        if let Some(dup) = first_duplicate(&codes) {
            return Err(DataLoadError::malformed(
                source,
                format!("{} category '{}' listed twice", kind.as_str(), dup),
            ));
        }

        let categories = codes
            .into_iter()
            .map(|code| -> Result<Category, DataLoadError> {
                let label = labels.get(&code).cloned().ok_or_else(|| DataLoadError::MissingLabel {
                    scheme: kind.as_str().to_string(),
                    category: code.clone(),
                })?;
                let color = colors.get(&code).copied().ok_or_else(|| DataLoadError::MissingColor {
                    scheme: kind.as_str().to_string(),
                    category: code.clone(),
                })?;
                Ok(Category { code, label, color })
            })
            .collect::<Result<Vec<_>, DataLoadError>>()?;

        Ok(Scheme { categories })
    }

    pub fn get(&self, code: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }
}

fn first_duplicate(codes: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    codes.iter().map(String::as_str).find(|c| !seen.insert(*c))
}

fn origin(file: &Option<PathBuf>) -> PathBuf {
    file.clone().unwrap_or_else(|| PathBuf::from("<config>"))
}

fn inline_or_file<T: DeserializeOwned + Clone>(
    inline: &Option<T>,
    file: &Option<PathBuf>,
    what: &str,
) -> Result<T, DataLoadError> {
    match (inline, file) {
        (Some(v), _) => Ok(v.clone()),
        (None, Some(path)) => read_json(path),
        (None, None) => Err(DataLoadError::malformed("<config>", format!("no {} given", what))),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| DataLoadError::io(path, e))?;
    let value = serde_json::from_str(&content).map_err(|e| DataLoadError::malformed(path, e.to_string()))?;
    log::debug!("Loaded lookup {}", path.display());
    Ok(value)
}
