//! Tile URL templates.
//!
//! Expands Leaflet-style templates such as
//! `https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png`.
//!
//! # Placeholders
//!
//! | Placeholder | Value |
//! |---|---|
//! | `{z}` | zoom |
//! | `{x}` | column |
//! | `{y}` | row (TMS-inverted when `tms` is set) |
//! | `{-y}` | row counted from the south edge |
//! | `{s}` | subdomain, `subdomains[(x + y) % n]` |
//! | `{r}` | `@2x` when retina tiles are enabled |
//!
//! Templates are parsed once; unknown placeholders are rejected up front.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::coord::TileCoord;

/// Subdomains used when a template has `{s}` and none are configured.
pub const DEFAULT_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Errors in a URL template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Template is empty.
    #[error("URL template is empty")]
    Empty,

    /// `{name}` is not a known placeholder.
    #[error("unknown placeholder '{{{0}}}' in URL template")]
    UnknownPlaceholder(String),

    /// `{s}` is used but the subdomain list is empty.
    #[error("URL template uses {{s}} but no subdomains are configured")]
    MissingSubdomains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Zoom,
    X,
    Y,
    InvertedY,
    Subdomain,
    Retina,
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder regex is valid"))
}

/// A parsed tile URL template.
///
/// # Example
///
/// ```
/// use regobs_tiles::coord::TileCoord;
/// use regobs_tiles::provider::UrlTemplate;
///
/// let template = UrlTemplate::parse("https://tiles.example.com/{z}/{x}/{y}.png").unwrap();
/// let url = template.expand(&TileCoord::new(4, 5, 6).unwrap());
/// assert_eq!(url, "https://tiles.example.com/4/5/6.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    source: String,
    segments: Vec<Segment>,
    subdomains: Vec<String>,
    tms: bool,
    retina: bool,
}

impl UrlTemplate {
    /// Parse a template with default subdomains (`a`, `b`, `c`).
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if template.trim().is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut segments = Vec::new();
        let mut last = 0;
        for caps in placeholder_regex().captures_iter(template) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            if whole.start > last {
                segments.push(Segment::Literal(template[last..whole.start].to_string()));
            }
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            segments.push(match name {
                "z" => Segment::Zoom,
                "x" => Segment::X,
                "y" => Segment::Y,
                "-y" => Segment::InvertedY,
                "s" => Segment::Subdomain,
                "r" => Segment::Retina,
                other => return Err(TemplateError::UnknownPlaceholder(other.to_string())),
            });
            last = whole.end;
        }
        if last < template.len() {
            segments.push(Segment::Literal(template[last..].to_string()));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
            subdomains: DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            tms: false,
            retina: false,
        })
    }

    /// Replace the subdomain list.
    pub fn with_subdomains(mut self, subdomains: Vec<String>) -> Result<Self, TemplateError> {
        if subdomains.is_empty() && self.segments.contains(&Segment::Subdomain) {
            return Err(TemplateError::MissingSubdomains);
        }
        self.subdomains = subdomains;
        Ok(self)
    }

    /// Count rows from the south edge for `{y}`.
    pub fn with_tms(mut self, tms: bool) -> Self {
        self.tms = tms;
        self
    }

    /// Expand `{r}` to `@2x`.
    pub fn with_retina(mut self, retina: bool) -> Self {
        self.retina = retina;
        self
    }

    /// The template string as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Build the URL for a tile.
    pub fn expand(&self, coord: &TileCoord) -> String {
        let mut url = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Zoom => url.push_str(&coord.z().to_string()),
                Segment::X => url.push_str(&coord.x().to_string()),
                Segment::Y => {
                    let y = if self.tms { coord.inverted_y() } else { coord.y() };
                    url.push_str(&y.to_string());
                }
                Segment::InvertedY => url.push_str(&coord.inverted_y().to_string()),
                Segment::Subdomain => {
                    let index = (coord.x() as u64 + coord.y() as u64) % self.subdomains.len() as u64;
                    url.push_str(&self.subdomains[index as usize]);
                }
                Segment::Retina => {
                    if self.retina {
                        url.push_str("@2x");
                    }
                }
            }
        }
        url
    }
}
