//! Name Normalizer
//!
//! Parses a user-supplied candidate name into a validated ASCII label
//! sequence plus a human-readable rendering.
//!
//! ## Contract
//!
//! 1. Lowercase, trim whitespace, strip at most one trailing `/`
//! 2. IDNA ToASCII to obtain the ASCII form, split into labels on `.`
//! 3. Reject unless every label matches `[A-Za-z0-9_-]+` — this gate runs
//!    before any DNS access, so malformed input never reaches the resolver
//! 4. IDNA ToUnicode for the rendering; invalid punycode falls back to the
//!    ASCII form (rendering is cosmetic and never fails)

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The input is not a valid Handshake name. Carries the raw input so
    /// callers can echo it back verbatim.
    #[error("`{0}` is not a valid Handshake name")]
    InvalidName(String),
}

/// A candidate name normalized into ASCII labels plus a display rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    labels: Vec<String>,
    rendering: String,
}

impl NormalizedName {
    /// Normalize and validate a raw candidate name
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let lowered = raw.trim().to_lowercase();
        let bare = lowered.strip_suffix('/').unwrap_or(&lowered);

        let ascii = idna::domain_to_ascii(bare)
            .map_err(|_| NameError::InvalidName(raw.to_string()))?;

        let labels: Vec<String> = ascii.split('.').map(str::to_string).collect();
        if !labels.iter().all(|label| is_valid_label(label)) {
            return Err(NameError::InvalidName(raw.to_string()));
        }

        // Don't render invalid punycode
        let (unicode, errors) = idna::domain_to_unicode(&ascii);
        let rendering = if errors.is_ok() { unicode } else { ascii };

        Ok(Self { labels, rendering })
    }

    /// The validated ASCII labels, in order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The full ASCII form (labels joined with `.`)
    pub fn ascii(&self) -> String {
        self.labels.join(".")
    }

    /// The last label (the Handshake TLD)
    pub fn tld(&self) -> &str {
        self.labels.last().map(String::as_str).unwrap_or("")
    }

    /// All labels except the last, for the advertised proof host
    pub fn zone_labels(&self) -> &[String] {
        &self.labels[..self.labels.len().saturating_sub(1)]
    }

    /// Human-readable rendering (Unicode where decodable, else ASCII)
    pub fn rendering(&self) -> &str {
        &self.rendering
    }
}

/// A label is valid when non-empty and made of `[A-Za-z0-9_-]` only
fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
