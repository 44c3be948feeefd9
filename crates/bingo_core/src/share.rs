//! Share text and export naming.

use crate::board::stats::CompletionStats;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

const DEFAULT_EXPORT_STEM: &str = "bingo";

/// Language of user-facing copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareLocale {
    #[default]
    En,
    Fr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLocaleError(pub String);

impl Display for ParseLocaleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported locale `{}`; expected en|fr", self.0)
    }
}

impl Error for ParseLocaleError {}

impl FromStr for ShareLocale {
    type Err = ParseLocaleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            "fr" | "fr-fr" => Ok(Self::Fr),
            other => Err(ParseLocaleError(other.to_string())),
        }
    }
}

/// Human-readable progress line for social sharing.
pub fn share_text(stats: &CompletionStats, locale: ShareLocale) -> String {
    let CompletionStats {
        completed,
        total,
        percentage,
    } = *stats;
    match locale {
        ShareLocale::En => {
            format!("Completed {completed}/{total} ({percentage}%) of my resolutions!")
        }
        ShareLocale::Fr => {
            format!("J'ai accompli {completed}/{total} ({percentage}%) de mes résolutions !")
        }
    }
}

/// PNG file name for an exported card titled `title`.
pub fn export_file_name(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = NON_SLUG_RE.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        format!("{DEFAULT_EXPORT_STEM}.png")
    } else {
        format!("{slug}.png")
    }
}
