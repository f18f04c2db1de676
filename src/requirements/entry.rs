//! Single requirement entries.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::name::PackageName;
use super::specifier::{SpecifierSet, Version};

static NAMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[([^\]]*)\])?\s*(.*)$")
        .expect("requirement regex is valid")
});

static URL_SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.-]*://|file:|(?:git|hg|svn|bzr)\+)")
        .expect("url regex is valid")
});

static EXTRA_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\band\s+)?\bextra\s*==\s*['"]([^'"]+)['"](?:\s+and\b)?"#)
        .expect("marker regex is valid")
});

const ARCHIVE_SUFFIXES: &[&str] = &[".whl", ".tar.gz", ".tgz", ".tar.bz2", ".zip"];

/// Where a requirement comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A package name resolved through the index.
    Named,
    /// A direct URL (including VCS URLs).
    Url,
    /// A local file or directory.
    Path,
}

/// An environment marker, reduced to what the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// The extra this dependency belongs to (`extra == "name"`).
    pub extra: Option<String>,
    /// Whether any condition other than the extra remains.
    pub conditional: bool,
    pub raw: String,
}

impl Marker {
    /// Reduce a marker expression.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let extra = EXTRA_MARKER_RE
            .captures(raw)
            .map(|caps| PackageName::new(&caps[1]).to_string());
        let remainder = EXTRA_MARKER_RE.replace_all(raw, "");
        let remainder = remainder.trim().trim_matches(['(', ')']).trim();
        Self {
            extra,
            conditional: !remainder.is_empty(),
            raw: raw.to_string(),
        }
    }
}

/// A single requirement: a named constraint, or a direct URL/path.
///
/// Immutable once parsed. Two entries with the same name and different
/// constraints are a potential conflict, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementEntry {
    /// Normalized name; `None` for anonymous URL/path requirements.
    pub name: Option<PackageName>,
    /// Requested extras, normalized.
    pub extras: BTreeSet<String>,
    /// Version constraint; empty when unconstrained.
    pub specifiers: SpecifierSet,
    pub marker: Option<Marker>,
    pub source: Source,
    /// The text as written, handed to the installer verbatim.
    pub raw: String,
}

impl RequirementEntry {
    /// Parse one requirement. Returns `None` when the text is neither a
    /// named requirement nor a URL/path.
    ///
    /// # Example
    ///
    /// ```
    /// use venv_update::requirements::{RequirementEntry, Source};
    ///
    /// let entry = RequirementEntry::parse("Requests[socks] >=2.0 ; python_version>'3'").unwrap();
    /// assert_eq!(entry.name.unwrap().as_str(), "requests");
    /// assert_eq!(entry.source, Source::Named);
    /// assert!(entry.extras.contains("socks"));
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let raw = text.trim();
        if raw.is_empty() || raw.starts_with('-') {
            return None;
        }

        if URL_SCHEME_RE.is_match(raw) {
            return Some(Self::located(raw, Source::Url));
        }

        let named = NAMED_RE.captures(raw);
        if let Some(caps) = &named {
            let rest = caps.get(3).map_or("", |m| m.as_str()).trim();
            if let Some(url) = rest.strip_prefix('@') {
                return Self::direct_reference(raw, caps, url);
            }
        }

        if looks_like_path(raw) {
            return Some(Self::located(raw, Source::Path));
        }

        let caps = named?;
        let name = PackageName::new(&caps[1]);
        let extras = caps
            .get(2)
            .map(|m| parse_extras(m.as_str()))
            .unwrap_or_default();
        let rest = caps.get(3).map_or("", |m| m.as_str()).trim();

        let (specifiers, marker) = split_marker(rest);
        let specifiers = SpecifierSet::parse(specifiers)?;
        Some(Self {
            name: Some(name),
            extras,
            specifiers,
            marker: marker.map(Marker::parse),
            source: Source::Named,
            raw: raw.to_string(),
        })
    }

    /// An editable install target: always a URL or a path, never a name.
    pub fn editable(target: &str) -> Self {
        let target = target.trim();
        if URL_SCHEME_RE.is_match(target) {
            Self::located(target, Source::Url)
        } else {
            Self::located(target, Source::Path)
        }
    }

    /// A bare named requirement with no constraint.
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(PackageName::new(name)),
            extras: BTreeSet::new(),
            specifiers: SpecifierSet::default(),
            marker: None,
            source: Source::Named,
            raw: name.to_string(),
        }
    }

    fn direct_reference(raw: &str, caps: &regex::Captures<'_>, url: &str) -> Option<Self> {
        let (url, marker) = split_marker(url);
        let url = url.trim();
        if url.is_empty() {
            return None;
        }
        let source = if URL_SCHEME_RE.is_match(url) {
            Source::Url
        } else {
            Source::Path
        };
        Some(Self {
            name: Some(PackageName::new(&caps[1])),
            extras: caps
                .get(2)
                .map(|m| parse_extras(m.as_str()))
                .unwrap_or_default(),
            specifiers: SpecifierSet::default(),
            marker: marker.map(Marker::parse),
            source,
            raw: raw.to_string(),
        })
    }

    fn located(raw: &str, source: Source) -> Self {
        let (location, marker) = split_marker(raw);
        let name = egg_fragment(location).map(PackageName::new);
        Self {
            name,
            extras: BTreeSet::new(),
            specifiers: SpecifierSet::default(),
            marker: marker.map(Marker::parse),
            source,
            raw: raw.to_string(),
        }
    }

    /// Whether the installed `version` satisfies this entry's constraint.
    pub fn is_satisfied_by(&self, version: &str) -> bool {
        self.specifiers.contains(&Version::parse(version))
    }

    /// The exact version this entry pins, if any.
    pub fn pinned_version(&self) -> Option<&str> {
        match self.source {
            Source::Named => self.specifiers.pinned_version(),
            Source::Url | Source::Path => None,
        }
    }
}

impl fmt::Display for RequirementEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_extras(text: &str) -> BTreeSet<String> {
    text.split(',')
        .map(str::trim)
        .filter(|extra| !extra.is_empty())
        .map(|extra| PackageName::new(extra).to_string())
        .collect()
}

/// Split `text ; marker`. URLs need whitespace before the `;`.
fn split_marker(text: &str) -> (&str, Option<&str>) {
    let split = text
        .find(" ;")
        .or_else(|| text.find("\t;"))
        .map(|i| i + 1)
        .or_else(|| (!text.contains("://")).then(|| text.find(';')).flatten());
    match split {
        Some(index) => {
            let marker = text[index + 1..].trim();
            (&text[..index], (!marker.is_empty()).then_some(marker))
        }
        None => (text, None),
    }
}

fn looks_like_path(text: &str) -> bool {
    let location = split_marker(text).0.trim();
    location.starts_with(['.', '/', '~'])
        || location.starts_with('\\')
        || ARCHIVE_SUFFIXES
            .iter()
            .any(|suffix| location.to_ascii_lowercase().ends_with(suffix))
}

fn egg_fragment(location: &str) -> Option<&str> {
    let (_, fragment) = location.split_once('#')?;
    fragment
        .split('&')
        .find_map(|pair| pair.strip_prefix("egg="))
        .map(|egg| egg.split_once('-').map_or(egg, |(name, _)| name))
        .filter(|egg| !egg.is_empty())
}
