//! Installed distribution metadata.
//!
//! Reads the header block of `METADATA` / `PKG-INFO` files and the
//! sectioned `requires.txt` used by egg-info installs.

/// The fields the inventory needs from a metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionMetadata {
    pub name: String,
    pub version: String,
    /// `Requires-Dist` values, as written.
    pub requires: Vec<String>,
}

/// Parse the header block of a `METADATA` or `PKG-INFO` file.
///
/// Returns `None` when `Name` or `Version` is missing.
pub fn parse_metadata(content: &str) -> Option<DistributionMetadata> {
    let mut name = None;
    let mut version = None;
    let mut requires = Vec::new();

    for line in content.lines() {
        if line.is_empty() {
            break;
        }
        if line.starts_with([' ', '\t']) {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => name = Some(value.to_string()),
            "version" => version = Some(value.to_string()),
            "requires-dist" => requires.push(value.to_string()),
            _ => {}
        }
    }

    Some(DistributionMetadata {
        name: name?,
        version: version?,
        requires,
    })
}

/// Parse an egg-info `requires.txt` into PEP 508 requirement strings.
///
/// Section headers are `[extra]`, `[:marker]` or `[extra:marker]`; they
/// become markers on the requirements below them.
pub fn parse_requires_txt(content: &str) -> Vec<String> {
    let mut requires = Vec::new();
    let mut section_marker: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            section_marker = section_to_marker(header);
            continue;
        }
        match &section_marker {
            Some(marker) => requires.push(format!("{line} ; {marker}")),
            None => requires.push(line.to_string()),
        }
    }

    requires
}

fn section_to_marker(header: &str) -> Option<String> {
    let (extra, condition) = match header.split_once(':') {
        Some((extra, condition)) => (extra.trim(), condition.trim()),
        None => (header.trim(), ""),
    };
    match (extra.is_empty(), condition.is_empty()) {
        (true, true) => None,
        (false, true) => Some(format!("extra == \"{extra}\"")),
        (true, false) => Some(condition.to_string()),
        (false, false) => Some(format!("({condition}) and extra == \"{extra}\"")),
    }
}
