//! Requirement file loading.
//!
//! Turns an ordered list of requirement files into an ordered list of
//! [`RequirementEntry`]. Installer options inside the files are recognised
//! and skipped: the installer reads the files itself, this loader only
//! needs the requirements.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VenvUpdateError};

use super::entry::RequirementEntry;

/// Options that pull in another requirement file.
const INCLUDE_OPTIONS: &[&str] = &["-r", "--requirement"];

/// Options whose file is a constraint list, not requirements.
const CONSTRAINT_OPTIONS: &[&str] = &["-c", "--constraint"];

const EDITABLE_OPTIONS: &[&str] = &["-e", "--editable"];

/// Installer options that take a value and do not affect resolution.
const VALUE_OPTIONS: &[&str] = &[
    "-i",
    "--index-url",
    "--extra-index-url",
    "-f",
    "--find-links",
    "--trusted-host",
    "--only-binary",
    "--no-binary",
    "--use-feature",
];

/// Installer flags that do not affect resolution.
const FLAG_OPTIONS: &[&str] = &["--no-index", "--pre", "--prefer-binary", "--require-hashes"];

/// Load every requirement from `paths`, in file order.
///
/// Nested `-r` includes are expanded in place, relative to the including
/// file.
pub fn load_requirement_files(paths: &[PathBuf]) -> Result<Vec<RequirementEntry>> {
    let mut entries = Vec::new();
    let mut stack = Vec::new();
    for path in paths {
        load_into(path, &mut stack, &mut entries)?;
    }
    tracing::debug!(
        "Loaded {} requirement(s) from {} file(s)",
        entries.len(),
        paths.len()
    );
    Ok(entries)
}

/// Parse requirement file `content` that lives at `path`.
///
/// Includes are not followed; use [`load_requirement_files`] for that.
pub fn parse_requirements(content: &str, path: &Path) -> Result<Vec<RequirementEntry>> {
    let mut entries = Vec::new();
    for (line_number, line) in logical_lines(content) {
        if let Some(Line::Requirement(entry)) = parse_line(&line, path, line_number)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn load_into(
    path: &Path,
    stack: &mut Vec<PathBuf>,
    entries: &mut Vec<RequirementEntry>,
) -> Result<()> {
    let content = fs::read_to_string(path).map_err(|source| VenvUpdateError::RequirementsFile {
        path: path.to_path_buf(),
        source,
    })?;
    let identity = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if stack.contains(&identity) {
        return Err(VenvUpdateError::Parse {
            path: path.to_path_buf(),
            line: 0,
            message: "requirement file includes itself".to_string(),
        });
    }
    stack.push(identity);

    for (line_number, line) in logical_lines(&content) {
        match parse_line(&line, path, line_number)? {
            Some(Line::Requirement(entry)) => entries.push(entry),
            Some(Line::Include(target)) => {
                let nested = path
                    .parent()
                    .map_or_else(|| PathBuf::from(&target), |dir| dir.join(&target));
                load_into(&nested, stack, entries)?;
            }
            None => {}
        }
    }

    stack.pop();
    Ok(())
}

enum Line {
    Requirement(RequirementEntry),
    Include(String),
}

fn parse_line(line: &str, path: &Path, line_number: usize) -> Result<Option<Line>> {
    let parse_error = |message: &str| VenvUpdateError::Parse {
        path: path.to_path_buf(),
        line: line_number,
        message: message.to_string(),
    };

    if !line.starts_with('-') {
        let requirement = strip_per_requirement_options(line);
        return RequirementEntry::parse(requirement)
            .map(|entry| Some(Line::Requirement(entry)))
            .ok_or_else(|| parse_error(line));
    }

    let (flag, value) = split_option(line);
    if FLAG_OPTIONS.contains(&flag) {
        return Ok(None);
    }

    let known_value_option = INCLUDE_OPTIONS.contains(&flag)
        || CONSTRAINT_OPTIONS.contains(&flag)
        || EDITABLE_OPTIONS.contains(&flag)
        || VALUE_OPTIONS.contains(&flag);
    if !known_value_option {
        return Err(parse_error(line));
    }
    let value = value.ok_or_else(|| parse_error(line))?;

    if INCLUDE_OPTIONS.contains(&flag) {
        Ok(Some(Line::Include(value.to_string())))
    } else if EDITABLE_OPTIONS.contains(&flag) {
        Ok(Some(Line::Requirement(RequirementEntry::editable(value))))
    } else {
        Ok(None)
    }
}

/// Split `--opt=value`, `--opt value`, `-o value` and `-ovalue`.
fn split_option(line: &str) -> (&str, Option<&str>) {
    fn non_empty(value: &str) -> Option<&str> {
        let value = value.trim();
        (!value.is_empty()).then_some(value)
    }

    if line.starts_with("--") {
        let end = line
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(line.len());
        let value = line[end..].trim_start_matches(|c: char| c == '=' || c.is_whitespace());
        (&line[..end], non_empty(value))
    } else {
        let end = line.char_indices().nth(2).map_or(line.len(), |(i, _)| i);
        (&line[..end], non_empty(&line[end..]))
    }
}

/// Drop trailing per-requirement installer options such as `--hash=...`.
fn strip_per_requirement_options(line: &str) -> &str {
    line.find(" --")
        .or_else(|| line.find("\t--"))
        .map_or(line, |index| &line[..index])
        .trim()
}

/// Join `\` continuations and strip comments, yielding
/// `(first physical line number, text)` for each non-empty logical line.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending = String::new();
    let mut start = 0;

    for (index, physical) in content.lines().enumerate() {
        if pending.is_empty() {
            start = index + 1;
        }
        let stripped = strip_comment(physical);
        if let Some(continued) = stripped.strip_suffix('\\') {
            pending.push_str(continued);
            continue;
        }
        pending.push_str(stripped);
        let logical = pending.trim().to_string();
        pending.clear();
        if !logical.is_empty() {
            lines.push((start, logical));
        }
    }

    let trailing = pending.trim();
    if !trailing.is_empty() {
        lines.push((start, trailing.to_string()));
    }
    lines
}

fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    let bytes = line.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        if *byte == b'#' && index > 0 && bytes[index - 1].is_ascii_whitespace() {
            return line[..index].trim_end();
        }
    }
    line.trim_end()
}
