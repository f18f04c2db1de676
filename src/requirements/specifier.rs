//! Version specifiers.
//!
//! Just enough of the Python version grammar to tell whether an installed
//! version satisfies a requirement. Choosing versions is the installer's
//! job; this is only used to notice conflicts.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static SPECIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(~=|===|==|!=|<=|>=|<|>)\s*([A-Za-z0-9_.*+!-]+)\s*$")
        .expect("specifier regex is valid")
});

/// Pre/post release phase, in sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Dev,
    Alpha,
    Beta,
    Candidate,
    Final,
    Post,
}

/// A parsed package version.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    release: Vec<u64>,
    phase: Phase,
    phase_number: u64,
    rest: String,
}

impl Version {
    /// Parse a version string. Never fails: unparseable tails sort lexically.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let public = trimmed
            .split_once('+')
            .map_or(trimmed, |(public, _local)| public);
        let public = public.strip_prefix(['v', 'V']).unwrap_or(public);
        let public = public
            .split_once('!')
            .map_or(public, |(_epoch, version)| version);

        let mut release = Vec::new();
        let mut consumed = 0;
        for (index, segment) in public.split('.').enumerate() {
            let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                break;
            }
            release.push(digits.parse().unwrap_or(u64::MAX));
            consumed += digits.len() + usize::from(index > 0);
            if digits.len() != segment.len() {
                break;
            }
        }

        let tail = public[consumed.min(public.len())..]
            .trim_start_matches(['.', '-', '_'])
            .to_lowercase();
        let (phase, phase_number, rest) = parse_tail(&tail);

        Self {
            raw: trimmed.to_string(),
            release,
            phase,
            phase_number,
            rest,
        }
    }

    /// The original string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn release_starts_with(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, part)| self.release.get(i).copied().unwrap_or(0) == *part)
    }
}

fn parse_tail(tail: &str) -> (Phase, u64, String) {
    const PHASES: &[(&str, Phase)] = &[
        ("dev", Phase::Dev),
        ("alpha", Phase::Alpha),
        ("beta", Phase::Beta),
        ("preview", Phase::Candidate),
        ("pre", Phase::Candidate),
        ("post", Phase::Post),
        ("rev", Phase::Post),
        ("rc", Phase::Candidate),
        ("a", Phase::Alpha),
        ("b", Phase::Beta),
        ("c", Phase::Candidate),
        ("r", Phase::Post),
    ];

    if tail.is_empty() {
        return (Phase::Final, 0, String::new());
    }
    for (label, phase) in PHASES {
        if let Some(after) = tail.strip_prefix(label) {
            let after = after.trim_start_matches(['.', '-', '_']);
            let digits: String = after.chars().take_while(char::is_ascii_digit).collect();
            let number = digits.parse().unwrap_or(0);
            return (*phase, number, after[digits.len()..].to_string());
        }
    }
    (Phase::Final, 0, tail.to_string())
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.release.len().max(other.release.len());
        for i in 0..width {
            let left = self.release.get(i).copied().unwrap_or(0);
            let right = other.release.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        self.phase
            .cmp(&other.phase)
            .then(self.phase_number.cmp(&other.phase_number))
            .then_with(|| self.rest.cmp(&other.rest))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Comparison operator of a single specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Compatible,
    Arbitrary,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
}

impl Operator {
    fn as_str(self) -> &'static str {
        match self {
            Self::Compatible => "~=",
            Self::Arbitrary => "===",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
        }
    }

    fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "~=" => Self::Compatible,
            "===" => Self::Arbitrary,
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "<=" => Self::LessEqual,
            ">=" => Self::GreaterEqual,
            "<" => Self::Less,
            ">" => Self::Greater,
            _ => return None,
        })
    }
}

/// One `OP VERSION` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub operator: Operator,
    pub version: String,
}

impl Specifier {
    /// Parse a single clause such as `>=1.0` or `==2.*`.
    pub fn parse(clause: &str) -> Option<Self> {
        let caps = SPECIFIER_RE.captures(clause)?;
        let operator = Operator::parse(&caps[1])?;
        let version = caps[2].to_string();
        if version.contains('*')
            && !(matches!(operator, Operator::Equal | Operator::NotEqual) && version.ends_with(".*"))
        {
            return None;
        }
        Some(Self { operator, version })
    }

    /// Whether `candidate` satisfies this clause.
    pub fn contains(&self, candidate: &Version) -> bool {
        if self.operator == Operator::Arbitrary {
            return candidate.as_str().eq_ignore_ascii_case(&self.version);
        }

        if let Some(prefix) = self.version.strip_suffix(".*") {
            let prefix = Version::parse(prefix);
            let matched = candidate.release_starts_with(&prefix.release);
            return match self.operator {
                Operator::NotEqual => !matched,
                _ => matched,
            };
        }

        let target = Version::parse(&self.version);
        match self.operator {
            Operator::Equal => *candidate == target,
            Operator::NotEqual => *candidate != target,
            Operator::LessEqual => *candidate <= target,
            Operator::GreaterEqual => *candidate >= target,
            Operator::Less => *candidate < target,
            Operator::Greater => *candidate > target,
            Operator::Compatible => {
                let keep = target
                    .release
                    .len()
                    .saturating_sub(1)
                    .max(1)
                    .min(target.release.len());
                *candidate >= target && candidate.release_starts_with(&target.release[..keep])
            }
            Operator::Arbitrary => candidate.as_str().eq_ignore_ascii_case(&self.version),
        }
    }

    /// Whether this clause pins one exact version.
    pub fn is_pin(&self) -> bool {
        matches!(self.operator, Operator::Equal | Operator::Arbitrary) && !self.version.contains('*')
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.as_str(), self.version)
    }
}

/// A comma-separated set of clauses; a version must satisfy all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecifierSet(Vec<Specifier>);

impl SpecifierSet {
    /// Parse `>=1.0,<2` style text. Empty text is the unconstrained set.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .unwrap_or(text);
        if text.trim().is_empty() {
            return Some(Self::default());
        }
        text.split(',')
            .map(Specifier::parse)
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `version` satisfies every clause.
    pub fn contains(&self, version: &Version) -> bool {
        self.0.iter().all(|spec| spec.contains(version))
    }

    /// The exact version this set pins, if it is a single `==` clause.
    pub fn pinned_version(&self) -> Option<&str> {
        match self.0.as_slice() {
            [only] if only.is_pin() => Some(&only.version),
            _ => None,
        }
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(","))
    }
}
