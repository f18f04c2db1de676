//! Shell quoting for echoed commands.

use std::ffi::OsStr;

/// Quote `arg` so a POSIX shell reads it back as one word.
///
/// # Example
///
/// ```
/// use venv_update::shell::quote;
///
/// assert_eq!(quote("--requirement=requirements.txt"), "--requirement=requirements.txt");
/// assert_eq!(quote("it's"), r#"'it'"'"'s'"#);
/// ```
pub fn quote(arg: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c);
    if !arg.is_empty() && arg.chars().all(safe) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r#"'"'"'"#))
}

/// Join a program and its arguments into one shell-readable line.
pub fn command_line<I, S>(program: &OsStr, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    std::iter::once(program.to_string_lossy().into_owned())
        .chain(
            args.into_iter()
                .map(|arg| arg.as_ref().to_string_lossy().into_owned()),
        )
        .map(|word| quote(&word))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words_are_untouched() {
        assert_eq!(quote("pip"), "pip");
        assert_eq!(quote("/home/user/.pip/wheelhouse"), "/home/user/.pip/wheelhouse");
    }

    #[test]
    fn empty_string_is_quoted() {
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn spaces_and_specials_are_quoted() {
        assert_eq!(quote("a b"), "'a b'");
        assert_eq!(quote("x>=1"), "'x>=1'");
    }

    #[test]
    fn command_line_joins_words() {
        let line = command_line(OsStr::new("virtualenv"), ["venv dir", "--quiet"]);
        insta::assert_snapshot!(line, @"virtualenv 'venv dir' --quiet");
    }
}
