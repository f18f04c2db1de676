//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Update a virtualenv to match requirement files, removing anything they
/// no longer need.
#[derive(Debug, Clone, Parser)]
#[command(name = "venv-update")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Environment directory to create or update
    #[arg(value_name = "VIRTUALENV_DIR", default_value = "virtualenv_run")]
    pub virtualenv_dir: PathBuf,

    /// Requirement files describing the desired packages
    #[arg(value_name = "REQUIREMENTS", default_value = "requirements.txt")]
    pub requirements: Vec<PathBuf>,

    /// Arguments passed verbatim to the environment creator
    #[arg(last = true, value_name = "CREATOR_ARGS")]
    pub creator_args: Vec<OsString>,

    /// Program used to create a missing environment
    #[arg(
        long,
        value_name = "PROG",
        env = "VENV_UPDATE_VIRTUALENV",
        default_value = "virtualenv"
    )]
    pub virtualenv: OsString,

    /// Package index to use instead of the installer's default
    #[arg(long, value_name = "URL", env = "PIP_INDEX_URL")]
    pub index_url: Option<String>,

    /// Cache root holding downloads and built wheels [default: ~/.pip]
    #[arg(long, value_name = "DIR", env = "VENV_UPDATE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Run the install sequence inside the activated environment
    #[arg(long, hide = true)]
    pub stage2: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_conventional_layout() {
        let cli = Cli::try_parse_from(["venv-update"]).unwrap();
        assert_eq!(cli.virtualenv_dir, PathBuf::from("virtualenv_run"));
        assert_eq!(cli.requirements, [PathBuf::from("requirements.txt")]);
        assert!(cli.creator_args.is_empty());
        assert!(!cli.stage2);
    }

    #[test]
    fn positionals_and_creator_args() {
        let cli = Cli::try_parse_from([
            "venv-update",
            "venv",
            "requirements.txt",
            "requirements-dev.txt",
            "--",
            "--python=python3.12",
            "--system-site-packages",
        ])
        .unwrap();

        assert_eq!(cli.virtualenv_dir, PathBuf::from("venv"));
        assert_eq!(
            cli.requirements,
            [
                PathBuf::from("requirements.txt"),
                PathBuf::from("requirements-dev.txt")
            ]
        );
        assert_eq!(
            cli.creator_args,
            [
                OsString::from("--python=python3.12"),
                OsString::from("--system-site-packages")
            ]
        );
    }

    #[test]
    fn options_parse() {
        let cli = Cli::try_parse_from([
            "venv-update",
            "--virtualenv",
            "/opt/bin/virtualenv",
            "--index-url",
            "https://pypi.example.test/simple",
            "--cache-dir",
            "/var/cache/pip",
            "--debug",
            "venv",
        ])
        .unwrap();

        assert_eq!(cli.virtualenv, OsString::from("/opt/bin/virtualenv"));
        assert_eq!(
            cli.index_url.as_deref(),
            Some("https://pypi.example.test/simple")
        );
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/var/cache/pip")));
        assert!(cli.debug);
    }

    #[test]
    fn stage2_flag_is_hidden() {
        let help = Cli::command().render_help().to_string();
        assert!(!help.contains("--stage2"));
        assert!(Cli::try_parse_from(["venv-update", "--stage2"]).unwrap().stage2);
    }
}
