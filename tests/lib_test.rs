//! Library integration tests.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use venv_update::inventory::InventorySource;
use venv_update::requirements::{load_requirement_files, PackageName};
use venv_update::VenvUpdateError;

#[test]
fn error_types_are_public() {
    let err = VenvUpdateError::InstallerFailed {
        command: "pip install -r requirements.txt".into(),
        code: 3,
    };
    assert!(err.to_string().contains("pip install"));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> venv_update::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use venv_update::cli::Cli;

    let cli = Cli::parse_from(["venv-update", "env", "a.txt", "b.txt"]);
    assert_eq!(cli.virtualenv_dir, PathBuf::from("env"));
    assert_eq!(cli.requirements.len(), 2);
}

#[test]
fn nested_requirement_files_resolve_against_snapshot() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("requirements.txt"),
        "-r requirements-base.txt\nflask\n",
    )
    .unwrap();
    fs::write(temp.path().join("requirements-base.txt"), "Six==1.16.0\n").unwrap();

    let site = temp.path().join("venv/lib/python3.12/site-packages");
    for (name, version, requires) in [
        ("Flask", "3.0.0", "Requires-Dist: click\n"),
        ("click", "8.1.7", ""),
        ("six", "1.16.0", ""),
        ("stray", "0.1", ""),
    ] {
        let dir = site.join(format!("{name}-{version}.dist-info"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("METADATA"),
            format!("Name: {name}\nVersion: {version}\n{requires}"),
        )
        .unwrap();
    }

    let entries = load_requirement_files(&[temp.path().join("requirements.txt")]).unwrap();
    let env = venv_update::environment::Environment::new(temp.path().join("venv"));
    let inventory = env.site_packages().snapshot().unwrap();
    let closure = venv_update::resolver::resolve(&entries, &inventory).unwrap();

    let uninstall = venv_update::reconcile::reconcile(
        &inventory.names(),
        &closure.names(),
        &BTreeSet::new(),
        &venv_update::reconcile::protected_names(),
    );
    assert_eq!(uninstall, BTreeSet::from([PackageName::new("stray")]));
}
