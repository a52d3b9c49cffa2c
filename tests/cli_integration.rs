use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_repo-dump").to_string()
}

#[test]
fn cli_dump_restore_list_roundtrip() {
    let dir = tempdir().unwrap();
    let repo = dir.path().join("project");
    fs::create_dir_all(repo.join("src")).unwrap();
    fs::write(repo.join("src/main.rs"), "fn main() {}\n").unwrap();
    fs::write(repo.join("README.md"), "# project").unwrap();
    fs::write(repo.join("logo.png"), [0x89u8, b'P', b'N', b'G', 0, 0]).unwrap();
    let dump = dir.path().join("out/dump.md");
    let dest = dir.path().join("restored");

    let st = Command::new(bin())
        .args(["--quiet", "dump"])
        .arg(&repo)
        .arg("--output")
        .arg(&dump)
        .status()
        .unwrap();
    assert!(st.success());
    assert!(fs::read_to_string(&dump).unwrap().starts_with("# Repository: project\n"));

    let out = Command::new(bin()).arg("list").arg(&dump).output().unwrap();
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "README.md\nsrc/main.rs\nlogo.png\n"
    );

    let st = Command::new(bin())
        .args(["--quiet", "restore"])
        .arg(&dump)
        .arg("--dest")
        .arg(&dest)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(fs::read_to_string(dest.join("src/main.rs")).unwrap(), "fn main() {}\n");
    assert_eq!(fs::read_to_string(dest.join("README.md")).unwrap(), "# project\n");
    assert!(!dest.join("logo.png").exists());

    // Existing destination needs --yes when there is no terminal to ask
    let st = Command::new(bin())
        .args(["--quiet", "restore", "--yes", "--touch-binary"])
        .arg(&dump)
        .arg("--dest")
        .arg(&dest)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(fs::read(dest.join("logo.png")).unwrap(), Vec::<u8>::new());
}

#[test]
fn cli_missing_repo_fails() {
    let dir = tempdir().unwrap();
    let dump = dir.path().join("dump.md");

    let out = Command::new(bin())
        .arg("dump")
        .arg(dir.path().join("nope"))
        .arg("-o")
        .arg(&dump)
        .output()
        .unwrap();

    assert!(!out.status.success());
    assert!(!dump.exists());
}

#[test]
fn cli_missing_input_fails() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("dest");

    let out = Command::new(bin())
        .arg("restore")
        .arg(dir.path().join("missing.md"))
        .arg("-d")
        .arg(&dest)
        .output()
        .unwrap();

    assert!(!out.status.success());
    assert!(!dest.exists());
}
