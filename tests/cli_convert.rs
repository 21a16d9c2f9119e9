use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn convert_writes_html_next_to_input() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("release.notes.md");
    std::fs::write(&input, "# Release notes\n\n- fixed things\n").expect("write input");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mdexport"));
    cmd.current_dir(dir.path())
        .env_remove("MDEXPORT_CONFIG_FILE")
        .arg("convert")
        .arg(&input)
        .assert()
        .success();

    let output = dir.path().join("release.notes.html");
    let html = std::fs::read_to_string(&output).expect("html output should exist");
    assert!(html.contains("<h1 id=\"release-notes\">Release notes</h1>"));
    assert!(html.contains("<title>Release notes</title>"));
}

#[test]
fn convert_honours_output_path() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("in.md");
    let output = dir.path().join("custom.html");
    std::fs::write(&input, "plain text\n").expect("write input");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mdexport"));
    cmd.current_dir(dir.path())
        .env_remove("MDEXPORT_CONFIG_FILE")
        .args(["convert", "--format", "html", "--output"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    assert!(output.exists());
    assert!(!dir.path().join("in.html").exists());
}

#[test]
fn convert_fails_for_missing_pdf_engine() {
    let dir = TempDir::new().expect("temp dir");
    let input = dir.path().join("in.md");
    std::fs::write(&input, "# Title\n").expect("write input");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mdexport"));
    cmd.current_dir(dir.path())
        .env_remove("MDEXPORT_CONFIG_FILE")
        .args(["convert", "--format", "pdf", "--pdf-engine-path", "/nonexistent/wkhtmltopdf"])
        .arg(&input)
        .assert()
        .failure()
        .stdout(contains("PDF engine unavailable"));

    assert!(!dir.path().join("in.pdf").exists());
}

#[test]
fn convert_rejects_unknown_format() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mdexport"));
    cmd.args(["convert", "--format", "docx", "in.md"])
        .assert()
        .failure()
        .stderr(contains("docx"));
}

#[test]
fn invalid_configuration_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let config_file = dir.path().join("bad.toml");
    std::fs::write(&config_file, "[uploads]\nmax_request_bytes = 0\n").expect("write config");
    let input = dir.path().join("in.md");
    std::fs::write(&input, "# Title\n").expect("write input");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mdexport"));
    cmd.current_dir(dir.path())
        .env_remove("MDEXPORT_CONFIG_FILE")
        .arg("--config-file")
        .arg(&config_file)
        .arg("convert")
        .arg(&input)
        .assert()
        .failure()
        .stdout(contains("configuration error"))
        .stdout(contains("uploads.max_request_bytes"));

    assert!(!dir.path().join("in.html").exists());
}
