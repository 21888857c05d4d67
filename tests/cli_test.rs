use std::io::Write;
use std::process::{Command, Output, Stdio};

use anyhow::Result;
use tempfile::TempDir;

fn vibescript(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vibescript"));
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd
}

fn script_file(dir: &TempDir, source: &str) -> Result<String> {
    let path = dir.path().join("script.vs");
    std::fs::write(&path, source)?;
    Ok(path.to_string_lossy().into_owned())
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn local_run_prints_the_result() -> Result<()> {
    let dir = TempDir::new()?;
    let path = script_file(&dir, "spill_the_tea 2 + 3;\n")?;

    let output = vibescript(&[&path, "--local", "--no-color"]).output()?;
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "5\n");
    Ok(())
}

#[test]
fn dash_reads_the_script_from_stdin() -> Result<()> {
    let mut cmd = vibescript(&["-", "--local", "--no-color"]);
    cmd.stdin(Stdio::piped());
    let mut child = cmd.spawn()?;
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(b"spill_the_tea \"hi\";\n")?;
    let output = child.wait_with_output()?;

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "hi\n");
    Ok(())
}

#[test]
fn preset_inputs_answer_prompts() -> Result<()> {
    let dir = TempDir::new()?;
    let path = script_file(
        &dir,
        "tea name;\nvibe_check name;\nspill_the_tea \"Hey \" + name;\n",
    )?;

    let output = vibescript(&[&path, "--local", "--no-color", "--input", "name=Ferris"]).output()?;
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "Hey Ferris\n");
    Ok(())
}

#[test]
fn missing_input_fails_without_interaction() -> Result<()> {
    let dir = TempDir::new()?;
    let path = script_file(&dir, "tea name;\nvibe_check name;\n")?;

    let output = vibescript(&[&path, "--local", "--no-interaction"]).output()?;
    assert!(!output.status.success());
    assert!(
        stderr_of(&output).contains("input 'name' was left unanswered"),
        "stderr: {}",
        stderr_of(&output)
    );
    Ok(())
}

#[test]
fn runtime_errors_exit_nonzero() -> Result<()> {
    let dir = TempDir::new()?;
    let path = script_file(&dir, "spill_the_tea 1 / 0;\n")?;

    let output = vibescript(&[&path, "--local"]).output()?;
    assert!(!output.status.success());
    assert!(
        stderr_of(&output).contains("Division by zero"),
        "stderr: {}",
        stderr_of(&output)
    );
    Ok(())
}

#[test]
fn tokens_mode_dumps_the_stream() -> Result<()> {
    let dir = TempDir::new()?;
    let path = script_file(&dir, "lit x = 5; // note\n")?;

    let output = vibescript(&[&path, "--tokens"]).output()?;
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Type"), "stdout: {}", stdout);
    assert!(stdout.contains("Identifier"), "stdout: {}", stdout);
    assert!(stdout.contains("Number"), "stdout: {}", stdout);
    assert!(stdout.contains("Comment"), "stdout: {}", stdout);
    Ok(())
}

#[test]
fn highlight_without_color_prints_the_source_verbatim() -> Result<()> {
    let dir = TempDir::new()?;
    let source = "no_cap (x > 1) lets_go\n  spill_the_tea \"big\";\nyeet\n";
    let path = script_file(&dir, source)?;

    let output = vibescript(&[&path, "--highlight", "--no-color"]).output()?;
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), source);
    Ok(())
}

#[test]
fn list_examples_reads_the_configured_directory() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("b.vs"), "spill_the_tea 1;\n")?;
    std::fs::write(dir.path().join("a.vs"), "spill_the_tea 2;\n")?;
    std::fs::write(dir.path().join("readme.txt"), "not a script\n")?;

    let mut cmd = vibescript(&["--list-examples"]);
    cmd.env("EXAMPLES_PATH", dir.path());
    let output = cmd.output()?;

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "a\nb\n");
    Ok(())
}

#[test]
fn malformed_input_flag_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let path = script_file(&dir, "spill_the_tea 1;\n")?;

    let output = vibescript(&[&path, "--local", "--input", "oops"]).output()?;
    assert!(!output.status.success());
    assert!(
        stderr_of(&output).contains("expected NAME=VALUE"),
        "stderr: {}",
        stderr_of(&output)
    );
    Ok(())
}

#[test]
fn bundled_demos_run_clean() -> Result<()> {
    for name in ["hello_world", "variables", "loops", "functions", "conditionals"] {
        let path = format!("{}/demos/{}.vs", env!("CARGO_MANIFEST_DIR"), name);
        let output = vibescript(&[&path, "--local", "--no-color"]).output()?;
        assert!(
            output.status.success(),
            "{} failed: {}",
            name,
            stderr_of(&output)
        );
        assert!(!stdout_of(&output).is_empty(), "{} printed nothing", name);
    }
    Ok(())
}

#[test]
fn greeting_demo_answers_both_checks() -> Result<()> {
    let path = format!("{}/demos/greeting.vs", env!("CARGO_MANIFEST_DIR"));
    let output = vibescript(&[
        &path,
        "--local",
        "--no-color",
        "--input",
        "name=Ferris",
        "--input",
        "snack=chips",
    ])
    .output()?;

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Hey Ferris!"), "stdout: {}", stdout);
    assert!(
        stdout.contains("Ferris stans chips. no cap."),
        "stdout: {}",
        stdout
    );
    Ok(())
}
