use crate::{run, stdout_of, temp_file};

#[test]
fn test_synth_map() {
    let output = run(&["synth", "--input", "[1, 2, 3]", "--target", "[2, 4, 6]"]);

    assert!(
        output.status.success(),
        "Command failed with status: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Solution found at depth 0"), "stdout: {}", stdout);
    assert!(stdout.contains("map(* 2)([1, 2, 3])"), "stdout: {}", stdout);
    assert!(stdout.contains("Output: [2, 4, 6]"), "stdout: {}", stdout);
}

#[test]
fn test_synth_two_inputs_json() {
    let output = run(&[
        "synth",
        "--input",
        "[1, 2, 3]",
        "--input",
        "[4, 5, 6]",
        "--target",
        "[5, 7, 9]",
        "--json",
    ]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"], "solved");
    assert_eq!(report["depth"], 0);
    assert_eq!(report["program"][0]["combinator"], "zip_with(+)");
    assert_eq!(report["program"][0]["indices"], serde_json::json!([0, 1]));
    assert_eq!(report["composition"], "zip_with(+)([1, 2, 3], [4, 5, 6])");
    assert_eq!(report["output"], "[5, 7, 9]");
}

#[test]
fn test_synth_exhausted() {
    let output = run(&[
        "synth",
        "--input",
        "[1, 2, 3]",
        "--target",
        "[100, 200, 300]",
        "--beam-size",
        "2",
        "--max-length",
        "2",
        "--json",
    ]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"], "exhausted");
    assert!(report["composition"].is_null());
    assert_eq!(report["statistics"]["beam_widths"], serde_json::json!([2, 4, 8]));
}

#[test]
fn test_synth_invalid_json_fails() {
    let output = run(&["synth", "--input", "[1, 2", "--target", "3"]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid JSON"));
}

#[test]
fn test_synth_zero_beam_fails() {
    let output = run(&[
        "synth",
        "--input",
        "[1]",
        "--target",
        "1",
        "--beam-size",
        "0",
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_grammar_listing() {
    let output = run(&["grammar"]);

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("map(+ 1)"));
    assert!(stdout.contains("copy_state_tuple"));
    assert!(stdout.contains("51 combinators"));
}

#[test]
fn test_grammar_from_file() {
    let path = temp_file(
        "grammar.json",
        r#"{"definitions": ["take", "length"], "take_drop_numbers": [2]}"#,
    );
    let output = run(&["grammar", "--grammar", path.to_str().unwrap()]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("take(2)"));
    assert!(stdout.contains("3 combinators"));
}

#[test]
fn test_invalid_grammar_fails() {
    let path = temp_file("bad-grammar.json", r#"{"index_slots": 0}"#);
    let output = run(&["grammar", "--grammar", path.to_str().unwrap()]);
    let _ = std::fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid grammar"));
}
