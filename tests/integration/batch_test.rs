use crate::{run, stdout_of, temp_file};

const TASKS: &str = r#"[
    {"input": [[1, 2, 3]], "target": [2, 4, 6]},
    {"input": [[1, 2, 3], [4, 5, 6]], "target": [5, 7, 9]},
    {"input": [[1, 2, 3]], "target": [100, 200, 300]},
    {"input": [], "target": 1}
]"#;

#[test]
fn test_batch_summary() {
    let path = temp_file("batch.json", TASKS);
    let output = run(&[
        "batch",
        path.to_str().unwrap(),
        "-j",
        "2",
        "--max-length",
        "2",
    ]);
    let _ = std::fs::remove_file(&path);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = stdout_of(&output);
    assert!(stdout.contains("task 0: solved (depth 0) map(* 2)([1, 2, 3])"));
    assert!(stdout.contains("task 2: exhausted"));
    assert!(stdout.contains("task 3: failed"));
    assert!(stdout.contains("Tasks: 4 (solved 2, exhausted 1, cancelled 0, failed 1)"));
    assert!(stdout.contains("Search totals:"));
}

#[test]
fn test_batch_json() {
    let path = temp_file("batch-json.json", TASKS);
    let output = run(&[
        "batch",
        path.to_str().unwrap(),
        "--max-length",
        "2",
        "--json",
    ]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["tasks"].as_array().map(Vec::len), Some(4));
    assert_eq!(document["tasks"][1]["outcome"], "solved");
    assert_eq!(document["tasks"][3]["outcome"], "failed");
    assert_eq!(document["summary"]["solved"], 2);
    assert_eq!(document["summary"]["depth_histogram"]["0"], 2);
    assert!(document["statistics"]["children_generated"].as_u64().unwrap() > 0);
}

#[test]
fn test_batch_missing_file() {
    let output = run(&["batch", "/nonexistent/flexcoder/tasks.json"]);
    assert_eq!(output.status.code(), Some(1));
}
