mod batch_test;
mod synth_test;

use std::path::PathBuf;
use std::process::{Command, Output};

pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_flexcoder"))
}

pub fn run(args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute flexcoder")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Write `contents` to a fresh file under the system temp directory
pub fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "flexcoder-{}-{}",
        std::process::id(),
        name
    ));
    std::fs::write(&path, contents).expect("Failed to write temp file");
    path
}
