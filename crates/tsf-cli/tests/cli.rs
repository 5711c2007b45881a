//! End-to-end tests of the `tsf` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn tsf_binary() -> String {
    env!("CARGO_BIN_EXE_tsf").to_string()
}

struct Workspace {
    temp: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("tsf.toml");
        std::fs::write(
            &config,
            format!(
                r#"
database_path = "{db}"
project_root = "{root}"
report_dir = "{reports}"

[categories]
regular = ["aaa", "bbb"]
overtime = ["night"]
"#,
                db = temp.path().join("data/tsf.db").display(),
                root = temp.path().join("notes").display(),
                reports = temp.path().join("reports").display(),
            ),
        )
        .unwrap();
        Self { temp, config }
    }

    fn path(&self) -> &Path {
        self.temp.path()
    }

    fn day_file(&self, date: &str, text: &str) -> PathBuf {
        let mut parts = date.split('-');
        let (year, month, day) = (
            parts.next().unwrap(),
            parts.next().unwrap(),
            parts.next().unwrap(),
        );
        let dir = self.path().join("notes").join(year).join(month);
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join(format!("{day}.tsf"));
        std::fs::write(&file, text).unwrap();
        file
    }

    fn command(&self) -> Command {
        let mut command = Command::new(tsf_binary());
        command
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join("config"))
            .env("XDG_DATA_HOME", self.path().join("share"))
            .arg("--config")
            .arg(&self.config);
        command
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("failed to run tsf")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn check_reports_bad_lines_and_fails() {
    let ws = Workspace::new();
    let file = ws.day_file("2022-02-02", "aaa 1.0 first\nCate 1.0 x\naaa 1.753 y\n");

    let output = ws.run(&["check", file.to_str().unwrap()]);
    assert!(!output.status.success());

    let out = stdout(&output);
    assert!(out.contains(":2: Invalid category. Possible categories: aaa, bbb, night"), "{out}");
    assert!(out.contains(":3: Invalid time format. Use X.Y or XhYm (e.g., 1.5 or 1h30m)"), "{out}");
    assert!(out.ends_with("2022-02-02: 1 items, 2 errors\n"), "{out}");
}

#[test]
fn check_accepts_clean_file() {
    let ws = Workspace::new();
    let file = ws.day_file("2022-02-02", "aaa 1.0 first\nbbb 1h30m second\n");

    let output = ws.run(&["check", file.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "2022-02-02: 2 items, 0 errors\n");
}

#[test]
fn save_then_report() {
    let ws = Workspace::new();
    let file = ws.day_file(
        "2022-02-02",
        "aaa 1.0 first\naaa 1.5 second\naaa 1.75 third\n",
    );

    let output = ws.run(&["save", file.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "Stored 3 items for 2022-02-02 (save)\n");

    let output = ws.run(&["report", "--date", "2022-02-02", "--write"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let out = stdout(&output);
    assert!(
        out.starts_with("For 2022-02-02\nDaily statistics\naaa 4:15\n1.0 first\n1.5 second\n1.75 third\n"),
        "{out}"
    );
    assert!(out.contains("Weekly statistics\naaa 4.25\n"), "{out}");
    assert!(out.contains("Monthly statistics\naaa 4.25\n"), "{out}");

    let report = ws.path().join("reports/report-timesheet-2022-02-02.txt");
    assert!(out.contains(&format!("Report written to {}", report.display())), "{out}");
    assert!(std::fs::read_to_string(report).unwrap().starts_with("For 2022-02-02\n"));
}

#[test]
fn draft_save_only_changes_daily_section() {
    let ws = Workspace::new();
    let file = ws.day_file("2022-02-02", "aaa 1.0 first\n");
    assert!(ws.run(&["save", file.to_str().unwrap()]).status.success());

    std::fs::write(&file, "aaa 2.0 first\n").unwrap();
    let output = ws.run(&["save", "--draft", file.to_str().unwrap()]);
    assert_eq!(stdout(&output), "Stored 1 items for 2022-02-02 (draft)\n");

    let out = stdout(&ws.run(&["report", "--date", "2022-02-02"]));
    assert!(out.contains("Daily statistics\naaa 2:00\n2.0 first\n"), "{out}");
    assert!(out.contains("Weekly statistics\naaa 1.0\n"), "{out}");
}

#[test]
fn categories_marks_overtime() {
    let ws = Workspace::new();
    let output = ws.run(&["categories"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "aaa\nbbb\nnight (overtime)\n");
}

#[test]
fn tokens_prints_encoded_stream() {
    let ws = Workspace::new();
    let file = ws.day_file("2022-02-02", "aaa 1.0 first\n");

    let output = ws.run(&["tokens", "--encoded", file.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "[0,0,3,0,0,0,4,3,1,0,0,4,5,2,0]\n");
}

fn frame(body: &str) -> String {
    format!("Content-Length: {}\r\n\r\n{body}", body.len())
}

#[test]
fn serve_speaks_the_protocol() {
    let ws = Workspace::new();
    let mut child = ws
        .command()
        .arg("serve")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn tsf serve");

    let input = [
        frame(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#),
        frame(r#"{"jsonrpc":"2.0","method":"initialized","params":{}}"#),
        frame(r#"{"jsonrpc":"2.0","id":2,"method":"shutdown"}"#),
        frame(r#"{"jsonrpc":"2.0","method":"exit"}"#),
    ]
    .concat();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("Content-Length: "), "{out}");
    assert!(out.contains("semanticTokensProvider"), "{out}");
    assert!(out.contains(r#""id":2"#), "{out}");
}

#[test]
fn no_subcommand_prints_help() {
    let ws = Workspace::new();
    let output = ws.run(&[]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage: tsf"));
}
