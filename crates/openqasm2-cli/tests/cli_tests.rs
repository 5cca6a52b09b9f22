//! End-to-end tests for the `qasm2` binary.
//!
//! Each test writes its input to a temporary directory and runs the built
//! binary, checking exit status and output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

const BELL: &str = r#"OPENQASM 2.0;
include "qelib1.inc";
qreg q[2];
creg c[2];
h q[0];
cx q[0],q[1];
measure q -> c;
"#;

fn qasm2() -> Command {
    Command::new(env!("CARGO_BIN_EXE_qasm2"))
}

fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

mod check {
    use super::*;

    #[test]
    fn test_check_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "bell.qasm", BELL);

        let output = qasm2().arg("check").arg(&path).output().unwrap();

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let out = stdout(&output);
        assert!(out.contains("is valid"));
        assert!(out.contains("Statements: 7"));
        assert!(out.contains("Qubits: 2, Clbits: 2"));
        assert!(out.contains("Gate calls: 2"));
    }

    #[test]
    fn test_check_json_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "bell.qasm", BELL);

        let output = qasm2().args(["check", "--json"]).arg(&path).output().unwrap();

        assert!(output.status.success());
        let summary: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(summary["valid"], true);
        assert_eq!(summary["qubits"], 2);
        assert_eq!(summary["gate_calls"], 2);
    }

    #[test]
    fn test_check_json_error_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "bad.qasm", "qreg q[2];\nx q[2];\n");

        let output = qasm2().args(["check", "--json"]).arg(&path).output().unwrap();

        assert_eq!(output.status.code(), Some(1));
        let payload: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(payload["code"], "IndexOutOfRange");
        assert_eq!(payload["line"], 2);
        assert_eq!(payload["column"], 3);
        assert!(stderr(&output).contains("Error:"));
    }

    #[test]
    fn test_check_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "bad.qasm", "qreg q[1]\nh q;");

        let output = qasm2().arg("check").arg(&path).output().unwrap();

        assert_eq!(output.status.code(), Some(1));
        let err = stderr(&output);
        assert!(err.contains("line 2, column 1"), "stderr: {err}");
        assert!(err.contains("expected `;`"), "stderr: {err}");
    }

    #[test]
    fn test_check_missing_file() {
        let output = qasm2()
            .args(["check", "/nonexistent/qasm2_test_input.qasm"])
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("File not found"));
    }

    #[test]
    fn test_check_reads_stdin() {
        let mut child = qasm2()
            .args(["check", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(BELL.as_bytes())
            .unwrap();
        let output = child.wait_with_output().unwrap();

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("Statements: 7"));
    }

    #[test]
    fn test_no_core_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "bell.qasm", BELL);

        let output = qasm2()
            .args(["--no-core", "check", "--json"])
            .arg(&path)
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        let payload: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(payload["code"], "UnknownGate");
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "bell.qasm", BELL);
        let config = write_input(dir.path(), "qasm2.yaml", "core: false\n");

        let output = qasm2()
            .arg("--config")
            .arg(&config)
            .arg("check")
            .arg(&path)
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("UnknownGate"));

        // An empty mapping keeps the defaults.
        let config = write_input(dir.path(), "defaults.yaml", "{}\n");
        let output = qasm2()
            .arg("--config")
            .arg(&config)
            .arg("check")
            .arg(&path)
            .output()
            .unwrap();
        assert!(output.status.success(), "stderr: {}", stderr(&output));
    }
}

mod ast {
    use super::*;

    #[test]
    fn test_ast_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "bell.qasm", BELL);

        let output = qasm2().arg("ast").arg(&path).output().unwrap();

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let ast: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        let statements = ast["statements"].as_array().unwrap();
        assert_eq!(statements.len(), 7);
        assert_eq!(statements[0]["Version"]["major"], 2);
        assert_eq!(statements[4]["GateCall"]["name"], "h");
    }

    #[test]
    fn test_ast_pretty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "bell.qasm", BELL);

        let output = qasm2().args(["ast", "--pretty"]).arg(&path).output().unwrap();

        assert!(output.status.success());
        assert!(stdout(&output).lines().count() > 7);
    }
}

mod fmt {
    use super::*;

    #[test]
    fn test_fmt_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "messy.qasm", "qreg q[2];h q[0];cx q[0],q[1];");

        let output = qasm2().arg("fmt").arg(&path).output().unwrap();

        assert!(output.status.success());
        assert_eq!(stdout(&output), "qreg q[2];\nh q[0];\ncx q[0], q[1];\n");
    }

    #[test]
    fn test_fmt_to_file_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "bell.qasm", BELL);
        let once = dir.path().join("once.qasm");
        let twice = dir.path().join("twice.qasm");

        let output = qasm2().arg("fmt").arg(&path).arg("-o").arg(&once).output().unwrap();
        assert!(output.status.success());
        let output = qasm2().arg("fmt").arg(&once).arg("-o").arg(&twice).output().unwrap();
        assert!(output.status.success());

        let once = fs::read_to_string(once).unwrap();
        assert_eq!(once, fs::read_to_string(twice).unwrap());
        assert!(once.contains("cx q[0], q[1];"));
    }
}

mod gates {
    use super::*;

    #[test]
    fn test_gates_lists_library() {
        let output = qasm2().arg("gates").output().unwrap();

        assert!(output.status.success());
        let out = stdout(&output);
        assert!(out.contains("40 preloaded gates"));
        assert!(out.contains("ccx"));
        assert!(out.contains("opaque"));
    }

    #[test]
    fn test_gates_without_core() {
        let output = qasm2().args(["gates", "--no-core"]).output().unwrap();

        assert!(output.status.success());
        assert!(stdout(&output).contains("no gates are preloaded"));
    }
}

mod eval {
    use super::*;

    fn eval(args: &[&str]) -> Output {
        qasm2().arg("eval").args(args).output().unwrap()
    }

    #[test]
    fn test_eval_constant() {
        let output = eval(&["2 * 3 + 1"]);
        assert!(output.status.success());
        assert_eq!(stdout(&output).trim(), "7");
    }

    #[test]
    fn test_eval_negative_leading() {
        let output = eval(&["-2^2"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(stdout(&output).trim(), "4");
    }

    #[test]
    fn test_eval_with_bindings() {
        let output = eval(&["theta * phi", "--bind", "theta=3", "-b", "phi=pi/pi"]);
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(stdout(&output).trim(), "3");
    }

    #[test]
    fn test_eval_unbound_identifier() {
        let output = eval(&["theta / 2"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("'theta' is unbound"));
    }

    #[test]
    fn test_eval_bad_binding() {
        let output = eval(&["1", "--bind", "theta"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("NAME=VALUE"));
    }
}

#[test]
fn test_version() {
    let output = qasm2().arg("version").output().unwrap();

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(env!("CARGO_PKG_VERSION")));
    assert!(out.contains("qelib1.inc"));
}

#[test]
fn test_verbose_flags_accepted() {
    for flag in ["-v", "-vv", "-vvv"] {
        let output = qasm2().args([flag, "version"]).output().unwrap();
        assert!(output.status.success(), "{flag}");
    }
}

#[test]
fn test_missing_subcommand() {
    let output = qasm2().output().unwrap();
    assert!(!output.status.success());
}
