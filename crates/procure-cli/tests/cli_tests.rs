// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::path::Path;
use std::process::{Command, Output};
use std::thread;
use tiny_http::{Header, Response, Server};

fn procure(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_procure"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("PROCURE_CONFIG_PATH")
        .output()
        .expect("procure binary should run")
}

fn write_config(dir: &Path, base_url: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        format!("version = 1\n[api]\nbase_url = \"{base_url}\"\ntimeout = \"2s\"\n"),
    )
    .expect("config should be writable");
    path
}

#[test]
fn health_command_prints_server_status() {
    let server = Server::http("127.0.0.1:0").expect("mock server should start");
    let addr = format!("http://{}", server.server_addr());
    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let org = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("X-Org-Id"))
            .map(|header| header.value.as_str().to_owned());
        let url = request.url().to_owned();
        let body = r#"{"status":"UP","timestamp":"2024-04-01T00:00:00Z"}"#;
        let response = Response::from_string(body).with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        );
        request.respond(response).expect("response should succeed");
        (url, org)
    });

    let temp = tempfile::tempdir().expect("tempdir");
    let config = write_config(temp.path(), &addr);
    let output = procure(&config, &["--org", "demo-org-b", "--health"]);
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("status: UP"), "{stdout}");
    assert!(stdout.contains("timestamp: 2024-04-01T00:00:00Z"));

    let (url, org) = handle.join().expect("server thread should join");
    assert_eq!(url, "/api/health");
    assert_eq!(org.as_deref(), Some("demo-org-b"));
}

#[test]
fn unreachable_api_exits_with_actionable_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = write_config(temp.path(), "http://127.0.0.1:1");
    let output = procure(&config, &["--health"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("health check failed"), "{stderr}");
    assert!(stderr.contains("cannot reach http://127.0.0.1:1"), "{stderr}");
}

#[test]
fn check_validates_config_without_calling_the_api() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = write_config(temp.path(), "http://127.0.0.1:1");
    let output = procure(&config, &["--check"]);
    assert!(output.status.success(), "{output:?}");

    let bad = temp.path().join("bad.toml");
    std::fs::write(&bad, "version = 1\n[api]\nbase_url = \"ftp://example.com\"\n")
        .expect("config should be writable");
    let output = procure(&bad, &["--check"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid [api] config"));
}

#[test]
fn missing_command_is_reported() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = write_config(temp.path(), "http://127.0.0.1:1");
    let output = procure(&config, &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no command given"));
}

#[test]
fn print_example_config_emits_versioned_template() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("config.toml");
    let output = procure(&config, &["--print-example-config"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("version = 1"));
    assert!(stdout.contains("[identity]"));
    assert!(stdout.contains(&config.display().to_string()));
}
