use assert_cmd::Command;
use camino::Utf8PathBuf;
use fsmcheck_test_util::{ServiceFixture, StubServer};
use predicates::prelude::*;
use std::net::TcpListener;
use tempfile::TempDir;

#[allow(deprecated)]
fn fsmcheck_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fsmcheck").unwrap();
    cmd.current_dir(dir.path()).env_remove("FSMCHECK_PASSWORD");
    cmd
}

fn root(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
}

fn workspace(config: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("fsmcheck.toml"), config).unwrap();
    std::fs::write(dir.path().join("module.fsm"), b"PK\x03\x04").unwrap();
    dir
}

fn config_for(server: &StubServer, extra: &str) -> String {
    format!(
        "server_url = \"{}\"\nretry_delay_secs = 0\n{extra}",
        server.url()
    )
}

fn clean_service() -> ServiceFixture {
    ServiceFixture::clean(&[
        "IMPL_USAGE",
        "RUNTIME_USAGE",
        "NON_ISOLATED_API",
        "INTERNAL_API",
        "DEPRECATED_API",
    ])
}

#[test]
fn no_files_skips_without_server() {
    let dir = tempfile::tempdir().unwrap();
    fsmcheck_cmd(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No FirstSpirit module files (.fsm) were configured. -> skipping check.",
        ));
}

#[test]
fn clean_module_passes_and_writes_report() {
    let server = StubServer::for_fixture(clean_service()).unwrap();
    let dir = workspace(&config_for(&server, ""));

    fsmcheck_cmd(&dir)
        .args(["check", "module.fsm"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Isolation check passed! ComplianceLevel: 'DEFAULT'",
        ));

    let report = std::fs::read_to_string(
        root(&dir).join("build/fsmchecker-reports/TEST-complianceCheck.xml"),
    )
    .unwrap();
    assert!(report.contains("<testsuite name=\"MINIMAL | IMPL_USAGE\""), "{report}");
    assert_eq!(report.matches("<testcase name=\"noViolations\"/>").count(), 5);

    let lines = server.request_lines();
    assert_eq!(lines[0], "POST /rest/upload");
    assert!(lines.contains(&"GET /rest/analyze".to_string()));
}

#[test]
fn enforced_violation_exits_with_two() {
    let fixture = ServiceFixture::default()
        .with_category(
            "IMPL_USAGE",
            "Usage of implementation classes",
            &[("de.espirit.impl.Foo", 3)],
        )
        .with_category("DEPRECATED_API", "Usage of deprecated API", &[("de.espirit.Old", 1)]);
    let server = StubServer::for_fixture(fixture).unwrap();
    let dir = workspace(&config_for(&server, ""));

    fsmcheck_cmd(&dir)
        .args(["check", "module.fsm"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("1 violations need to be resolved"))
        .stdout(predicate::str::contains("  de.espirit.impl.Foo (3 usages)"))
        .stdout(predicate::str::contains(
            "  1 violations ignored for ComplianceLevel 'DEFAULT'",
        ));
}

#[test]
fn level_override_relaxes_policy() {
    let fixture = clean_service().with_category(
        "DEPRECATED_API_EXTRA",
        "Service-only category",
        &[("x.Y", 1)],
    );
    let server = StubServer::for_fixture(fixture).unwrap();
    let dir = workspace(&config_for(&server, "compliance_level = \"HIGHEST\"\n"));

    fsmcheck_cmd(&dir)
        .args(["--level", "minimal", "check", "module.fsm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ComplianceLevel: 'MINIMAL'"));
}

#[test]
fn unprocessable_module_lists_module_errors() {
    let server = StubServer::for_fixture(
        clean_service().with_failed_module("module.fsm", "zip END header not found"),
    )
    .unwrap();
    let dir = workspace(&config_for(&server, ""));

    fsmcheck_cmd(&dir)
        .args(["check", "module.fsm"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Unable to process module"))
        .stderr(predicate::str::contains(
            "module.fsm --> zip END header not found",
        ));
}

#[test]
fn unreachable_service_exits_with_three() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let dir = workspace(&format!(
        "server_url = \"http://127.0.0.1:{port}\"\nretry_delay_secs = 0\n"
    ));

    fsmcheck_cmd(&dir)
        .args(["check", "module.fsm"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains(
            "Connection to isolation check service failed during upload",
        ));
}

#[test]
fn missing_server_url_is_a_tool_error() {
    let dir = workspace("");
    fsmcheck_cmd(&dir)
        .args(["check", "module.fsm"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("server_url is not configured"));
}

#[test]
fn dir_whitelist_and_credentials_reach_the_service() {
    let server = StubServer::for_fixture(clean_service()).unwrap();
    let dir = workspace(&config_for(
        &server,
        "username = \"ci\"\nwhitelist = [\"org.example:legacy:1.0\"]\nfirstspirit_version = \"5.2.2304\"\n",
    ));
    std::fs::create_dir_all(dir.path().join("dist")).unwrap();
    std::fs::write(dir.path().join("dist/extra.fsm"), b"PK").unwrap();

    fsmcheck_cmd(&dir)
        .env("FSMCHECK_PASSWORD", "secret")
        .args(["check", "module.fsm", "--dir", "dist", "--report-dir", "target"])
        .assert()
        .success();

    let requests = server.requests();
    let upload = &requests[0];
    assert_eq!(upload.body_text().matches("name=\"file\"").count(), 2);
    assert_eq!(upload.header("authorization"), Some("Basic Y2k6c2VjcmV0"));

    assert_eq!(requests[1].path, "/rest/ignored-resources/org.example:legacy:1.0");
    let analyze = requests
        .iter()
        .find(|r| r.path == "/rest/analyze")
        .expect("analyze request");
    assert_eq!(analyze.query_value("version"), Some("5.2.2304"));

    assert!(
        root(&dir)
            .join("target/fsmchecker-reports/TEST-complianceCheck.xml")
            .is_file()
    );
}
