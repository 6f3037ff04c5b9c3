//! CLI command integration tests.
//! Each test builds an application in a temp directory, with a shell script
//! standing in for the rule engine.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SITE: &str = "\
@prefix html: <http://deduct.dev/ns/html#> .
@prefix ex: <http://example.org/> .

ex:page a html:Element ; html:tag \"html\" ; html:children ( ex:title ex:body ) .
ex:title a html:Element ; html:tag \"title\" ; html:children ( \"Test Site\" ) .
ex:body a html:Element ; html:tag \"body\" ; html:children ( ex:p ) .
ex:p a html:Element ; html:tag \"p\" ; html:children ( [ a html:Text ; html:content \"A test website\" ] ) .
";

/// Echoes every input, then answers `/hello` and `/` for the request node
/// found in the fact document.
const REASONER: &str = r#"#!/bin/sh
cat "$@"
node=$(grep -o 'urn:uuid:[0-9a-f-]*' "$1" | head -n 1)
H='http://deduct.dev/ns/http#'
if grep -q '"/hello"' "$1"; then
  echo "_:r <${H}respondsTo> <$node> ."
  echo "_:r <${H}responseCode> 200 ."
  echo "_:r <${H}body> \"Hello, World!\" ."
fi
if grep -q "<${H}path> \"/\" " "$1"; then
  echo "_:r <${H}respondsTo> <$node> ."
  echo "_:r <${H}responseCode> 200 ."
  echo "_:r <${H}body> <http://example.org/page> ."
fi
if grep -q '"/broken"' "$1"; then
  echo "_:r <${H}respondsTo> <$node> ."
  echo "_:r <${H}body> \"no code\" ."
fi
"#;

fn script(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Writes the site, rules, reasoner and config; returns the config path.
fn app(dir: &TempDir, reasoner: &str, timeout_ms: u64) -> PathBuf {
    std::fs::write(dir.path().join("site.n3"), SITE).unwrap();
    std::fs::write(dir.path().join("rules.n3"), "# routes live in the reasoner script\n").unwrap();
    let command = script(dir.path(), "reasoner.sh", reasoner);
    let config = dir.path().join("deduct.toml");
    std::fs::write(
        &config,
        format!(
            "[reasoner]\ncommand = \"{}\"\ntimeout_ms = {timeout_ms}\n\n\
             [app]\nground = [\"site.n3\"]\nrules = [\"rules.n3\"]\n",
            command.display()
        ),
    )
    .unwrap();
    config
}

fn deduct(config: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("deduct").unwrap();
    cmd.arg("--config").arg(config).env_remove("DEDUCT_CONFIG");
    cmd
}

#[test]
fn request_hello() {
    let dir = TempDir::new().unwrap();
    let config = app(&dir, REASONER, 5000);
    deduct(&config)
        .args(["request", "/hello"])
        .assert()
        .success()
        .stdout("Hello, World!\n");
}

#[test]
fn request_with_header() {
    let dir = TempDir::new().unwrap();
    let config = app(&dir, REASONER, 5000);
    deduct(&config)
        .args(["request", "hello", "--header"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("200 text/plain\n\nHello, World!"));
}

#[test]
fn request_site_page() {
    let dir = TempDir::new().unwrap();
    let config = app(&dir, REASONER, 5000);
    deduct(&config)
        .args(["request", "/", "--header"])
        .assert()
        .success()
        .stdout(predicate::str::contains("200 text/html"))
        .stdout(predicate::str::contains(
            "<!DOCTYPE html><html><title>Test Site</title><body><p>A test website</p></body></html>",
        ));
}

#[test]
fn request_missing_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let config = app(&dir, REASONER, 5000);
    deduct(&config)
        .args(["request", "/missing", "--header"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("404 text/plain"))
        .stdout(predicate::str::contains("no response bound"));
}

#[test]
fn request_without_code_is_500() {
    let dir = TempDir::new().unwrap();
    let config = app(&dir, REASONER, 5000);
    deduct(&config)
        .args(["request", "/broken", "--header"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("500 text/plain"))
        .stdout(predicate::str::contains("no response code"));
}

#[test]
fn failing_reasoner_is_500() {
    let dir = TempDir::new().unwrap();
    let config = app(&dir, "#!/bin/sh\necho 'rule error' >&2\nexit 2\n", 5000);
    deduct(&config)
        .args(["request", "/hello", "--header"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("500 text/plain"))
        .stdout(predicate::str::contains("rule error"));
}

#[test]
fn slow_reasoner_times_out() {
    let dir = TempDir::new().unwrap();
    let config = app(&dir, "#!/bin/sh\nexec sleep 10\n", 200);
    deduct(&config)
        .args(["request", "/hello"])
        .timeout(std::time::Duration::from_secs(5))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("timed out"));
}

#[test]
fn malformed_graph_body_is_400() {
    let dir = TempDir::new().unwrap();
    let config = app(&dir, REASONER, 5000);
    let body = dir.path().join("bad.ttl");
    std::fs::write(&body, "<urn:a> <urn:b> .").unwrap();
    deduct(&config)
        .args(["request", "/items", "--method", "post", "--header", "--body"])
        .arg(&body)
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("400 text/plain"));
}

#[test]
fn encode_prints_request_facts() {
    let dir = TempDir::new().unwrap();
    let config = app(&dir, REASONER, 5000);
    let body = dir.path().join("item.ttl");
    std::fs::write(&body, "<urn:item> <urn:name> \"widget\" .").unwrap();
    deduct(&config)
        .args(["encode", "/items", "--method", "POST", "--body"])
        .arg(&body)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# request <urn:uuid:"))
        .stdout(predicate::str::contains("<http://deduct.dev/ns/http#method> \"POST\""))
        .stdout(predicate::str::contains("\"text/turtle\""))
        .stdout(predicate::str::contains("{ <urn:item> <urn:name> \"widget\" . }"));
}

#[test]
fn resolve_saved_closure() {
    let dir = TempDir::new().unwrap();
    let closure = dir.path().join("closure.n3");
    std::fs::write(
        &closure,
        "@prefix http: <http://deduct.dev/ns/http#> .\n\
         _:r http:respondsTo <urn:uuid:1234> ; http:responseCode 201 ; \
         http:contentType \"application/json\" ; http:body \"{}\" .",
    )
    .unwrap();
    #[allow(deprecated)]
    Command::cargo_bin("deduct")
        .unwrap()
        .arg("resolve")
        .arg(&closure)
        .arg("urn:uuid:1234")
        .assert()
        .success()
        .stdout("201 application/json\n\n{}\n");
}

#[test]
fn resolve_unknown_request_fails() {
    let dir = TempDir::new().unwrap();
    let closure = dir.path().join("closure.n3");
    std::fs::write(&closure, "<urn:a> <urn:b> <urn:c> .").unwrap();
    #[allow(deprecated)]
    Command::cargo_bin("deduct")
        .unwrap()
        .arg("resolve")
        .arg(&closure)
        .arg("urn:uuid:1234")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no response bound"));
}

#[test]
fn render_node_from_file() {
    let dir = TempDir::new().unwrap();
    let site = dir.path().join("site.n3");
    std::fs::write(&site, SITE).unwrap();
    #[allow(deprecated)]
    Command::cargo_bin("deduct")
        .unwrap()
        .arg("render")
        .arg(&site)
        .arg("http://example.org/title")
        .assert()
        .success()
        .stdout("<title>Test Site</title>\n");
}

#[test]
fn config_from_environment() {
    let dir = TempDir::new().unwrap();
    let config = app(&dir, REASONER, 5000);
    #[allow(deprecated)]
    Command::cargo_bin("deduct")
        .unwrap()
        .env("DEDUCT_CONFIG", &config)
        .args(["request", "/hello"])
        .assert()
        .success()
        .stdout("Hello, World!\n");
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    deduct(&dir.path().join("absent.toml"))
        .args(["request", "/hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("deduct.toml");
    std::fs::write(&config, "[server]\nport = 80\n").unwrap();
    deduct(&config)
        .args(["request", "/hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}
