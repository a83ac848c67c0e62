use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn fonts_dir() -> Option<PathBuf> {
    let dir = env::var("FONTCACHE_TEST_FONTS").ok()?;
    PathBuf::from(dir).canonicalize().ok()
}

fn fontcache(font_dir: &Path, cache_file: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fontcache"))
        .args(args)
        .arg("--font-dir")
        .arg(font_dir)
        .arg("--cache-file")
        .arg(cache_file)
        .env_remove("RUST_LOG")
        .output()
        .expect("run fontcache")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn empty_font_dir_lists_nothing() {
    let temp = tempdir().expect("tempdir");
    let fonts = temp.path().join("fonts");
    fs::create_dir_all(&fonts).expect("fonts dir");
    fs::write(fonts.join("not-a-font.ttf"), b"garbage").expect("write");

    let output = fontcache(&fonts, &temp.path().join("c.dat"), &["list", "--json"]);

    assert_success(&output);
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(parsed, Value::Array(Vec::new()));
    // the undecodable file is reported, not fatal
    assert!(String::from_utf8_lossy(&output.stderr).contains("not-a-font.ttf"));
}

#[test]
fn find_without_match_exits_nonzero() {
    let temp = tempdir().expect("tempdir");

    let output = fontcache(
        temp.path(),
        &temp.path().join("c.dat"),
        &["find", "No Such Family"],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: "), "stderr: {stderr}");
}

#[test]
fn rebuild_without_cache_location_fails() {
    let temp = tempdir().expect("tempdir");

    let output = Command::new(env!("CARGO_BIN_EXE_fontcache"))
        .args(["rebuild", "--no-cache", "--font-dir"])
        .arg(temp.path())
        .output()
        .expect("run fontcache");

    assert!(!output.status.success());
}

#[test]
fn rebuild_then_list_uses_saved_cache() {
    let fonts = match fonts_dir() {
        Some(dir) => dir,
        None => return, // skip when fixtures are unavailable
    };
    let temp = tempdir().expect("tempdir");
    let cache_file = temp.path().join("fixtures.dat");

    let rebuilt = fontcache(&fonts, &cache_file, &["rebuild"]);
    assert_success(&rebuilt);
    assert!(cache_file.exists());
    let saved = fs::read_to_string(&cache_file).expect("cache file");
    assert!(saved.starts_with("ttf-cache0 "));

    let listed = fontcache(&fonts, &cache_file, &["list", "--ndjson"]);
    assert_success(&listed);
    let stdout = String::from_utf8(listed.stdout).expect("utf8");
    let first: Value =
        serde_json::from_str(stdout.lines().next().expect("at least one font")).expect("json");
    let family = first["family"].as_str().expect("family").to_string();

    let found = fontcache(&fonts, &cache_file, &["find", &family, "--json"]);
    assert_success(&found);
    let parsed: Value = serde_json::from_slice(&found.stdout).expect("json");
    assert!(parsed["family"]
        .as_str()
        .is_some_and(|f| f.eq_ignore_ascii_case(&family)));
}

#[test]
fn info_prints_every_sub_font() {
    let fonts = match fonts_dir() {
        Some(dir) => dir,
        None => return, // skip when fixtures are unavailable
    };
    let Some(font) = fs::read_dir(&fonts)
        .expect("read fixtures")
        .filter_map(Result::ok)
        .map(|e| e.path())
        .find(|p| p.extension().is_some_and(|e| e == "ttf" || e == "otf"))
    else {
        return;
    };

    let output = Command::new(env!("CARGO_BIN_EXE_fontcache"))
        .arg("info")
        .arg(&font)
        .output()
        .expect("run fontcache");

    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().next().is_some_and(|l| l.ends_with("fonts: 1")), "{stdout}");
}
