use depinspect::config::IgnoreConfig;
use depinspect::discovery::{find_lock_files, DiscoveryOptions};
use depinspect::inspect::{analyze_files, collect_remotes, BatchOptions};
use depinspect::output::{ReportWriter, ANALYZE_DIR};
use depinspect::{Ecosystem, Mismatches, Registry};
use std::fs;
use std::path::Path;

const GEMFILE_LOCK: &str = "\
GEM
  remote: https://rubygems.org/
  specs:
    baz (2.0.0)
    foo (1.0.0)
      bar (>= 0)

PLATFORMS
  ruby
";

const YARN_LOCK: &str = r#"# yarn lockfile v1


"@acme/auth@^1.0.0":
  version "1.0.3"
  resolved "https://registry.yarnpkg.com/@acme/auth/-/auth-1.0.3.tgz#1f2e"

"@acme/ui@^3.0.0":
  version "3.0.0"
  resolved "https://npm.acme.io/@acme/ui/-/ui-3.0.0.tgz#aa11"

left-pad@^1.3.0:
  version "1.3.0"
  resolved "https://registry.yarnpkg.com/left-pad/-/left-pad-1.3.0.tgz#5b8a"
"#;

fn write_registry(dir: &Path, json: &str) -> Registry {
    let path = dir.join("registry.json");
    fs::write(&path, json).unwrap();
    Registry::load(&path).unwrap()
}

#[test]
fn ruby_lock_file_reports_only_registry_dependencies() {
    let dir = tempfile::tempdir().unwrap();
    let locks = dir.path().join("locks");
    fs::create_dir(&locks).unwrap();
    fs::write(locks.join("billing.lock"), GEMFILE_LOCK).unwrap();

    let registry = write_registry(
        dir.path(),
        r#"{"Url": "https://pkg.acme.io/", "Dependencies": ["foo", "bar"]}"#,
    );
    let files = find_lock_files(&locks, &DiscoveryOptions::default()).unwrap();
    let mut writer = ReportWriter::for_analyze(dir.path()).unwrap();

    let result = analyze_files(
        &files,
        &registry,
        &IgnoreConfig::default(),
        &mut writer,
        BatchOptions {
            ecosystem: Ecosystem::Ruby,
            verbose: false,
        },
        |_| {},
    )
    .unwrap();

    let report = dir.path().join(ANALYZE_DIR).join("billing_output.json");
    let written: Mismatches = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();

    let mut expected = Mismatches::new();
    expected.insert("https://rubygems.org/".to_string(), vec!["foo".to_string()]);
    assert_eq!(written, expected);
    assert_eq!(result.mismatch_count(), 1);
}

#[test]
fn js_lock_file_flags_scoped_package_from_public_registry() {
    let dir = tempfile::tempdir().unwrap();
    let lock = dir.path().join("yarn.lock");
    fs::write(&lock, YARN_LOCK).unwrap();

    let registry = write_registry(
        dir.path(),
        r#"{"Url": "https://npm.acme.io", "Dependencies": ["@acme/auth", "@acme/ui"]}"#,
    );
    let mut writer = ReportWriter::for_analyze(dir.path()).unwrap();

    let result = analyze_files(
        &[lock],
        &registry,
        &IgnoreConfig::default(),
        &mut writer,
        BatchOptions {
            ecosystem: Ecosystem::Js,
            verbose: false,
        },
        |_| {},
    )
    .unwrap();

    assert_eq!(result.files.len(), 1);
    let mismatches = &result.files[0].mismatches;
    assert_eq!(mismatches.len(), 1);
    assert_eq!(
        mismatches["https://registry.yarnpkg.com"],
        vec!["@acme/auth".to_string()]
    );
    assert!(dir.path().join(ANALYZE_DIR).join("yarn_output.json").exists());
}

#[test]
fn remotes_are_listed_across_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("one.lock"), YARN_LOCK).unwrap();
    fs::write(
        dir.path().join("two.lock"),
        "lodash@^4.17.21:\n  resolved \"https://registry.npmjs.org/lodash/-/lodash-4.17.21.tgz\"\n",
    )
    .unwrap();

    let files = find_lock_files(dir.path(), &DiscoveryOptions::default()).unwrap();
    let options = BatchOptions {
        ecosystem: Ecosystem::Js,
        verbose: false,
    };

    let all = collect_remotes(&files, "", options, |_| {});
    assert_eq!(all.files_scanned, 2);
    assert_eq!(
        all.remotes.iter().map(String::as_str).collect::<Vec<_>>(),
        vec![
            "https://npm.acme.io",
            "https://registry.npmjs.org",
            "https://registry.yarnpkg.com"
        ]
    );

    let registries = collect_remotes(&files, "REGISTRY", options, |_| {});
    assert_eq!(registries.remotes.len(), 2);
}
