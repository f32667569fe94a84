//! End-to-end tests of composed sources.
//!
//! These tests verify that:
//! 1. Two-source resolution follows the priority, shadowing and merge rules
//! 2. Many-way merges behave like explicit right-nested compositions
//! 3. Prefix caching can be toggled at runtime without stale answers
//! 4. A composition can be shared across threads
//! 5. Deep trees and host directories pass the conformance walk

use merged_fs::conformance::{verify_source, VerifyError};
use merged_fs::sources::{DirSource, MemorySource};
use merged_fs::*;
use std::fs;
use std::sync::Arc;
use std::thread;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn names(entries: Vec<DirEntry>) -> Vec<String> {
    entries.into_iter().map(|e| e.name).collect()
}

fn boxed(source: MemorySource) -> Box<dyn FileSource> {
    Box::new(source)
}

// =============================================================================
// Fixtures
// =============================================================================

fn source_a() -> MemorySource {
    MemorySource::new()
        .with_file("test1.txt", "1a")
        .with_file("a/a.txt", "from a")
}

fn source_b() -> MemorySource {
    MemorySource::new()
        .with_file("test1.txt", "1b")
        .with_file("test2.txt", "2b")
        .with_file("b/0.txt", "b0")
}

fn source_c() -> MemorySource {
    MemorySource::new()
        .with_file("test2.txt", "2c")
        .with_file("test3.txt", "3c")
        .with_file("a", "a file in c")
        .with_file("b/1.txt", "b1")
}

// =============================================================================
// Tests: Two-Source Resolution
// =============================================================================

#[test]
fn file_masks_directory_and_directories_merge() {
    init_tracing();
    let a = MemorySource::new().with_file("a", "A's file").with_file("b/x", "x");
    let b = MemorySource::new().with_file("a/y", "y").with_file("b/z", "z");
    let merged = MergedFs::new(a, b);

    assert_eq!(merged.read_to_string("a").unwrap(), "A's file");
    let err = merged.open("a/y").err().unwrap();
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert_eq!(names(merged.read_dir("b").unwrap()), ["x", "z"]);
    assert!(matches!(
        merged.open("c").err().unwrap(),
        FsError::NotFound { .. }
    ));
}

#[test]
fn whole_file_reads_match_handle_reads() {
    let merged = MergedFs::new(source_a(), source_b());
    let mut handle = merged.open("test1.txt").unwrap();
    let stat = handle.stat().unwrap();
    assert_eq!(stat.size, 2);
    let mut buf = [0u8; 16];
    let n = handle.read(&mut buf).unwrap();
    handle.close().unwrap();
    assert_eq!(&buf[..n], merged.read_file("test1.txt").unwrap().as_slice());
}

#[test]
fn glob_over_a_union() {
    let merged = merge_multiple(vec![boxed(source_a()), boxed(source_b()), boxed(source_c())]);
    assert_eq!(
        glob(&merged, "*.txt").unwrap(),
        ["test1.txt", "test2.txt", "test3.txt"]
    );
    assert_eq!(glob(&merged, "a/*").unwrap(), ["a/a.txt"]);
    assert_eq!(glob(&merged, "b/*").unwrap(), ["b/0.txt", "b/1.txt"]);
}

#[test]
fn errors_carry_the_failing_source() {
    struct Broken;

    impl FileSource for Broken {
        fn open(&self, path: &str) -> Result<Box<dyn FileHandle>, FsError> {
            Err(FsError::Io {
                operation: "open",
                path: path.to_string(),
                source: std::io::Error::other("device unplugged"),
            })
        }
    }

    let merged = MergedFs::new(MemorySource::new().with_file("d/x", "x"), Broken);
    let err = merged.open("d").err().unwrap();
    assert!(!err.is_not_found());
    assert!(matches!(
        err,
        FsError::Source {
            role: SourceRole::Secondary,
            ..
        }
    ));
    assert!(err.to_string().contains("device unplugged"));
}

// =============================================================================
// Tests: Many-Way Merge
// =============================================================================

#[test]
fn many_way_merge_matches_explicit_nesting() {
    let multi = merge_multiple(vec![boxed(source_a()), boxed(source_b()), boxed(source_c())]);
    let nested = MergedFs::new(source_a(), MergedFs::new(source_b(), source_c()));

    for path in [
        ".", "a", "a/a.txt", "b", "b/0.txt", "b/1.txt", "test1.txt", "test2.txt", "test3.txt",
        "missing", "a/missing", "test1.txt/below",
    ] {
        let left = multi.stat(path);
        let right = nested.stat(path);
        match (left, right) {
            (Ok(l), Ok(r)) => {
                assert_eq!(l.file_type, r.file_type, "{path}");
                if l.is_dir() {
                    assert_eq!(
                        names(multi.read_dir(path).unwrap()),
                        names(nested.read_dir(path).unwrap()),
                        "{path}"
                    );
                } else {
                    assert_eq!(
                        multi.read_file(path).unwrap(),
                        nested.read_file(path).unwrap(),
                        "{path}"
                    );
                }
            }
            (Err(l), Err(r)) => assert_eq!(l.is_not_found(), r.is_not_found(), "{path}"),
            (l, r) => panic!("{path}: {l:?} vs {r:?}"),
        }
    }
    assert_eq!(multi.read_to_string("test2.txt").unwrap(), "2b");
}

#[test]
fn many_way_merge_conforms() {
    let merged = merge_multiple(vec![boxed(source_a()), boxed(source_b()), boxed(source_c())]);
    let report = verify_source(
        &merged,
        &["test1.txt", "test2.txt", "test3.txt", "a", "a/a.txt", "b/0.txt", "b/1.txt"],
    )
    .unwrap();
    assert_eq!(report.directories, 3);
    assert_eq!(report.files, 6);
}

// =============================================================================
// Tests: Path Prefix Caching
// =============================================================================

#[test]
fn caching_toggle_reflects_new_blocking_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("host.txt"), "host").unwrap();

    let merged = MergedFs::new(
        DirSource::new(dir.path()),
        MergedFs::new(source_a(), MergedFs::new(source_b(), source_c())),
    );
    let expected = [
        "host.txt", "test1.txt", "test2.txt", "test3.txt", "b/0.txt", "b/1.txt", "b", "a",
    ];
    verify_source(&merged, &expected).unwrap();
    assert!(merged.cached_prefix_count() > 0);
    let nested = merged.secondary();
    assert!(nested.cached_prefix_count() > 0);

    merged.set_path_caching(false);
    assert!(!merged.path_caching());
    assert_eq!(merged.cached_prefix_count(), 0);
    assert_eq!(nested.cached_prefix_count(), 0);
    assert_eq!(nested.secondary().cached_prefix_count(), 0);

    verify_source(&merged, &expected).unwrap();
    assert_eq!(merged.cached_prefix_count(), 0);

    // A regular file named like a lower directory now hides it.
    fs::write(dir.path().join("b"), "").unwrap();
    let err = merged.open("b/0.txt").err().unwrap();
    assert!(err.is_not_found(), "unexpected error: {err}");

    merged.set_path_caching(true);
    verify_source(
        &merged,
        &["host.txt", "test1.txt", "test2.txt", "test3.txt", "b", "a"],
    )
    .unwrap();
    assert!(matches!(
        verify_source(&merged, &["b/0.txt"]),
        Err(VerifyError::Missing(_))
    ));
    assert!(merged.cached_prefix_count() > 0);
    assert!(merged.is_file("b").unwrap());
}

#[test]
fn stale_cache_until_disabled() {
    let primary = Arc::new(MemorySource::new());
    let merged = MergedFs::new(Arc::clone(&primary), source_b());
    assert_eq!(merged.read_to_string("b/0.txt").unwrap(), "b0");

    primary.insert_file("b", "blocker").unwrap();
    // Cached prefix answers are allowed to go stale while caching is on.
    assert_eq!(merged.read_to_string("b/0.txt").unwrap(), "b0");

    merged.set_path_caching(false);
    assert!(merged.open("b/0.txt").err().unwrap().is_not_found());
}

// =============================================================================
// Tests: Concurrency
// =============================================================================

#[test]
fn concurrent_opens_share_one_node() {
    init_tracing();
    let merged = Arc::new(MergedFs::new(
        source_a(),
        MergedFs::new(source_b(), source_c()),
    ));
    let paths = ["test1.txt", "test2.txt", "test3.txt", "b/0.txt", "b/1.txt", "b", "a"];

    thread::scope(|scope| {
        for worker in 0..8 {
            let merged = Arc::clone(&merged);
            scope.spawn(move || {
                for round in 0..200 {
                    let path = paths[(worker + round) % paths.len()];
                    let mut handle = merged
                        .open(path)
                        .unwrap_or_else(|e| panic!("open {path}: {e}"));
                    handle.stat().unwrap();
                    handle.close().unwrap();
                }
            });
        }
        let toggler = Arc::clone(&merged);
        scope.spawn(move || {
            for round in 0..100 {
                toggler.set_path_caching(round % 2 == 1);
            }
        });
    });

    merged.set_path_caching(true);
    verify_source(merged.as_ref(), &paths).unwrap();
}

#[test]
fn merged_sources_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MergedFs<MemorySource, DirSource>>();
    assert_send_sync::<Box<dyn FileSource>>();
}

// =============================================================================
// Tests: Deep Trees and Host Directories
// =============================================================================

/// Deterministic path of `depth` four-letter directories.
fn deep_dir(seed: u64, depth: usize) -> String {
    let mut state = seed;
    let mut path = String::new();
    for _ in 0..depth {
        for _ in 0..4 {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            path.push(char::from(b'a' + ((state >> 33) % 26) as u8));
        }
        path.push('/');
    }
    path
}

#[test]
fn deep_nesting_conforms() {
    let a = MemorySource::new();
    let b = MemorySource::new();
    let mut paths = Vec::new();
    for i in 0..8 {
        let path_a = format!("{}test.txt", deep_dir(10_000 + i, 200));
        a.insert_file(&path_a, "hi there").unwrap();
        paths.push(path_a);
        let path_b = format!("{}test.txt", deep_dir(20_000 + i, 200));
        b.insert_file(&path_b, "hi there 2").unwrap();
        paths.push(path_b);
    }
    let merged = MergedFs::new(a, b);
    let expected: Vec<&str> = paths.iter().map(String::as_str).collect();
    verify_source(&merged, &expected).unwrap();
}

#[test]
fn host_directory_over_memory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("conf")).unwrap();
    fs::write(dir.path().join("conf/app.toml"), "host").unwrap();

    let merged = dir_over_defaults(dir.path());
    assert_eq!(merged.read_to_string("conf/app.toml").unwrap(), "host");
    assert_eq!(merged.read_to_string("conf/defaults.toml").unwrap(), "defaults");
    assert_eq!(
        names(merged.read_dir("conf").unwrap()),
        ["app.toml", "defaults.toml"]
    );
    verify_source(&merged, &["conf/app.toml", "conf/defaults.toml"]).unwrap();
}

fn dir_over_defaults(root: &std::path::Path) -> MergedFs<DirSource, MemorySource> {
    DirSource::new(root).layer(Underlay::new(
        MemorySource::new()
            .with_file("conf/app.toml", "vendor")
            .with_file("conf/defaults.toml", "defaults"),
    ))
}

#[test]
fn paging_a_merged_directory() {
    let upper = MemorySource::new();
    let lower = MemorySource::new();
    for i in 0..10 {
        upper.insert_file(&format!("d/u{i:02}"), "u").unwrap();
        lower.insert_file(&format!("d/l{i:02}"), "l").unwrap();
    }
    let merged = MergedFs::new(upper, lower);
    let mut handle = merged.open("d").unwrap();
    let mut seen = Vec::new();
    while let Some(page) = handle.read_dir(3).unwrap() {
        assert!(page.len() <= 3);
        seen.extend(names(page));
    }
    handle.close().unwrap();
    assert_eq!(seen.len(), 20);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(seen.first().map(String::as_str), Some("l00"));
}
