//! Integration test: full directory scans against an on-disk license corpus
//!
//! Builds a small corpus and a generated source tree in a temp dir, then
//! checks the one-report-per-file guarantees of the pipeline.

use licscan::engine::{CancelToken, Scanner};
use licscan::LicScanError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MIT: &str = "Permission is hereby granted, free of charge, to any person obtaining
a copy of this software and associated documentation files (the \"Software\"),
to deal in the Software without restriction, including without limitation the
rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions.
";

const APACHE_HEADER: &str = "Licensed under the Apache License, Version 2.0 (the \"License\");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at
";

fn write_corpus(dir: &Path) -> PathBuf {
    let corpus = dir.join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    fs::write(corpus.join("MIT.txt"), MIT).unwrap();
    fs::write(corpus.join("Apache-2.0.header.txt"), APACHE_HEADER).unwrap();
    corpus
}

fn scanner(dir: &Path) -> Scanner {
    Scanner::configure(&write_corpus(dir), 0.8).unwrap()
}

#[test]
fn thousand_files_each_reported_once() {
    let dir = TempDir::new().unwrap();
    let s = scanner(dir.path());
    let tree = dir.path().join("tree");

    for i in 0..1000 {
        let sub = tree.join(format!("d{}", i % 17));
        fs::create_dir_all(&sub).unwrap();
        let body = match i % 4 {
            0 => format!("Copyright (c) {} Example Corp\n\n{}", 1990 + i % 30, MIT),
            1 => format!("// {}\nfn f{}() {{}}\n", APACHE_HEADER.replace('\n', "\n// "), i),
            2 => format!("plain text file number {}\n", i),
            _ => String::new(),
        };
        fs::write(sub.join(format!("f{}.txt", i)), body).unwrap();
    }

    let report = s.scan_tree(&tree, 8, &CancelToken::new()).unwrap();

    assert_eq!(report.file_count, 1000);
    assert_eq!(report.files.len(), 1000);
    let unique: HashSet<_> = report.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(unique.len(), 1000);
    assert_eq!(report.failed_files().count(), 0);

    for file in &report.files {
        let name = file.path.file_stem().unwrap().to_str().unwrap();
        let i: usize = name[1..].parse().unwrap();
        match i % 4 {
            0 => {
                assert_eq!(file.license_expressions, vec!["MIT"], "{}", name);
                assert_eq!(file.copyrights.len(), 1);
                assert!(file.copyrights[0].holder.ends_with("Example Corp"));
            }
            1 => assert_eq!(file.license_expressions, vec!["Apache-2.0"], "{}", name),
            _ => {
                assert!(file.licenses.is_empty());
                assert!(file.copyrights.is_empty());
            }
        }
    }
}

#[test]
fn file_count_matches_non_directory_entries() {
    let dir = TempDir::new().unwrap();
    let s = scanner(dir.path());
    let tree = dir.path().join("tree");
    fs::create_dir_all(tree.join("a/b/c")).unwrap();
    fs::create_dir_all(tree.join("empty")).unwrap();
    fs::write(tree.join("top.txt"), "x").unwrap();
    fs::write(tree.join("a/one.txt"), "x").unwrap();
    fs::write(tree.join("a/b/c/deep.txt"), "x").unwrap();

    let report = s.scan_tree(&tree, 3, &CancelToken::new()).unwrap();
    assert_eq!(report.file_count, 3);
    assert!(report.files.iter().all(|f| f.path.is_file()));
}

#[cfg(unix)]
#[test]
fn unreadable_entry_gets_error_and_empty_findings() {
    let dir = TempDir::new().unwrap();
    let s = scanner(dir.path());
    let tree = dir.path().join("tree");
    fs::create_dir_all(&tree).unwrap();
    fs::write(tree.join("ok.txt"), MIT).unwrap();
    std::os::unix::fs::symlink(tree.join("gone.txt"), tree.join("dangling.txt")).unwrap();

    let report = s.scan_tree(&tree, 2, &CancelToken::new()).unwrap();
    assert_eq!(report.file_count, 2);

    let broken = report
        .files
        .iter()
        .find(|f| f.path.ends_with("dangling.txt"))
        .unwrap();
    assert_eq!(broken.scan_errors.len(), 1);
    assert!(broken.licenses.is_empty());
    assert!(broken.license_expressions.is_empty());
    assert!(broken.copyrights.is_empty());

    let ok = report.files.iter().find(|f| f.path.ends_with("ok.txt")).unwrap();
    assert_eq!(ok.license_expressions, vec!["MIT"]);
}

#[test]
fn zero_byte_file_reports_nothing() {
    let dir = TempDir::new().unwrap();
    let s = scanner(dir.path());
    let empty = dir.path().join("empty.txt");
    fs::write(&empty, b"").unwrap();

    let report = s.analyze_file(&empty, None, false);
    assert!(report.licenses.is_empty());
    assert!(report.copyrights.is_empty());
    assert!(report.scan_errors.is_empty());
}

#[test]
fn threshold_updates_validated() {
    let dir = TempDir::new().unwrap();
    let mut s = scanner(dir.path());

    assert!(matches!(
        s.set_threshold(150.0),
        Err(LicScanError::ThresholdRange(_))
    ));
    assert!((s.threshold().value() - 0.8).abs() < 1e-12);

    s.set_threshold(80.0).unwrap();
    assert!((s.threshold().value() - 0.80).abs() < 1e-12);
}

#[test]
fn scan_path_writes_parseable_report() {
    let dir = TempDir::new().unwrap();
    let s = scanner(dir.path());
    let tree = dir.path().join("tree");
    fs::create_dir_all(&tree).unwrap();
    fs::write(
        tree.join("LICENSE"),
        format!("Copyright 2021 Example Corp. All rights reserved.\n\n{}", MIT),
    )
    .unwrap();
    fs::write(tree.join("main.rs"), "fn main() {}\n").unwrap();
    let output = dir.path().join("report.json");

    assert!(s.scan_path(&tree, &output, 2));

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["file_count"], 2);
    let files = value["files"].as_array().unwrap();
    let license = files
        .iter()
        .find(|f| f["path"].as_str().unwrap().ends_with("LICENSE"))
        .unwrap();
    assert_eq!(license["license_expressions"][0], "MIT");
    assert_eq!(license["copyrights"][0]["holder"], "2021 Example Corp");
    assert!(value["scanned_at"].is_string());
}

#[test]
fn cancelled_scan_keeps_file_count() {
    let dir = TempDir::new().unwrap();
    let s = scanner(dir.path());
    let tree = dir.path().join("tree");
    fs::create_dir_all(&tree).unwrap();
    for i in 0..25 {
        fs::write(tree.join(format!("{}.txt", i)), MIT).unwrap();
    }

    let cancel = CancelToken::new();
    cancel.cancel();
    let report = s.scan_tree(&tree, 4, &cancel).unwrap();
    assert_eq!(report.file_count, 25);
    assert_eq!(report.failed_files().count(), 25);
}

#[test]
fn buffered_and_whole_file_agree_on_small_files() {
    let dir = TempDir::new().unwrap();
    let s = scanner(dir.path());
    let path = dir.path().join("NOTICE");
    fs::write(&path, format!("© 2020-2022, John Doe\n{}", MIT)).unwrap();

    let whole = s.analyze_file(&path, None, false);
    let buffered = s.analyze_file(&path, Some(4), true);
    assert_eq!(whole, buffered);
    assert_eq!(whole.copyrights.len(), 1);
    assert_eq!(whole.license_expressions, vec!["MIT"]);
}
