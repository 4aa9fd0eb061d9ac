//! End-to-end tests of the acquire flow against a fixture catalog.
//!
//! The catalog is the checked-in `fixtures/releases.json`; archives are
//! built in memory and served by a fake fetcher.

#![cfg(unix)]

use flate2::Compression;
use flate2::write::GzEncoder;
use goswap_core::{Error, ErrorCode};
use goswap_toolchain::{AcquireOutcome, AcquireSettings, Acquirer, ArchiveFetcher, Release};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tar::{Builder, EntryType, Header};
use tempfile::TempDir;

const BASE_URL: &str = "https://dl.google.com/go/";

fn catalog() -> Vec<Release> {
    serde_json::from_str(include_str!("fixtures/releases.json")).unwrap()
}

/// Serves canned archives and records every requested URL.
#[derive(Default)]
struct FakeFetcher {
    archives: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl FakeFetcher {
    fn serve(mut self, filename: &str, bytes: Vec<u8>) -> Self {
        self.archives.insert(format!("{BASE_URL}{filename}"), bytes);
        self
    }
}

impl ArchiveFetcher for &FakeFetcher {
    fn fetch(&self, url: &str) -> goswap_core::Result<Box<dyn Read + Send>> {
        self.requests.borrow_mut().push(url.to_string());
        match self.archives.get(url) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(Error::network("HTTP 404 Not Found", url)),
        }
    }
}

/// Serves the first half of an archive, then drops the connection.
struct DroppingFetcher {
    archive: Vec<u8>,
}

impl ArchiveFetcher for DroppingFetcher {
    fn fetch(&self, _url: &str) -> goswap_core::Result<Box<dyn Read + Send>> {
        let half = self.archive[..self.archive.len() / 2].to_vec();
        Ok(Box::new(Dropped(Cursor::new(half))))
    }
}

struct Dropped(Cursor<Vec<u8>>);

impl Read for Dropped {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.0.read(buf)? {
            0 => Err(std::io::Error::from(std::io::ErrorKind::ConnectionReset)),
            n => Ok(n),
        }
    }
}

fn acquirer<F: ArchiveFetcher>(fetcher: F) -> Acquirer<Vec<Release>, F> {
    let settings = AcquireSettings {
        download_base_url: BASE_URL.to_string(),
        ..Default::default()
    };
    Acquirer::new(catalog(), fetcher, settings)
}

fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

fn header(path: &str, entry_type: EntryType, size: u64, mode: u32) -> Header {
    let mut header = Header::new_gnu();
    header.set_path(path).unwrap();
    header.set_entry_type(entry_type);
    header.set_size(size);
    header.set_mode(mode);
    header.set_cksum();
    header
}

/// A minimal Go distribution: `go/VERSION` and `go/bin/go`.
fn go_archive(version: &str) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());
    builder
        .append(&header("go/", EntryType::Directory, 0, 0o755), std::io::empty())
        .unwrap();
    builder
        .append(&header("go/bin/", EntryType::Directory, 0, 0o755), std::io::empty())
        .unwrap();
    let script = format!("#!/bin/sh\necho {version}\n");
    builder
        .append(
            &header("go/bin/go", EntryType::Regular, script.len() as u64, 0o755),
            script.as_bytes(),
        )
        .unwrap();
    builder
        .append(
            &header("go/VERSION", EntryType::Regular, version.len() as u64, 0o644),
            version.as_bytes(),
        )
        .unwrap();
    gzip(&builder.into_inner().unwrap())
}

/// A distribution carrying a large file of incompressible bytes.
fn large_archive(size: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    let data: Vec<u8> = (0..size)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect();
    let mut builder = Builder::new(Vec::new());
    builder
        .append(
            &header("go/pkg/tool.a", EntryType::Regular, size as u64, 0o644),
            &data[..],
        )
        .unwrap();
    gzip(&builder.into_inner().unwrap())
}

/// An archive whose only file declares more bytes than it carries.
fn truncated_archive() -> Vec<u8> {
    let mut raw = header("go/bin/go", EntryType::Regular, 4096, 0o755)
        .as_bytes()
        .to_vec();
    raw.extend_from_slice(&[b'x'; 100]);
    gzip(&raw)
}

fn install(root: &Path, name: &str, version: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(dir.join("go")).unwrap();
    fs::write(dir.join("go/VERSION"), version).unwrap();
    dir
}

fn listing(root: &Path) -> BTreeSet<String> {
    fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_already_installed_is_a_noop() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    install(root, "1.14.7", "go1.14.7");
    install(root, "1.13.14", "go1.13.14");
    let before = listing(root);

    let fetcher = FakeFetcher::default();
    let outcome = acquirer(&fetcher).acquire(root, "1.14").unwrap();

    assert_eq!(
        outcome,
        AcquireOutcome::AlreadyInstalled {
            version: "go1.14.7".to_string(),
            path: root.join("1.14.7"),
        }
    );
    assert_eq!(outcome.to_string(), "Nothing to do: go1.14.7 already installed.");
    assert_eq!(listing(root), before);
    assert!(fetcher.requests.borrow().is_empty());
    assert!(fs::symlink_metadata(root.join("1.13.14")).unwrap().is_dir());
}

#[test]
fn test_remote_install_takes_over_nearest_slot() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    install(root, "1.13.14", "go1.13.14");

    let fetcher =
        FakeFetcher::default().serve("go1.14.7.linux-amd64.tar.gz", go_archive("go1.14.7"));
    let outcome = acquirer(&fetcher).acquire(root, "1.14.7").unwrap();

    assert_eq!(
        outcome.to_string(),
        "[remote] go1.13.14 has been replaced by go1.14.7."
    );
    assert_eq!(
        *fetcher.requests.borrow(),
        vec![format!("{BASE_URL}go1.14.7.linux-amd64.tar.gz")]
    );

    let dest = root.join("1.14.7");
    let slot = root.join("1.13.14");
    assert!(fs::symlink_metadata(&slot).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_link(&slot).unwrap(), dest);

    assert_eq!(fs::read_to_string(dest.join("go/VERSION")).unwrap(), "go1.14.7");
    assert_eq!(
        fs::read_to_string(slot.join("go/bin/go")).unwrap(),
        "#!/bin/sh\necho go1.14.7\n"
    );

    // no staging leftovers
    let expected: BTreeSet<String> = ["1.13.14", "1.14.7"].iter().map(|s| s.to_string()).collect();
    assert_eq!(listing(root), expected);
}

#[test]
fn test_second_run_after_install_is_a_noop() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    install(root, "1.13.14", "go1.13.14");

    let fetcher =
        FakeFetcher::default().serve("go1.14.7.linux-amd64.tar.gz", go_archive("go1.14.7"));
    let acquirer = acquirer(&fetcher);
    acquirer.acquire(root, "1.14.7").unwrap();

    let outcome = acquirer.acquire(root, "1.14.7").unwrap();
    assert!(!outcome.changed());
    assert_eq!(fetcher.requests.borrow().len(), 1);
}

#[test]
fn test_local_install_is_reused_without_download() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    install(root, "1.14.7", "go1.14.7");
    install(root, "1.14.8", "go1.14.8");

    let fetcher = FakeFetcher::default();
    let outcome = acquirer(&fetcher).acquire(root, "1.14.7").unwrap();

    assert_eq!(
        outcome,
        AcquireOutcome::ReplacedLocally {
            previous: "go1.14.8".to_string(),
            version: "go1.14.7".to_string(),
            path: root.join("1.14.7"),
        }
    );
    assert!(fetcher.requests.borrow().is_empty());
    assert_eq!(fs::read_link(root.join("1.14.8")).unwrap(), root.join("1.14.7"));
}

#[test]
fn test_prerelease_fallback() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    install(root, "1.15", "go1.15");

    let fetcher =
        FakeFetcher::default().serve("go1.16rc1.linux-amd64.tar.gz", go_archive("go1.16rc1"));
    let outcome = acquirer(&fetcher).acquire(root, "1.16").unwrap();

    assert_eq!(
        outcome.to_string(),
        "[remote] go1.15 has been replaced by go1.16rc1."
    );
    assert_eq!(fs::read_link(root.join("1.15")).unwrap(), root.join("1.16rc1"));
}

#[test]
fn test_no_local_slot_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("notes.txt"), "not an install").unwrap();
    install(root, "2.1", "go2.1");
    let before = listing(root);

    let fetcher =
        FakeFetcher::default().serve("go1.14.7.linux-amd64.tar.gz", go_archive("go1.14.7"));
    let err = acquirer(&fetcher).acquire(root, "1.14.7").unwrap_err();

    assert_eq!(err.code(), ErrorCode::NoLocalSlotAvailable);
    assert!(!err.fixes().is_empty());
    assert_eq!(listing(root), before);
    assert!(fetcher.requests.borrow().is_empty());
}

#[test]
fn test_missing_root_has_no_slot() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("golang");

    let fetcher = FakeFetcher::default();
    let err = acquirer(&fetcher).acquire(&root, "1.14").unwrap_err();

    assert_eq!(err.code(), ErrorCode::NoLocalSlotAvailable);
    assert!(!root.exists());
}

#[test]
fn test_truncated_archive_leaves_slot_untouched() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let slot = install(root, "1.13.14", "go1.13.14");

    let fetcher = FakeFetcher::default().serve("go1.14.7.linux-amd64.tar.gz", truncated_archive());
    let err = acquirer(&fetcher).acquire(root, "1.14.7").unwrap_err();

    assert!(matches!(
        err,
        Error::TruncatedEntry {
            expected: 4096,
            actual: 100,
            ..
        }
    ));
    assert!(fs::symlink_metadata(&slot).unwrap().is_dir());
    assert_eq!(fs::read_to_string(slot.join("go/VERSION")).unwrap(), "go1.13.14");
    assert!(!root.join("1.14.7").exists());

    let expected: BTreeSet<String> = ["1.13.14".to_string()].into_iter().collect();
    assert_eq!(listing(root), expected);
}

#[test]
fn test_download_failure_leaves_slot_untouched() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let slot = install(root, "1.13.14", "go1.13.14");

    let fetcher = FakeFetcher::default();
    let err = acquirer(&fetcher).acquire(root, "1.14.7").unwrap_err();

    assert_eq!(err.code(), ErrorCode::NetworkError);
    assert!(fs::symlink_metadata(&slot).unwrap().is_dir());
    assert!(!root.join("1.14.7").exists());
}

#[test]
fn test_connection_drop_mid_download_is_a_network_error() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let slot = install(root, "1.13.14", "go1.13.14");

    let fetcher = DroppingFetcher {
        archive: large_archive(200 * 1024),
    };
    let err = acquirer(fetcher).acquire(root, "1.14.7").unwrap_err();

    assert_eq!(err.code(), ErrorCode::NetworkError);
    assert!(matches!(
        err,
        Error::Network { url: Some(ref url), .. } if url.ends_with("go1.14.7.linux-amd64.tar.gz")
    ));
    assert!(fs::symlink_metadata(&slot).unwrap().is_dir());
    assert_eq!(fs::read_to_string(slot.join("go/VERSION")).unwrap(), "go1.13.14");
    assert!(!root.join("1.14.7").exists());

    let expected: BTreeSet<String> = ["1.13.14".to_string()].into_iter().collect();
    assert_eq!(listing(root), expected);
}

#[test]
fn test_slot_serving_newer_version_is_replaced_by_requested_install() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    install(root, "1.13.14", "go1.13.14");

    let fetcher = FakeFetcher::default()
        .serve("go1.14.7.linux-amd64.tar.gz", go_archive("go1.14.7"))
        .serve("go1.13.14.linux-amd64.tar.gz", go_archive("go1.13.14"));
    let acquirer = acquirer(&fetcher);
    acquirer.acquire(root, "1.14.7").unwrap();

    // 1.13.14 is now a link serving 1.14.7
    let outcome = acquirer.acquire(root, "1.13.14").unwrap();
    assert_eq!(
        outcome,
        AcquireOutcome::ReplacedRemotely {
            previous: "go1.14.7".to_string(),
            version: "go1.13.14".to_string(),
            path: root.join("1.13.14"),
        }
    );

    let slot = root.join("1.13.14");
    assert!(fs::symlink_metadata(&slot).unwrap().is_dir());
    assert_eq!(fs::read_to_string(slot.join("go/VERSION")).unwrap(), "go1.13.14");
    let other = root.join("1.14.7");
    assert_eq!(fs::read_to_string(other.join("go/VERSION")).unwrap(), "go1.14.7");

    let expected: BTreeSet<String> = ["1.13.14", "1.14.7"].iter().map(|s| s.to_string()).collect();
    assert_eq!(listing(root), expected);

    let outcome = acquirer.acquire(root, "1.13.14").unwrap();
    assert!(!outcome.changed());
    assert_eq!(fetcher.requests.borrow().len(), 2);
}

#[test]
fn test_zero_patch_request_matches_first_release_of_line() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    install(root, "1.14.7", "go1.14.7");

    let fetcher = FakeFetcher::default().serve("go1.15.linux-amd64.tar.gz", go_archive("go1.15"));
    let outcome = acquirer(&fetcher).acquire(root, "1.15.0").unwrap();

    assert_eq!(
        outcome.to_string(),
        "[remote] go1.14.7 has been replaced by go1.15."
    );
    assert_eq!(fs::read_link(root.join("1.14.7")).unwrap(), root.join("1.15"));
}

#[test]
fn test_malformed_version() {
    let temp = TempDir::new().unwrap();
    let fetcher = FakeFetcher::default();

    for input in ["", "1", "1.x", "latest", "1.16rc1"] {
        let err = acquirer(&fetcher).acquire(temp.path(), input).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedVersion, "input {input:?}");
    }
}

#[test]
fn test_unsupported_version() {
    let temp = TempDir::new().unwrap();
    install(temp.path(), "1.14.7", "go1.14.7");

    let fetcher = FakeFetcher::default();
    let err = acquirer(&fetcher).acquire(temp.path(), "1.15.1").unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnsupportedVersion);

    // no prefix confusion between 1.1 and 1.14
    let err = acquirer(&fetcher).acquire(temp.path(), "1.1").unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnsupportedVersion);
}

#[test]
fn test_stable_release_without_platform_archive() {
    let temp = TempDir::new().unwrap();
    install(temp.path(), "1.11.13", "go1.11.13");

    let fetcher = FakeFetcher::default();
    let err = acquirer(&fetcher).acquire(temp.path(), "1.12").unwrap_err();
    assert!(matches!(err, Error::FileNotFound { ref platform, .. } if platform == "linux/amd64"));
}
