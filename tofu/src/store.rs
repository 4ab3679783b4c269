// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! The file-backed fingerprint store.
//!
//! All state lives in a plain-text file of `hostname:port fingerprint` lines.
//! [`lookup`] scans it; [`replace`] rewrites the whole file through a sibling
//! temp file and an atomic rename, so readers always observe either the old
//! or the new contents and a crash mid-rewrite leaves the original intact.
//!
//! Concurrent replacers on the same file are not serialized; the last rename
//! wins. Callers needing multi-process safety should hold an external
//! advisory lock around the lookup/replace pair.

use crate::{Error, LOG_TARGET};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Maximum length of a known-hosts line, including the terminating newline.
/// Longer lines are carried through rewrites untouched, but a *matching*
/// entry over this limit is reported as [`Error::EntryTooLong`] rather than
/// returned truncated.
pub const MAX_LINE_LEN: usize = 1024;

/// The default location of the known-hosts file, `~/.neo4j/neo4j_known_certs`.
///
/// Fails with [`Error::NoDefaultPath`] if no home directory can be found.
pub fn default_path() -> Result<PathBuf, Error> {
    let home = dirs::home_dir().ok_or(Error::NoDefaultPath)?;
    Ok(home.join(".neo4j").join("neo4j_known_certs"))
}

/// Look up the fingerprint pinned for `host_label` (a `hostname:port` string).
///
/// A missing file is not an error; it means no host has been pinned yet.
/// Leading whitespace on stored lines is tolerated, and the returned
/// fingerprint is trimmed of surrounding whitespace.
pub fn lookup(path: &Path, host_label: &str) -> Result<Option<String>, Error> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let Some(fingerprint) = match_entry(&line, host_label) else {
            continue;
        };
        if line.len() > MAX_LINE_LEN {
            return Err(Error::EntryTooLong {
                label: host_label.to_owned(),
            });
        }
        return Ok(Some(fingerprint.to_owned()));
    }
}

/// Pin `fingerprint` for `host_label`, replacing any previous entry.
///
/// The containing directory is created if needed (with owner-only
/// permissions on unix). The file is rewritten in full through a uniquely
/// named temp file in the same directory and renamed over the target, so the
/// update is atomic with respect to crashes and concurrent readers: any
/// failure leaves the original file untouched and removes the temp file.
pub fn replace(path: &Path, host_label: &str, fingerprint: &str) -> Result<(), Error> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    create_store_dir(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;

    // Carry over every line that isn't keyed by host_label. Over-long lines
    // are opaque pass-through; we never match against them here because a
    // matching entry is about to be superseded anyway.
    match File::open(path) {
        Ok(file) => {
            let mut reader = BufReader::new(file);
            let mut line = String::new();
            loop {
                line.clear();
                if reader.read_line(&mut line)? == 0 {
                    break;
                }
                if match_entry(&line, host_label).is_none() {
                    tmp.write_all(line.as_bytes())?;
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    writeln!(tmp, "{host_label} {fingerprint}")?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::debug!(
        target: LOG_TARGET,
        "pinned fingerprint for {host_label} in {}",
        path.display()
    );
    Ok(())
}

/// If `line` is an entry keyed by `host_label`, return the fingerprint part
/// (trimmed), otherwise `None`. Lines may carry leading whitespace.
fn match_entry<'a>(line: &'a str, host_label: &str) -> Option<&'a str> {
    let entry = line.trim_start();
    let rest = entry.strip_prefix(host_label)?;
    // The label must be followed by whitespace, not be a prefix of a longer
    // label (e.g. "host:7" matching "host:76").
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(rest.trim())
}

#[cfg(unix)]
fn create_store_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
}

#[cfg(not(unix))]
fn create_store_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}
