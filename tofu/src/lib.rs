// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Trust-on-first-use (TOFU) host verification for the neobolt client.
//!
//! When connecting over TLS to a server whose certificate is not signed by a
//! known authority, the client pins the certificate fingerprint it saw on the
//! first connection and checks it on every subsequent one. The pinned
//! fingerprints live in a plain-text known-hosts file, one
//! `hostname:port fingerprint` entry per line, rewritten atomically on every
//! change.
//!
//! [`HostVerifier`] is the entry point: configure it with an optional file
//! location and an optional decision callback, then call
//! [`HostVerifier::verify`] with the fingerprint presented during the TLS
//! handshake.

#![deny(missing_docs)]

mod store;
mod verify;

pub use store::{default_path, lookup, replace, MAX_LINE_LEN};
pub use verify::{HostVerifier, TrustDecision, TrustProblem, Verdict};

/// The target used for all tracing logs in this crate.
pub const LOG_TARGET: &str = "neobolt-tofu";

/// Things that can go wrong looking up or pinning a host fingerprint.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Io error reading or rewriting the known-hosts file.
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    /// The hostname handed to the verifier is empty or too long.
    #[error("Invalid hostname: {0}")]
    InvalidHostname(String),
    /// A matching known-hosts entry exceeds the maximum line length.
    #[error("Known-hosts entry for {label} exceeds the maximum line length")]
    EntryTooLong {
        /// The `hostname:port` label of the offending entry.
        label: String,
    },
    /// No known-hosts path was provided and no home directory could be found
    /// to derive the default one from.
    #[error("No known-hosts path given and no home directory to derive one from")]
    NoDefaultPath,
}
