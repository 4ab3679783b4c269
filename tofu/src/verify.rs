// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! The trust decision layer above the fingerprint store.

use crate::{store, Error, LOG_TARGET};
use std::path::PathBuf;

/// Why the verifier is asking the callback for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustProblem {
    /// The host has never been seen before.
    Unrecognized,
    /// The host is known but presented a different fingerprint than the
    /// pinned one. This is what a MITM looks like.
    Mismatch,
}

/// What the callback decided to do about a [`TrustProblem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustDecision {
    /// Pin the presented fingerprint and trust it from now on.
    Trust,
    /// Trust the presented fingerprint for this connection only; nothing is
    /// persisted.
    AcceptOnce,
    /// Do not trust the host.
    Reject,
}

/// The outcome of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The presented fingerprint is trusted.
    Trusted,
    /// The presented fingerprint is not trusted; the connection should be
    /// torn down.
    Rejected,
}

type Callback = Box<dyn Fn(&str, &str, TrustProblem) -> TrustDecision + Send + Sync>;

/// Verifies server certificate fingerprints against the known-hosts store,
/// pinning them on first use.
///
/// With no callback installed, any unrecognized or mismatching fingerprint is
/// rejected. Install one with [`HostVerifier::with_callback`] to prompt the
/// user (or consult configuration) instead.
#[derive(Default)]
pub struct HostVerifier {
    path: Option<PathBuf>,
    callback: Option<Callback>,
}

impl std::fmt::Debug for HostVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostVerifier")
            .field("path", &self.path)
            .field("callback", &self.callback.as_ref().map(|_| ".."))
            .finish()
    }
}

impl HostVerifier {
    /// Construct a verifier against the default known-hosts location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given known-hosts file instead of the default location.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Install a decision callback, invoked whenever a host is unrecognized
    /// or presents a mismatching fingerprint.
    ///
    /// The callback receives the `hostname:port` label, the presented
    /// fingerprint and the [`TrustProblem`], and may take as long as it
    /// likes (eg prompting a user); no store state is held across the call.
    /// It must not re-enter the verifier.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &str, TrustProblem) -> TrustDecision + Send + Sync + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Check the fingerprint presented by `hostname:port` against the store.
    ///
    /// Returns [`Verdict::Trusted`] if it matches the pinned one, or if the
    /// callback vouches for it ([`TrustDecision::Trust`] additionally pins
    /// it for future connections). Store I/O problems, including a failure
    /// to pin after the callback said `Trust`, surface as `Err`.
    pub fn verify(
        &self,
        hostname: &str,
        port: u16,
        presented_fingerprint: &str,
    ) -> Result<Verdict, Error> {
        if hostname.is_empty() || hostname.len() >= 256 {
            return Err(Error::InvalidHostname(hostname.to_owned()));
        }

        let path = match &self.path {
            Some(path) => path.clone(),
            None => store::default_path()?,
        };
        let host_label = format!("{hostname}:{port}");

        let problem = match store::lookup(&path, &host_label)? {
            Some(known) if known == presented_fingerprint => {
                tracing::trace!(target: LOG_TARGET, "{host_label}: fingerprint matches pinned entry");
                return Ok(Verdict::Trusted);
            }
            Some(_) => TrustProblem::Mismatch,
            None => TrustProblem::Unrecognized,
        };

        let Some(callback) = &self.callback else {
            tracing::warn!(
                target: LOG_TARGET,
                "{host_label}: {problem:?} and no trust callback installed; rejecting"
            );
            return Ok(Verdict::Rejected);
        };

        match callback(&host_label, presented_fingerprint, problem) {
            TrustDecision::Trust => {
                store::replace(&path, &host_label, presented_fingerprint)?;
                Ok(Verdict::Trusted)
            }
            TrustDecision::AcceptOnce => Ok(Verdict::Trusted),
            TrustDecision::Reject => Ok(Verdict::Rejected),
        }
    }
}
