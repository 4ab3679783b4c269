// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! Neobolt is the core of a client for graph database servers speaking the
//! Bolt protocol. It provides the two hard pieces every connection layer
//! builds on:
//!
//! - The **result stream**: a lazy, back-pressured stream of records coming
//!   back for a submitted statement. The connection layer decodes server
//!   messages into a [`buffer::RecordSender`]; callers drain the matching
//!   [`ResultStream`], which owns the header metadata, the end-of-result
//!   summary and the sticky failure state. Records are cheap shared handles;
//!   keep one around ([`Record::retain`]) to use it beyond the next fetch.
//!
//! - **Trust-on-first-use host verification** (re-exported as [`tofu`]):
//!   pinning server certificate fingerprints in an atomically rewritten
//!   known-hosts file and checking them on reconnect, with a caller-supplied
//!   policy callback for the interesting cases.
//!
//! Fetching records looks something like this:
//!
//! ```rust,no_run
//! # async fn example(mut stream: neobolt::ResultStream) -> Result<(), neobolt::Error> {
//! let n = stream.field_count().await?;
//! while let Some(record) = stream.next_record().await? {
//!     for i in 0..n {
//!         println!("{}: {:?}", stream.field_names()[i], record.field(i));
//!     }
//! }
//! stream.close().await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod buffer;
pub mod error;
pub mod record;
pub mod stream;
pub mod summary;
pub mod value;

// Expose a few of the most common types at root,
// but leave most types behind their respective modules.
pub use crate::{
    buffer::{record_channel, RecordReceiver, RecordSender, StreamEvent},
    error::{Error, FailureKind},
    record::Record,
    stream::{ResultStream, StreamControl},
    summary::ResultSummary,
    value::Value,
};

pub use neobolt_tofu as tofu;
