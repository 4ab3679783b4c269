// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! The lazy stream of records a server sends back for a submitted statement.

use crate::buffer::{RecordReceiver, StreamEvent};
use crate::error::{Error, FailureKind};
use crate::record::Record;
use crate::summary::ResultSummary;
use futures::{Stream, StreamExt};
use std::pin::Pin;

const LOG_TARGET: &str = "neobolt-stream";

/// The source of decoded server messages feeding a [`ResultStream`].
///
/// Using this and not a concrete receiver type means that a stream can be
/// tested in isolation with dummy sources, and that the connection layer can
/// swap in replay or pre-decoded sources.
pub type RecordSource = Pin<Box<dyn Stream<Item = Result<StreamEvent, Error>> + Send + 'static>>;

/// The capability a [`ResultStream`] uses to abort its underlying request.
///
/// [`ResultStream::close`] calls [`StreamControl::discard`] and then drains
/// the record source to completion; the implementation must therefore cause
/// the decoder to finish the event stream (eg by sending the protocol's
/// discard/reset message and dropping the sender half of the record buffer).
pub trait StreamControl: Send {
    /// Tell the connection layer to discard the rest of this result.
    fn discard(&mut self);
}

impl<F: FnMut() + Send> StreamControl for F {
    fn discard(&mut self) {
        self()
    }
}

/// Where the stream is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InnerState {
    /// Waiting for the result header; field metadata is not yet known.
    HeaderPending,
    /// The header arrived; records are being fetched.
    Streaming,
    /// The server finished the result normally.
    Ended,
    /// The stream failed; the failure is sticky until close.
    Failed,
    /// The stream was explicitly closed.
    Closed,
}

/// The sticky failure of a stream, kept queryable after the original error
/// has been handed out (and after close).
struct Failure {
    kind: FailureKind,
    code: Option<String>,
    message: Option<String>,
}

impl Failure {
    fn of(error: &Error) -> Failure {
        let (kind, code, message) = match error {
            Error::Statement { code, message } => (
                FailureKind::Statement,
                Some(code.clone()),
                Some(message.clone()),
            ),
            Error::Protocol(m) => (FailureKind::Protocol, None, Some(m.clone())),
            Error::ConnectionClosed => (FailureKind::ConnectionClosed, None, None),
            Error::OutOfMemory => (FailureKind::OutOfMemory, None, None),
            Error::Io(e) => (FailureKind::Io, None, Some(e.to_string())),
            // Anything else poisoning a stream is connection-level damage
            // from this stream's point of view.
            other => (FailureKind::Protocol, None, Some(other.to_string())),
        };
        Failure {
            kind,
            code,
            message,
        }
    }

    fn to_error(&self) -> Error {
        match self.kind {
            FailureKind::Statement => Error::Statement {
                code: self.code.clone().unwrap_or_default(),
                message: self.message.clone().unwrap_or_default(),
            },
            FailureKind::Protocol => Error::Protocol(self.message.clone().unwrap_or_default()),
            FailureKind::ConnectionClosed => Error::ConnectionClosed,
            FailureKind::OutOfMemory => Error::OutOfMemory,
            FailureKind::Io => Error::Io(std::io::Error::other(
                self.message.clone().unwrap_or_default(),
            )),
        }
    }
}

/// The stream of records a server sends back for one submitted statement.
///
/// Records are delivered in server-emission order, one per
/// [`ResultStream::next_record`] call; field metadata becomes available with
/// the first server response. A returned [`Record`] is a cheap handle that
/// keeps its values alive for as long as it is held, so keep (or
/// [`Record::retain`]) any record you need beyond the next fetch.
///
/// Failures are sticky: once the stream has failed, every subsequent
/// operation reports the same failure, though records buffered before a
/// mid-stream failure are still drained first. [`ResultStream::close`]
/// aborts the underlying request and is terminal.
pub struct ResultStream {
    source: Option<RecordSource>,
    control: Option<Box<dyn StreamControl>>,
    state: InnerState,
    fields: Option<Vec<String>>,
    lookahead: Option<Record>,
    failure: Option<Failure>,
    summary: Option<ResultSummary>,
}

impl std::fmt::Debug for ResultStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultStream")
            .field("state", &self.state)
            .field("fields", &self.fields)
            .finish()
    }
}

impl ResultStream {
    /// Create a stream over any [`RecordSource`], with the given control
    /// capability for aborting the underlying request on close.
    pub fn new(source: RecordSource, control: impl StreamControl + 'static) -> Self {
        ResultStream {
            source: Some(source),
            control: Some(Box::new(control)),
            state: InnerState::HeaderPending,
            fields: None,
            lookahead: None,
            failure: None,
            summary: None,
        }
    }

    /// Create a stream draining a [`RecordReceiver`]; this is how the
    /// connection layer hands a submitted statement's results to the caller.
    pub fn from_receiver(receiver: RecordReceiver, control: impl StreamControl + 'static) -> Self {
        Self::new(Box::pin(receiver), control)
    }

    /// Create a stream that is already failed. Used when a statement could
    /// not be submitted at all; every operation on the returned stream
    /// reports the failure. Errors outside the stable [`FailureKind`]s are
    /// carried with [`FailureKind::Protocol`].
    pub fn failed(error: Error) -> Self {
        ResultStream {
            source: None,
            control: None,
            state: InnerState::Failed,
            fields: None,
            lookahead: None,
            failure: Some(Failure::of(&error)),
            summary: None,
        }
    }

    /// The failure kind of the stream, or `None` while it is healthy. Pure
    /// query; never blocks.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure.as_ref().map(|f| f.kind)
    }

    /// The server-supplied error code. Only present when
    /// [`Self::failure_kind`] is [`FailureKind::Statement`].
    pub fn server_code(&self) -> Option<&str> {
        self.statement_failure()?.code.as_deref()
    }

    /// The server-supplied error message. Only present when
    /// [`Self::failure_kind`] is [`FailureKind::Statement`].
    pub fn server_message(&self) -> Option<&str> {
        self.statement_failure()?.message.as_deref()
    }

    /// The number of fields in each record, waiting for the result header if
    /// it has not arrived yet. The returned value never changes once known.
    pub async fn field_count(&mut self) -> Result<usize, Error> {
        self.await_header().await?;
        Ok(self.fields.as_ref().expect("header was awaited; qed").len())
    }

    /// The name of the `i`-th field, waiting for the result header if it has
    /// not arrived yet. An out-of-range index is an error (and does not
    /// poison the stream).
    pub async fn field_name(&mut self, i: usize) -> Result<&str, Error> {
        let len = self.field_count().await?;
        if i >= len {
            return Err(Error::FieldOutOfRange { index: i, len });
        }
        Ok(&self.fields.as_ref().expect("header was awaited; qed")[i])
    }

    /// All field names, in server order. Empty until the result header has
    /// been received; use [`Self::field_count`] to wait for it.
    pub fn field_names(&self) -> &[String] {
        self.fields.as_deref().unwrap_or(&[])
    }

    /// Fetch the next record, or `None` once the result has ended. Asking
    /// again after the end keeps returning `None`; asking after a failure
    /// keeps returning the failure.
    pub async fn next_record(&mut self) -> Result<Option<Record>, Error> {
        if let Some(record) = self.lookahead.take() {
            return Ok(Some(record));
        }
        self.fetch_one().await
    }

    /// Look at the next record without consuming it; the following
    /// [`Self::next_record`] call will return the same record.
    pub async fn peek_record(&mut self) -> Result<Option<&Record>, Error> {
        if self.lookahead.is_none() {
            self.lookahead = self.fetch_one().await?;
        }
        Ok(self.lookahead.as_ref())
    }

    /// The statement summary the server attached to the end of the result.
    /// `None` until the stream has ended normally.
    pub fn summary(&self) -> Option<&ResultSummary> {
        self.summary.as_ref()
    }

    /// Close the stream, aborting the underlying request via the stream's
    /// [`StreamControl`] and draining anything the decoder had already
    /// delivered. Legal in any state, idempotent, and terminal: afterwards
    /// the fetching operations report [`Error::StreamClosed`], though an
    /// earlier failure stays queryable through [`Self::failure_kind`] and
    /// friends.
    ///
    /// A transport or protocol error first encountered while draining is
    /// returned, but the stream ends up closed regardless.
    pub async fn close(&mut self) -> Result<(), Error> {
        if matches!(self.state, InnerState::Closed) {
            return Ok(());
        }
        tracing::debug!(target: LOG_TARGET, "closing result stream in state {:?}", self.state);

        self.lookahead = None;
        if let Some(mut control) = self.control.take() {
            control.discard();
        }

        let mut drain_error = None;
        if let Some(mut source) = self.source.take() {
            while let Some(event) = source.next().await {
                let Err(e) = event else { continue };
                if self.failure.is_none() {
                    self.failure = Some(Failure::of(&e));
                    drain_error = Some(e);
                }
            }
        }

        self.state = InnerState::Closed;
        match drain_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Wait until field metadata is known (or the stream is done for).
    async fn await_header(&mut self) -> Result<(), Error> {
        loop {
            match self.state {
                InnerState::HeaderPending => match self.fetch_event().await {
                    Some(Ok(StreamEvent::Header { fields })) => {
                        tracing::trace!(
                            target: LOG_TARGET,
                            "result header received, {} fields",
                            fields.len()
                        );
                        self.fields = Some(fields);
                        self.state = InnerState::Streaming;
                        return Ok(());
                    }
                    Some(Ok(StreamEvent::Record(_))) => {
                        return Err(
                            self.fail(Error::Protocol("record before the result header".into()))
                        );
                    }
                    Some(Ok(StreamEvent::End(_))) => {
                        return Err(self.fail(Error::Protocol(
                            "end of result before the result header".into(),
                        )));
                    }
                    Some(Err(e)) => return Err(self.fail(e)),
                    None => return Err(self.fail(Error::ConnectionClosed)),
                },
                InnerState::Streaming | InnerState::Ended => return Ok(()),
                // Metadata seen before the failure stays valid.
                InnerState::Failed if self.fields.is_some() => return Ok(()),
                InnerState::Failed => return Err(self.replay_failure()),
                InnerState::Closed => return Err(Error::StreamClosed),
            }
        }
    }

    /// Pull the next record off the source, driving the state machine.
    async fn fetch_one(&mut self) -> Result<Option<Record>, Error> {
        loop {
            match self.state {
                InnerState::HeaderPending => self.await_header().await?,
                InnerState::Streaming => {
                    return match self.fetch_event().await {
                        Some(Ok(StreamEvent::Record(values))) => {
                            Ok(Some(Record::from_values(values)))
                        }
                        Some(Ok(StreamEvent::End(summary))) => {
                            tracing::trace!(target: LOG_TARGET, "end of result");
                            self.summary = Some(summary);
                            self.state = InnerState::Ended;
                            self.source = None;
                            Ok(None)
                        }
                        Some(Ok(StreamEvent::Header { .. })) => {
                            Err(self.fail(Error::Protocol("second result header".into())))
                        }
                        Some(Err(e)) => Err(self.fail(e)),
                        None => Err(self.fail(Error::ConnectionClosed)),
                    };
                }
                InnerState::Ended => return Ok(None),
                InnerState::Failed => return Err(self.replay_failure()),
                InnerState::Closed => return Err(Error::StreamClosed),
            }
        }
    }

    async fn fetch_event(&mut self) -> Option<Result<StreamEvent, Error>> {
        match &mut self.source {
            Some(source) => source.next().await,
            None => None,
        }
    }

    /// Record a failure and drop the source; the decoder side observes the
    /// buffer closing and stops producing.
    fn fail(&mut self, error: Error) -> Error {
        tracing::debug!(target: LOG_TARGET, "result stream failed: {error}");
        self.failure = Some(Failure::of(&error));
        self.state = InnerState::Failed;
        self.source = None;
        error
    }

    fn replay_failure(&self) -> Error {
        self.failure
            .as_ref()
            .expect("state is Failed only with a failure recorded; qed")
            .to_error()
    }

    fn statement_failure(&self) -> Option<&Failure> {
        self.failure
            .as_ref()
            .filter(|f| f.kind == FailureKind::Statement)
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use crate::value::Value;

    /// Build a [`RecordSource`] from a fixed sequence of events.
    pub fn source_of(
        events: impl IntoIterator<Item = Result<StreamEvent, Error>>,
    ) -> RecordSource {
        let events: Vec<_> = events.into_iter().collect();
        Box::pin(futures::stream::iter(events))
    }

    /// A stream over the given events with a no-op control.
    pub fn stream_of(
        events: impl IntoIterator<Item = Result<StreamEvent, Error>>,
    ) -> ResultStream {
        ResultStream::new(source_of(events), || ())
    }

    pub fn header(fields: &[&str]) -> Result<StreamEvent, Error> {
        Ok(StreamEvent::Header {
            fields: fields.iter().map(|f| (*f).to_owned()).collect(),
        })
    }

    pub fn record(values: impl IntoIterator<Item = i64>) -> Result<StreamEvent, Error> {
        Ok(StreamEvent::Record(
            values.into_iter().map(Value::Int).collect(),
        ))
    }

    pub fn end() -> Result<StreamEvent, Error> {
        Ok(StreamEvent::End(ResultSummary::default()))
    }

    pub fn syntax_error() -> Result<StreamEvent, Error> {
        Err(Error::Statement {
            code: "Neo.ClientError.Statement.SyntaxError".to_owned(),
            message: "Invalid input".to_owned(),
        })
    }
}
