// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! The bounded buffer between the protocol decoder and a result stream.
//!
//! The connection layer holds the [`RecordSender`] and pushes decoded
//! server messages into it as they arrive off the wire; a
//! [`crate::ResultStream`] drains the matching [`RecordReceiver`]. The
//! channel is bounded, so a consumer that stops fetching eventually
//! backpressures the decoder.

use crate::error::Error;
use crate::summary::ResultSummary;
use crate::value::Value;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// One decoded server message on its way from the decoder to a result
/// stream.
#[derive(Debug)]
pub enum StreamEvent {
    /// The result header: the field names, in server order. Sent exactly
    /// once, before any record.
    Header {
        /// The field names of every record to follow.
        fields: Vec<String>,
    },
    /// One decoded record row.
    Record(Vec<Value>),
    /// The result completed, with its trailing metadata.
    End(ResultSummary),
}

/// Returned by [`RecordSender`] methods when the consuming result stream has
/// been dropped or closed; the decoder should stop producing.
#[derive(Debug, thiserror::Error)]
#[error("The result stream consuming this record buffer has gone away")]
pub struct BufferClosed;

/// Create a record buffer of the given capacity, returning the decoder-facing
/// sender and the stream-facing receiver.
pub fn record_channel(capacity: usize) -> (RecordSender, RecordReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (RecordSender { tx }, RecordReceiver { rx })
}

/// The decoder-facing half of a record buffer. Each `send_*` method waits
/// for buffer space, which is what backpressures the decoder.
#[derive(Debug, Clone)]
pub struct RecordSender {
    tx: mpsc::Sender<Result<StreamEvent, Error>>,
}

impl RecordSender {
    /// Deliver the result header.
    pub async fn send_header(&self, fields: Vec<String>) -> Result<(), BufferClosed> {
        self.send(Ok(StreamEvent::Header { fields })).await
    }

    /// Deliver one decoded record row.
    pub async fn send_record(&self, values: Vec<Value>) -> Result<(), BufferClosed> {
        self.send(Ok(StreamEvent::Record(values))).await
    }

    /// Deliver the end of the result, with its summary metadata.
    pub async fn send_end(&self, summary: ResultSummary) -> Result<(), BufferClosed> {
        self.send(Ok(StreamEvent::End(summary))).await
    }

    /// Deliver a failure. Records sent before it remain fetchable; the
    /// stream reports the failure once they are drained.
    pub async fn send_failure(&self, error: Error) -> Result<(), BufferClosed> {
        self.send(Err(error)).await
    }

    async fn send(&self, event: Result<StreamEvent, Error>) -> Result<(), BufferClosed> {
        self.tx.send(event).await.map_err(|_| BufferClosed)
    }
}

/// The stream-facing half of a record buffer.
#[derive(Debug)]
pub struct RecordReceiver {
    rx: mpsc::Receiver<Result<StreamEvent, Error>>,
}

impl Stream for RecordReceiver {
    type Item = Result<StreamEvent, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn events_arrive_in_send_order() {
        let (tx, mut rx) = record_channel(8);

        tx.send_header(vec!["n".into()]).await.unwrap();
        tx.send_record(vec![Value::Int(1)]).await.unwrap();
        tx.send_end(ResultSummary::default()).await.unwrap();
        drop(tx);

        assert!(matches!(
            rx.next().await,
            Some(Ok(StreamEvent::Header { .. }))
        ));
        assert!(matches!(rx.next().await, Some(Ok(StreamEvent::Record(_)))));
        assert!(matches!(rx.next().await, Some(Ok(StreamEvent::End(_)))));
        assert!(rx.next().await.is_none());
    }

    #[tokio::test]
    async fn sending_into_a_dropped_receiver_reports_closure() {
        let (tx, rx) = record_channel(8);
        drop(rx);

        assert!(tx.send_record(vec![]).await.is_err());
    }

    #[tokio::test]
    async fn a_full_buffer_backpressures_the_sender() {
        use futures::FutureExt;

        let (tx, mut rx) = record_channel(1);
        tx.send_record(vec![Value::Int(1)]).await.unwrap();

        // The buffer is full now, so the next send cannot complete until the
        // consumer drains a record.
        let mut pending = Box::pin(tx.send_record(vec![Value::Int(2)]));
        assert!(pending.as_mut().now_or_never().is_none());

        assert!(matches!(rx.next().await, Some(Ok(StreamEvent::Record(_)))));
        assert!(pending.now_or_never().is_some());
    }
}
