// Copyright 2019-2025 Parity Technologies (UK) Ltd.
// This file is dual-licensed as Apache-2.0 or GPL-3.0.
// see LICENSE for license details.

//! End-to-end exercise of the public API: a decoder task feeding a record
//! buffer, a consumer draining the result stream, and the TOFU verifier
//! gating the connection, the way a connection layer wires them together.

use neobolt::tofu::{HostVerifier, TrustDecision, Verdict};
use neobolt::{record_channel, Error, ResultStream, ResultSummary, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn statement_results_flow_from_decoder_to_consumer() {
    init_tracing();

    let (tx, rx) = record_channel(4);
    let mut stream = ResultStream::from_receiver(rx, || ());

    // Stand-in for the connection task decoding server messages.
    let decoder = tokio::spawn(async move {
        tx.send_header(vec!["name".into(), "age".into()])
            .await
            .unwrap();
        tx.send_record(vec![Value::from("Alice"), Value::Int(42)])
            .await
            .unwrap();
        tx.send_record(vec![Value::from("Bob"), Value::Int(7)])
            .await
            .unwrap();
        tx.send_end(ResultSummary::default()).await.unwrap();
    });

    assert_eq!(stream.field_count().await.unwrap(), 2);
    assert_eq!(stream.field_name(0).await.unwrap(), "name");

    let mut names = Vec::new();
    while let Some(record) = stream.next_record().await.unwrap() {
        names.push(record.field(0).as_str().unwrap().to_owned());
    }
    assert_eq!(names, ["Alice", "Bob"]);
    assert!(stream.summary().is_some());

    stream.close().await.unwrap();
    decoder.await.unwrap();
}

#[tokio::test]
async fn mid_stream_server_failures_surface_after_the_buffered_records() {
    init_tracing();

    let (tx, rx) = record_channel(4);
    let mut stream = ResultStream::from_receiver(rx, || ());

    let decoder = tokio::spawn(async move {
        tx.send_header(vec!["n".into()]).await.unwrap();
        tx.send_record(vec![Value::Int(1)]).await.unwrap();
        tx.send_failure(Error::Statement {
            code: "Neo.ClientError.Statement.SyntaxError".into(),
            message: "Invalid input".into(),
        })
        .await
        .unwrap();
    });

    assert!(stream.next_record().await.unwrap().is_some());
    assert!(stream.next_record().await.is_err());
    assert_eq!(
        stream.server_code(),
        Some("Neo.ClientError.Statement.SyntaxError")
    );

    decoder.await.unwrap();
}

#[tokio::test]
async fn a_connection_gated_by_tofu_pins_on_first_use() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let verifier = HostVerifier::new()
        .with_path(dir.path().join("known_certs"))
        .with_callback(|_, _, _| TrustDecision::Trust);

    // First connection: unknown host, callback pins it.
    assert_eq!(
        verifier.verify("db.example", 7687, "AA:BB").unwrap(),
        Verdict::Trusted
    );
    // Reconnect: pinned fingerprint matches without consulting anyone.
    let verifier = HostVerifier::new().with_path(dir.path().join("known_certs"));
    assert_eq!(
        verifier.verify("db.example", 7687, "AA:BB").unwrap(),
        Verdict::Trusted
    );
    // A different fingerprint on reconnect is the thing TOFU exists to catch.
    assert_eq!(
        verifier.verify("db.example", 7687, "CC:DD").unwrap(),
        Verdict::Rejected
    );
}
