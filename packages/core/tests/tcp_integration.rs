//! TCP engine integration tests
//!
//! Real sockets over loopback: establishment, deadline-bounded reads and
//! accepts, eof handling and idempotent close.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use sockline_core::config::SocketConfig;
use sockline_core::error::{BaseCode, Kind, OsCode};
use sockline_core::io::{Reader, Writer};
use sockline_core::telemetry::global_stats;
use sockline_core::{connect_tcp, connect_with, listen_tcp};

/// Asserts `elapsed` lies within `budget_ms * (1 ± 0.5)`.
fn assert_within_window(elapsed: Duration, budget_ms: u64) {
    let low = Duration::from_millis(budget_ms / 2);
    let high = Duration::from_millis(budget_ms + budget_ms / 2);
    assert!(
        elapsed >= low && elapsed <= high,
        "elapsed {elapsed:?} outside [{low:?}, {high:?}]"
    );
}

/// A port nothing is listening on.
fn closed_port() -> u16 {
    let listener = listen_tcp(0).expect("bind ephemeral port");
    let port = listener.local_port().expect("local port");
    listener.close().expect("close listener");
    port
}

#[test]
fn test_message_round_trip_on_8080() {
    let listener = listen_tcp(8080).expect("listen on 8080");

    let server = thread::spawn(move || {
        let conn = listener.accept().expect("accept client");
        let mut buf = [0u8; 8];
        conn.read_full(&mut buf).expect("read full message");
        buf
    });

    let conn = connect_tcp("localhost", 8080, 1000).expect("connect to localhost:8080");
    conn.write_full(b"message\0").expect("write message");

    let received = server.join().expect("server thread");
    assert_eq!(&received, b"message\0");
}

#[test]
fn test_loopback_round_trip_is_byte_identical() {
    let listener = listen_tcp(0).expect("listen");
    let port = listener.local_port().expect("local port");

    let payload: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    let expected = payload.clone();

    let server = thread::spawn(move || {
        let conn = listener.accept().expect("accept");
        let mut buf = vec![0u8; 64 * 1024];
        conn.read_full(&mut buf).expect("read payload");
        conn.write_full(&buf).expect("echo payload");
    });

    let conn = connect_tcp("127.0.0.1", port, 1000).expect("connect");
    conn.write_full(&payload).expect("send payload");
    let mut echoed = vec![0u8; payload.len()];
    conn.read_full(&mut echoed).expect("read echo");
    server.join().expect("server thread");

    assert_eq!(echoed, expected);
}

#[test]
fn test_read_full_reports_eof_on_short_peer() {
    let listener = listen_tcp(0).expect("listen");
    let port = listener.local_port().expect("local port");

    let server = thread::spawn(move || {
        let conn = listener.accept().expect("accept");
        conn.write_full(b"abc").expect("write partial");
        conn.close().expect("close");
    });

    let conn = connect_tcp("127.0.0.1", port, 1000).expect("connect");
    let mut buf = [0u8; 8];
    let err = conn.read_full(&mut buf).expect_err("peer closed early");
    server.join().expect("server thread");

    assert!(err.is_eof(), "expected eof, got {err:?}");
    assert_eq!(err, BaseCode::Eof);
}

#[test]
fn test_read_times_out_against_silent_peer() {
    let listener = listen_tcp(0).expect("listen");
    let port = listener.local_port().expect("local port");
    let (done_tx, done_rx) = mpsc::channel::<()>();

    let server = thread::spawn(move || {
        let _conn = listener.accept().expect("accept");
        // hold the connection open without writing
        let _ = done_rx.recv();
    });

    let conn = connect_tcp("127.0.0.1", port, 1000).expect("connect");
    conn.set_timeout(300).expect("set timeout");

    let start = Instant::now();
    let mut buf = [0u8; 16];
    let err = conn.read(&mut buf).expect_err("silent peer");
    let elapsed = start.elapsed();

    done_tx.send(()).expect("release server");
    server.join().expect("server thread");

    assert!(err.is_timeout(), "expected timedout, got {err:?}");
    assert!(!err.is_would_block());
    assert_within_window(elapsed, 300);
}

#[test]
fn test_accept_times_out_without_clients() {
    let listener = listen_tcp(0).expect("listen");
    listener.set_timeout(200).expect("set timeout");

    let start = Instant::now();
    let err = listener.accept().expect_err("nobody connects");

    assert_eq!(err, OsCode::TimedOut);
    assert_within_window(start.elapsed(), 200);
}

#[test]
fn test_accept_with_timeout_records_peer() {
    let listener = listen_tcp(0).expect("listen");
    listener.set_timeout(2000).expect("set timeout");
    let port = listener.local_port().expect("local port");

    let client = thread::spawn(move || {
        let conn = connect_tcp("127.0.0.1", port, 1000).expect("connect");
        let local = conn.local_port().expect("client local port");
        conn.write_full(b"x").expect("write");
        (local, conn)
    });

    let accepted = listener.accept().expect("accept within budget");
    let (client_port, client_conn) = client.join().expect("client thread");

    assert_eq!(accepted.remote_address().to_string(), "127.0.0.1");
    assert_eq!(accepted.remote_port(), client_port);
    assert_eq!(client_conn.remote_port(), port);
    // accepted connections start blocking regardless of the listener budget
    assert_eq!(accepted.timeout(), 0);
}

#[test]
fn test_connect_timeout_against_unroutable_address() {
    let start = Instant::now();
    match connect_tcp("10.255.255.1", 80, 500) {
        Err(err) if err.is_timeout() => assert_within_window(start.elapsed(), 500),
        Err(err) => {
            // sandboxes without a route fail fast instead of timing out
            assert_eq!(err.kind(), Kind::Os, "unexpected error {err:?}");
            println!("skipping timing check: {err}");
        }
        Ok(conn) => println!("unexpectedly reached {}", conn.remote_address()),
    }
}

#[test]
fn test_refused_connect_is_not_a_timeout() {
    let port = closed_port();

    let err = connect_tcp("127.0.0.1", port, 0).expect_err("blocking connect refused");
    assert_eq!(err, OsCode::ConnectionRefused);
    assert!(!err.is_timeout());

    let err = connect_tcp("127.0.0.1", port, 1000).expect_err("bounded connect refused");
    assert_eq!(err, OsCode::ConnectionRefused);
    assert!(!err.is_timeout());
}

#[test]
fn test_resolver_failure_keeps_its_kind() {
    let err = connect_tcp("nonexistent.invalid", 80, 1000).expect_err("unresolvable host");
    assert_eq!(err.kind(), Kind::Resolver);
}

#[test]
fn test_close_twice_is_ok() {
    let listener = listen_tcp(0).expect("listen");
    let port = listener.local_port().expect("local port");

    let server = thread::spawn(move || listener.accept().expect("accept"));
    let conn = connect_tcp("127.0.0.1", port, 1000).expect("connect");
    let _peer = server.join().expect("server thread");

    conn.close().expect("first close");
    conn.close().expect("second close");
    assert!(conn.is_closed());

    let mut buf = [0u8; 4];
    assert_eq!(conn.read(&mut buf).expect_err("closed"), BaseCode::IllegalState);
}

#[test]
fn test_read_line_over_tcp() {
    let listener = listen_tcp(0).expect("listen");
    let port = listener.local_port().expect("local port");

    let server = thread::spawn(move || {
        let mut conn = listener.accept().expect("accept");
        Writer::write_full(&mut conn, b"first line\nsecond\n").expect("write lines");
    });

    let mut conn = connect_tcp("127.0.0.1", port, 1000).expect("connect");
    let mut buf = [0u8; 32];
    let n = Reader::read_line(&mut conn, &mut buf).expect("first line");
    assert_eq!(&buf[..=n], b"first line\n\0");
    let n = conn.read_line(&mut buf).expect("second line");
    assert_eq!(&buf[..=n], b"second\n\0");

    server.join().expect("server thread");
}

#[test]
fn test_connect_with_applies_config() {
    let listener = listen_tcp(0).expect("listen");
    let port = listener.local_port().expect("local port");
    let server = thread::spawn(move || listener.accept().expect("accept"));

    let config = SocketConfig::default()
        .with_connect_timeout(Some(Duration::from_secs(1)))
        .with_io_timeout(Some(Duration::from_millis(750)))
        .with_nodelay(true)
        .with_keepalive(Some(Duration::from_secs(30)));

    let conn = connect_with("127.0.0.1", port, &config).expect("connect with config");
    let _peer = server.join().expect("server thread");

    assert_eq!(conn.timeout(), 750);
}

#[test]
fn test_invalid_config_is_rejected_before_connecting() {
    let config = SocketConfig::default().with_io_timeout(Some(Duration::ZERO));
    let err = connect_with("127.0.0.1", 9, &config).expect_err("zero io timeout");
    assert_eq!(err, BaseCode::IllegalArgument);
}

#[test]
fn test_keep_alive_period_must_be_positive() {
    let listener = listen_tcp(0).expect("listen");
    let port = listener.local_port().expect("local port");
    let server = thread::spawn(move || listener.accept().expect("accept"));

    let conn = connect_tcp("127.0.0.1", port, 1000).expect("connect");
    let _peer = server.join().expect("server thread");

    assert_eq!(conn.set_keep_alive_period(0).expect_err("zero period"), BaseCode::IllegalArgument);
    conn.set_keep_alive(true).expect("enable keep-alive");
    conn.set_keep_alive_period(10).expect("ten second period");
    conn.set_no_delay(true).expect("nodelay");
}

#[test]
fn test_stats_count_connections() {
    let before = global_stats().snapshot();

    let listener = listen_tcp(0).expect("listen");
    let port = listener.local_port().expect("local port");
    let server = thread::spawn(move || listener.accept().expect("accept"));
    let _conn = connect_tcp("127.0.0.1", port, 1000).expect("connect");
    let _peer = server.join().expect("server thread");

    let after = global_stats().snapshot();
    assert!(after.connect_attempts > before.connect_attempts);
    assert!(after.connections_established > before.connections_established);
    assert!(after.accepted > before.accepted);
}
