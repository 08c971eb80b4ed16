//! TLS layer integration tests
//!
//! A throwaway CA and a `localhost` leaf are generated with rcgen and written
//! to a per-test directory; clients and servers run on loopback threads.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use rcgen::{BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, Issuer, KeyPair, SanType};
use sockline_core::error::{BaseCode, Kind, OsCode, TlsCode};
use sockline_core::{SecureConnection, TlsConfig, connect_secure, listen_secure, listen_tcp};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// PEM files for a CA and a leaf certificate it signed.
struct TestPki {
    dir: PathBuf,
    ca_cert: PathBuf,
    ca_key: PathBuf,
    leaf_cert: PathBuf,
    leaf_key: PathBuf,
}

impl TestPki {
    fn generate() -> TestPki {
        let dir = std::env::temp_dir().join(format!(
            "sockline-tls-{}-{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).expect("create pki directory");

        let mut ca_params = CertificateParams::new(Vec::default()).expect("ca params");
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let mut ca_dn = DistinguishedName::new();
        ca_dn.push(DnType::CommonName, "sockline test CA");
        ca_params.distinguished_name = ca_dn;

        let ca_key_pair = KeyPair::generate().expect("ca key");
        let ca_cert = ca_params.clone().self_signed(&ca_key_pair).expect("self-sign ca");
        let ca_cert_pem = ca_cert.pem();
        let ca_key_pem = ca_key_pair.serialize_pem();
        let issuer = Issuer::<'static>::new(ca_params, ca_key_pair);

        let mut leaf_params = CertificateParams::new(Vec::default()).expect("leaf params");
        let mut leaf_dn = DistinguishedName::new();
        leaf_dn.push(DnType::CommonName, "localhost");
        leaf_params.distinguished_name = leaf_dn;
        leaf_params.subject_alt_names = vec![
            SanType::DnsName("localhost".try_into().expect("dns name")),
            SanType::IpAddress(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            SanType::IpAddress(IpAddr::V6(Ipv6Addr::LOCALHOST)),
        ];
        let leaf_key_pair = KeyPair::generate().expect("leaf key");
        let leaf_cert = leaf_params.signed_by(&leaf_key_pair, &issuer).expect("sign leaf");

        let pki = TestPki {
            ca_cert: dir.join("ca.pem"),
            ca_key: dir.join("ca.key"),
            leaf_cert: dir.join("server.pem"),
            leaf_key: dir.join("server.key"),
            dir,
        };
        write(&pki.ca_cert, &ca_cert_pem);
        write(&pki.ca_key, &ca_key_pem);
        write(&pki.leaf_cert, &leaf_cert.pem());
        write(&pki.leaf_key, &leaf_key_pair.serialize_pem());
        pki
    }

    fn server_config(&self) -> TlsConfig {
        TlsConfig::server(&self.leaf_cert, &self.leaf_key)
    }

    fn client_config(&self) -> TlsConfig {
        TlsConfig::default().with_ca_file(&self.ca_cert).with_native_roots(false)
    }
}

impl Drop for TestPki {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write pem file");
}

/// Accepts one client on a background thread and runs `serve` on it.
fn spawn_server<F>(config: &TlsConfig, serve: F) -> (u16, thread::JoinHandle<()>)
where
    F: FnOnce(sockline_core::Result<SecureConnection>) + Send + 'static,
{
    let listener = listen_secure(0, config).expect("listen secure");
    listener.set_timeout(5000).expect("listener timeout");
    let port = listener.local_port().expect("local port");
    let handle = thread::spawn(move || serve(listener.accept()));
    (port, handle)
}

#[test]
fn test_round_trip_with_private_ca() {
    let pki = TestPki::generate();

    let (port, server) = spawn_server(&pki.server_config(), |accepted| {
        let mut conn = accepted.expect("server handshake");
        let mut buf = [0u8; 5];
        conn.read_full(&mut buf).expect("read hello");
        assert_eq!(&buf, b"hello");
        conn.write_full(b"world\n").expect("write reply");
        conn.close().expect("server close");
    });

    let mut conn = connect_secure("localhost", port, 2000, &pki.client_config()).expect("client handshake");
    assert!(conn.protocol_version().is_some());
    conn.write_full(b"hello").expect("write hello");

    let mut line = [0u8; 16];
    let n = conn.read_line(&mut line).expect("read reply");
    assert_eq!(&line[..n], b"world\n");

    // close_notify from the server surfaces as eof
    let err = conn.read(&mut line).expect_err("server closed");
    assert_eq!(err, BaseCode::Eof);

    server.join().expect("server thread");
    println!("✅ TLS round trip over loopback");
}

#[test]
fn test_server_key_mismatch_is_reported() {
    let pki = TestPki::generate();
    let config = TlsConfig::server(&pki.leaf_cert, &pki.ca_key);

    let err = listen_secure(0, &config).expect_err("key belongs to another certificate");
    assert_eq!(err.kind(), Kind::Tls);
    assert_eq!(err, TlsCode::KeyMismatch);
}

#[test]
fn test_missing_certificate_file() {
    let pki = TestPki::generate();
    let config = TlsConfig::server(pki.dir.join("missing.pem"), &pki.leaf_key);

    let err = listen_secure(0, &config).expect_err("no such certificate file");
    assert_eq!(err, TlsCode::BadCertificateFile);
}

#[test]
fn test_missing_private_key_file() {
    let pki = TestPki::generate();
    let config = TlsConfig::server(&pki.leaf_cert, pki.dir.join("missing.key"));

    let err = listen_secure(0, &config).expect_err("no such key file");
    assert_eq!(err, TlsCode::BadPrivateKey);
}

#[test]
fn test_untrusted_server_fails_certificate_check() {
    let pki = TestPki::generate();
    let (port, server) = spawn_server(&pki.server_config(), |accepted| {
        assert!(accepted.is_err(), "client should abort the handshake");
    });

    let config = TlsConfig::default().with_native_roots(false);
    let err = connect_secure("localhost", port, 2000, &config).expect_err("unknown issuer");
    assert_eq!(err.kind(), Kind::Tls);
    assert_eq!(err, TlsCode::Certificate);

    server.join().expect("server thread");
}

#[test]
fn test_insecure_skip_verify_accepts_unknown_issuer() {
    let pki = TestPki::generate();
    let (port, server) = spawn_server(&pki.server_config(), |accepted| {
        let mut conn = accepted.expect("server handshake");
        conn.write_full(b"ok").expect("write");
    });

    let config = TlsConfig::default()
        .with_native_roots(false)
        .with_insecure_skip_verify(true);
    let mut conn = connect_secure("127.0.0.1", port, 2000, &config).expect("handshake without verification");
    let mut buf = [0u8; 2];
    conn.read_full(&mut buf).expect("read");
    assert_eq!(&buf, b"ok");

    server.join().expect("server thread");
}

#[test]
fn test_server_name_override() {
    let pki = TestPki::generate();
    let (port, server) = spawn_server(&pki.server_config(), |accepted| {
        accepted.expect("server handshake");
    });

    let config = pki.client_config().with_server_name("localhost");
    let conn = connect_secure("127.0.0.1", port, 2000, &config).expect("verify as localhost");
    assert_eq!(conn.remote_address(), IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(conn.remote_port(), port);

    server.join().expect("server thread");
}

#[test]
fn test_wrong_server_name_is_rejected() {
    let pki = TestPki::generate();
    let (port, server) = spawn_server(&pki.server_config(), |_accepted| {});

    let config = pki.client_config().with_server_name("example.com");
    let err = connect_secure("127.0.0.1", port, 2000, &config).expect_err("name not in certificate");
    assert_eq!(err, TlsCode::Certificate);

    server.join().expect("server thread");
}

#[test]
fn test_handshake_times_out_against_silent_server() {
    let pki = TestPki::generate();
    let listener = listen_tcp(0).expect("plain listener");
    let port = listener.local_port().expect("local port");

    let silent = thread::spawn(move || {
        let conn = listener.accept().expect("accept");
        // never answers the ClientHello; waits for the client to give up
        let mut buf = [0u8; 4096];
        while conn.read(&mut buf).is_ok() {}
    });

    let start = Instant::now();
    let err = connect_secure("127.0.0.1", port, 400, &pki.client_config()).expect_err("no ServerHello");
    let elapsed = start.elapsed();

    assert_eq!(err, OsCode::TimedOut);
    assert!(elapsed.as_millis() >= 200 && elapsed.as_millis() <= 600, "elapsed {elapsed:?}");

    silent.join().expect("silent server");
}

#[test]
fn test_handshake_budget_holds_against_trickling_server() {
    let listener = listen_tcp(0).expect("plain listener");
    let port = listener.local_port().expect("local port");

    let trickle = thread::spawn(move || {
        let conn = listener.accept().expect("accept");
        let mut hello = [0u8; 4096];
        conn.read(&mut hello).expect("read ClientHello");
        // handshake record header promising 16 KiB, then one byte at a time
        if conn.write_full(&[0x16, 0x03, 0x03, 0x40, 0x00]).is_err() {
            return;
        }
        loop {
            thread::sleep(Duration::from_millis(150));
            if conn.write_full(&[0x02]).is_err() {
                break;
            }
        }
    });

    let config = TlsConfig::default()
        .with_native_roots(false)
        .with_insecure_skip_verify(true);
    let start = Instant::now();
    let err = connect_secure("127.0.0.1", port, 500, &config).expect_err("ServerHello never completes");
    let elapsed = start.elapsed();

    assert_eq!(err, OsCode::TimedOut);
    assert!(elapsed.as_millis() >= 250 && elapsed.as_millis() <= 750, "elapsed {elapsed:?}");

    trickle.join().expect("trickling server");
}

#[test]
fn test_close_is_idempotent_and_blocks_io() {
    let pki = TestPki::generate();
    let (port, server) = spawn_server(&pki.server_config(), |accepted| {
        let mut conn = accepted.expect("server handshake");
        let mut buf = [0u8; 1];
        // client close_notify
        assert_eq!(conn.read(&mut buf).expect_err("client closed"), BaseCode::Eof);
    });

    let mut conn = connect_secure("localhost", port, 2000, &pki.client_config()).expect("handshake");
    conn.close().expect("first close");
    conn.close().expect("second close");
    assert!(conn.is_closed());

    let mut buf = [0u8; 1];
    assert_eq!(conn.read(&mut buf).expect_err("closed session"), BaseCode::IllegalState);
    assert_eq!(conn.write(b"x").expect_err("closed session"), BaseCode::IllegalState);

    server.join().expect("server thread");
}

#[test]
fn test_alpn_negotiation() {
    let pki = TestPki::generate();
    let server_config = pki
        .server_config()
        .with_alpn_protocols(vec![b"sockline/1".to_vec()]);
    let (port, server) = spawn_server(&server_config, |accepted| {
        let conn = accepted.expect("server handshake");
        assert_eq!(conn.alpn_protocol(), Some(&b"sockline/1"[..]));
    });

    let config = pki
        .client_config()
        .with_alpn_protocols(vec![b"other/2".to_vec(), b"sockline/1".to_vec()]);
    let conn = connect_secure("localhost", port, 2000, &config).expect("handshake");
    assert_eq!(conn.alpn_protocol(), Some(&b"sockline/1"[..]));

    server.join().expect("server thread");
}
