//! rustls context construction
//!
//! Client and server configs are built with the ring provider and the safe
//! default protocol versions.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::sign::CertifiedKey;
use rustls::{ClientConfig, InconsistentKeys, RootCertStore, ServerConfig};

use super::config::TlsConfig;
use super::errors::TlsSetupError;
use super::verifier::SkipServerVerification;
use crate::error::Result;

fn provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Builds the client context described by `config`.
pub(crate) fn client_config(config: &TlsConfig) -> Result<Arc<ClientConfig>> {
    let provider = provider();
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(TlsSetupError::Context)?;

    let builder = if config.insecure_skip_verify {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(SkipServerVerification::new(
                provider.signature_verification_algorithms,
            )))
    } else {
        builder.with_root_certificates(root_store(config)?)
    };

    let mut client = match config.identity() {
        Some((cert_file, key_file)) => {
            let certs = load_certs(cert_file)?;
            let key = load_private_key(key_file)?;
            check_key_pair(&provider, &certs, &key)?;
            builder
                .with_client_auth_cert(certs, key)
                .map_err(TlsSetupError::Context)?
        }
        None => builder.with_no_client_auth(),
    };

    client.alpn_protocols = config.alpn_protocols.clone();
    Ok(Arc::new(client))
}

/// Builds the server context, failing fast when the key does not match.
pub(crate) fn server_config(config: &TlsConfig) -> Result<Arc<ServerConfig>> {
    let (cert_file, key_file) = config.identity().ok_or(TlsSetupError::MissingServerIdentity)?;

    let provider = provider();
    let certs = load_certs(cert_file)?;
    let key = load_private_key(key_file)?;
    check_key_pair(&provider, &certs, &key)?;

    let mut server = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(TlsSetupError::Context)?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(TlsSetupError::Context)?;

    server.alpn_protocols = config.alpn_protocols.clone();
    Ok(Arc::new(server))
}

fn root_store(config: &TlsConfig) -> Result<RootCertStore> {
    let mut roots = RootCertStore::empty();

    if let Some(ca_file) = config.ca_file.as_deref() {
        for cert in load_certs(ca_file)? {
            roots.add(cert).map_err(TlsSetupError::TrustRoot)?;
        }
        tracing::debug!("loaded {} trust roots from {}", roots.len(), ca_file.display());
        return Ok(roots);
    }

    if config.use_native_roots {
        let result = rustls_native_certs::load_native_certs();
        for cert in result.certs {
            if let Err(e) = roots.add(cert) {
                tracing::warn!("Failed to add system certificate: {}", e);
            }
        }

        if !result.errors.is_empty() {
            for err in &result.errors {
                tracing::warn!("Certificate load error: {}", err);
            }
        }

        if !roots.is_empty() {
            tracing::debug!("Loaded {} system certificates", roots.len());
            return Ok(roots);
        }
    }

    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    Ok(roots)
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path).map_err(|source| TlsSetupError::CertificateFile {
        path: path.to_path_buf(),
        source,
    })?;

    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|source| TlsSetupError::CertificateFile {
            path: path.to_path_buf(),
            source,
        })?;

    if certs.is_empty() {
        return Err(TlsSetupError::NoCertificates(path.to_path_buf()).into());
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let file = File::open(path).map_err(|source| TlsSetupError::PrivateKeyFile {
        path: path.to_path_buf(),
        source,
    })?;

    rustls_pemfile::private_key(&mut BufReader::new(file))
        .map_err(|source| TlsSetupError::PrivateKeyFile {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsSetupError::NoPrivateKey(path.to_path_buf()).into())
}

fn check_key_pair(
    provider: &CryptoProvider,
    certs: &[CertificateDer<'static>],
    key: &PrivateKeyDer<'static>,
) -> Result<()> {
    let signing_key = provider
        .key_provider
        .load_private_key(key.clone_key())
        .map_err(TlsSetupError::UnsupportedKey)?;

    match CertifiedKey::new(certs.to_vec(), signing_key).keys_match() {
        // key types that cannot expose their public half are not checked
        Ok(()) | Err(rustls::Error::InconsistentKeys(InconsistentKeys::Unknown)) => Ok(()),
        Err(e) => Err(TlsSetupError::KeyMismatch(e).into()),
    }
}
