//! TLS context setup errors

use std::path::PathBuf;

use crate::error::{Error, TlsCode};

/// Failures while building a TLS context from configuration.
#[derive(Debug, thiserror::Error)]
pub enum TlsSetupError {
    #[error("Unable to read certificate file {path}: {source}")]
    CertificateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No certificates found in {0}")]
    NoCertificates(PathBuf),
    #[error("Unable to read private key file {path}: {source}")]
    PrivateKeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No private key found in {0}")]
    NoPrivateKey(PathBuf),
    #[error("Unsupported private key: {0}")]
    UnsupportedKey(rustls::Error),
    #[error("Private key does not match certificate: {0}")]
    KeyMismatch(rustls::Error),
    #[error("Invalid trust root: {0}")]
    TrustRoot(rustls::Error),
    #[error("Server certificate and key are required")]
    MissingServerIdentity,
    #[error("Invalid server name: {0}")]
    InvalidServerName(String),
    #[error("TLS context error: {0}")]
    Context(rustls::Error),
}

impl TlsSetupError {
    #[must_use]
    pub fn code(&self) -> TlsCode {
        match self {
            TlsSetupError::CertificateFile { .. }
            | TlsSetupError::NoCertificates(_)
            | TlsSetupError::TrustRoot(_)
            | TlsSetupError::MissingServerIdentity => TlsCode::BadCertificateFile,
            TlsSetupError::PrivateKeyFile { .. }
            | TlsSetupError::NoPrivateKey(_)
            | TlsSetupError::UnsupportedKey(_) => TlsCode::BadPrivateKey,
            TlsSetupError::KeyMismatch(_) => TlsCode::KeyMismatch,
            TlsSetupError::InvalidServerName(_) => TlsCode::InvalidServerName,
            TlsSetupError::Context(_) => TlsCode::Unknown,
        }
    }
}

impl From<TlsSetupError> for Error {
    fn from(err: TlsSetupError) -> Self {
        Error::new(err.code()).with(err)
    }
}
