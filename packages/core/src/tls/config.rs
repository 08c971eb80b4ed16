//! TLS configuration

use std::path::{Path, PathBuf};

use crate::config::{ConfigResult, ConfigurationError, Validator};

/// Trust, identity and negotiation options for secure sockets.
///
/// Clients verify the server against `ca_file` when set, otherwise against
/// the platform roots (`use_native_roots`) or the bundled webpki roots.
/// Servers require `cert_file` and `key_file`; a client that sets both
/// presents them for mutual authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub ca_file: Option<PathBuf>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    /// Accept any server certificate. Testing only.
    pub insecure_skip_verify: bool,
    pub use_native_roots: bool,
    pub alpn_protocols: Vec<Vec<u8>>,
    /// Name to verify instead of the host passed to `connect_secure`.
    pub server_name: Option<String>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            ca_file: None,
            cert_file: None,
            key_file: None,
            insecure_skip_verify: false,
            use_native_roots: true,
            alpn_protocols: Vec::new(),
            server_name: None,
        }
    }
}

impl TlsConfig {
    /// Configuration for a server presenting `cert_file` with `key_file`.
    #[must_use]
    pub fn server(cert_file: impl Into<PathBuf>, key_file: impl Into<PathBuf>) -> Self {
        Self::default().with_identity(cert_file, key_file)
    }

    /// Trust only the certificates in `ca_file` (PEM).
    #[must_use]
    pub fn with_ca_file(mut self, ca_file: impl Into<PathBuf>) -> Self {
        self.ca_file = Some(ca_file.into());
        self
    }

    /// Set the certificate chain and private key (PEM) this side presents.
    #[must_use]
    pub fn with_identity(mut self, cert_file: impl Into<PathBuf>, key_file: impl Into<PathBuf>) -> Self {
        self.cert_file = Some(cert_file.into());
        self.key_file = Some(key_file.into());
        self
    }

    #[must_use]
    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }

    #[must_use]
    pub fn with_native_roots(mut self, enabled: bool) -> Self {
        self.use_native_roots = enabled;
        self
    }

    #[must_use]
    pub fn with_alpn_protocols(mut self, protocols: Vec<Vec<u8>>) -> Self {
        self.alpn_protocols = protocols;
        self
    }

    #[must_use]
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    pub(crate) fn identity(&self) -> Option<(&Path, &Path)> {
        Some((self.cert_file.as_deref()?, self.key_file.as_deref()?))
    }
}

impl Validator for TlsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.cert_file.is_some() != self.key_file.is_some() {
            return Err(ConfigurationError::Conflict(
                "certificate and private key must be configured together".to_string(),
            ));
        }

        if self.alpn_protocols.iter().any(|p| p.is_empty() || p.len() > 255) {
            return Err(ConfigurationError::InvalidParameter(
                "ALPN protocol names must be 1 to 255 bytes".to_string(),
            ));
        }

        Ok(())
    }
}
