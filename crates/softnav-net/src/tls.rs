//! TLS provider abstraction.
//!
//! The HTTP client upgrades a plain [`TcpStream`] through a
//! [`TlsProvider`], so it never depends on a concrete TLS library. The
//! rustls-backed provider is enabled by the `tls-rustls` feature.

use std::io::{Read, Write};
use std::net::TcpStream;

use softnav_types::error::Result;

/// A bidirectional byte stream.
pub trait ByteStream: Read + Write + Send {}

impl<T: Read + Write + Send> ByteStream for T {}

/// Provides TLS client connections.
pub trait TlsProvider: Send + Sync {
    /// Wrap `stream` in a TLS client session.
    ///
    /// `server_name` is used for SNI and certificate verification.
    fn connect_tls(&self, stream: TcpStream, server_name: &str) -> Result<Box<dyn ByteStream>>;
}

#[cfg(feature = "tls-rustls")]
pub use rustls_provider::RustlsTlsProvider;

#[cfg(feature = "tls-rustls")]
mod rustls_provider {
    use std::net::TcpStream;
    use std::sync::Arc;

    use rustls::pki_types::ServerName;
    use rustls::{ClientConfig, ClientConnection, StreamOwned};
    use softnav_types::error::{Result, SoftnavError};

    use super::{ByteStream, TlsProvider};

    /// Shared TLS client configuration trusting Mozilla's root CA bundle.
    pub struct RustlsTlsProvider {
        config: Arc<ClientConfig>,
    }

    impl RustlsTlsProvider {
        pub fn new() -> Self {
            let root_store =
                rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            let config = ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth();
            Self {
                config: Arc::new(config),
            }
        }
    }

    impl Default for RustlsTlsProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TlsProvider for RustlsTlsProvider {
        fn connect_tls(
            &self,
            stream: TcpStream,
            server_name: &str,
        ) -> Result<Box<dyn ByteStream>> {
            let sni = ServerName::try_from(server_name.to_owned())
                .map_err(|e| SoftnavError::Transport(format!("invalid server name: {e}")))?;
            let conn = ClientConnection::new(Arc::clone(&self.config), sni)
                .map_err(|e| SoftnavError::Transport(format!("TLS init: {e}")))?;
            // The handshake runs lazily on first read/write.
            Ok(Box::new(StreamOwned::new(conn, stream)))
        }
    }
}
