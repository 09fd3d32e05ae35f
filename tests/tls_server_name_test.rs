//! TLS server name presented by forced-IP fetches

mod common;

use anyhow::Result;
use common::{distribution, pop};
use parking_lot::Mutex;
use prewarm_http::{FetchConfig, FetchTarget, ForcedIpFetcher, HttpScheme, PopFetcher};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::{ClientHello, ResolvesServerCert};
use rustls::sign::CertifiedKey;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;

/// Hands out one self-signed certificate for any name and remembers the
/// server name each client asked for
#[derive(Debug)]
struct RecordingCertResolver {
    key: Arc<CertifiedKey>,
    server_names: Mutex<Vec<Option<String>>>,
}

impl RecordingCertResolver {
    fn last_server_name(&self) -> Option<String> {
        self.server_names.lock().last().cloned().flatten()
    }

    fn handshakes(&self) -> usize {
        self.server_names.lock().len()
    }
}

impl ResolvesServerCert for RecordingCertResolver {
    fn resolve(&self, client_hello: ClientHello<'_>) -> Option<Arc<CertifiedKey>> {
        self.server_names
            .lock()
            .push(client_hello.server_name().map(str::to_string));
        Some(Arc::clone(&self.key))
    }
}

/// TLS edge on loopback answering every request with `200 ok`
async fn spawn_tls_edge() -> Result<(SocketAddr, Arc<RecordingCertResolver>)> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let generated = rcgen::generate_simple_self_signed(vec!["edge.prewarm.invalid".to_string()])?;
    let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(generated.key_pair.serialize_der()));
    let signing_key = provider.key_provider.load_private_key(key_der)?;
    let resolver = Arc::new(RecordingCertResolver {
        key: Arc::new(CertifiedKey::new(
            vec![generated.cert.der().clone()],
            signing_key,
        )),
        server_names: Mutex::new(Vec::new()),
    });

    let config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_cert_resolver(resolver.clone());
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(mut tls) = acceptor.accept(stream).await else {
                    return;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match tls.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = tls
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
                    .await;
                let _ = tls.shutdown().await;
            });
        }
    });

    Ok((addr, resolver))
}

#[tokio::test]
async fn test_server_name_is_logical_host() -> Result<()> {
    let (addr, edge) = spawn_tls_edge().await?;
    let fetcher = ForcedIpFetcher::new(FetchConfig {
        scheme: HttpScheme::Https,
        port: addr.port(),
        // Self-signed and issued for another name
        verify_tls: false,
        ..FetchConfig::default()
    });

    let derived = distribution();
    let custom = distribution().with_custom_domain(Some("cdn.prewarm.invalid"));

    for dist in [derived, custom] {
        let logical = dist.logical_host();
        let target = FetchTarget::new(pop("lhr"), "127.0.0.1", logical.clone(), "/asset");

        let result = fetcher.fetch(&target, &CancellationToken::new()).await?;
        assert_eq!(result.status, 200);
        assert_eq!(result.body, b"ok");
        assert!(result.metrics.connect.is_some());

        let server_name = edge.last_server_name();
        println!("TLS server name for {}: {:?}", dist.id(), server_name);
        assert_eq!(server_name.as_deref(), Some(logical.as_str()));
        assert_ne!(server_name, Some(dist.probe_host(&pop("lhr"))));
    }

    // One handshake per fetch
    assert_eq!(edge.handshakes(), 2);
    Ok(())
}
