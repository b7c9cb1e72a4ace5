//! TLS configuration and connector for client.

use crate::connection::TlsClientConfig;
use crate::error::ConnectError;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use rustls::RootCertStore;
use rustls_pemfile::Item;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::TlsConnector;

/// Creates a verifying TLS connector from client configuration.
pub fn create_tls_connector(
    config: &TlsClientConfig,
    server_host: &str,
) -> Result<(TlsConnector, ServerName<'static>), ConnectError> {
    // Build root cert store
    let root_store = if let Some(ref ca_path) = config.ca_cert_path {
        let certs = load_certs(ca_path)?;
        if certs.is_empty() {
            return Err(ConnectError::TlsConfig(format!(
                "no certificates found in {:?}",
                ca_path
            )));
        }
        let mut store = RootCertStore::empty();
        for cert in certs {
            store
                .add(cert)
                .map_err(|e| ConnectError::TlsConfig(format!("invalid CA cert: {}", e)))?;
        }
        store
    } else {
        let mut store = RootCertStore::empty();
        store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        store
    };

    let builder = rustls::ClientConfig::builder().with_root_certificates(root_store);

    let client_config = match (&config.client_cert_path, &config.client_key_path) {
        (Some(cert_path), Some(key_path)) => {
            let certs = load_certs(cert_path)?;
            let key = load_private_key(key_path)?;

            builder
                .with_client_auth_cert(certs, key)
                .map_err(|e| ConnectError::TlsConfig(format!("invalid client cert/key: {}", e)))?
        }
        (None, None) => builder.with_no_client_auth(),
        _ => {
            return Err(ConnectError::TlsConfig(
                "client certificate and key must be given together".into(),
            ))
        }
    };

    let connector = TlsConnector::from(Arc::new(client_config));

    let server_name_str = config.server_name.as_deref().unwrap_or(server_host);
    let server_name = ServerName::try_from(server_name_str.to_string()).map_err(|_| {
        ConnectError::TlsConfig(format!("invalid server name: {}", server_name_str))
    })?;

    Ok((connector, server_name))
}

/// Parses every PEM section in `path`. `kind` names the file in errors.
fn read_pem(path: &Path, kind: &str) -> Result<Vec<Item>, ConnectError> {
    let file = File::open(path).map_err(|e| {
        ConnectError::TlsConfig(format!("cannot open {} file {:?}: {}", kind, path, e))
    })?;

    rustls_pemfile::read_all(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConnectError::TlsConfig(format!("invalid {} file {:?}: {}", kind, path, e)))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, ConnectError> {
    let certs = read_pem(path, "cert")?
        .into_iter()
        .filter_map(|item| match item {
            Item::X509Certificate(cert) => Some(cert),
            _ => None,
        })
        .collect();
    Ok(certs)
}

/// Returns the first private key in `path`, whatever its encoding.
fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, ConnectError> {
    read_pem(path, "key")?
        .into_iter()
        .find_map(|item| match item {
            Item::Pkcs1Key(key) => Some(PrivateKeyDer::from(key)),
            Item::Pkcs8Key(key) => Some(PrivateKeyDer::from(key)),
            Item::Sec1Key(key) => Some(PrivateKeyDer::from(key)),
            _ => None,
        })
        .ok_or_else(|| ConnectError::TlsConfig(format!("no private key found in {:?}", path)))
}
