use axum_server::tls_rustls::RustlsConfig;
use miette::{miette, Context, IntoDiagnostic};
use rcgen::{CertificateParams, KeyPair};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// How TLS should be configured for the extender endpoint.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// No TLS — plain HTTP.
    #[default]
    Disabled,
    /// Use explicitly provided PEM certificate chain and key files.
    Provided { cert_path: PathBuf, key_path: PathBuf },
    /// Generate an in-memory self-signed certificate at startup.
    SelfSigned { san_entries: Vec<String> },
}

/// Parsed certificate chain and private key.
#[derive(Debug)]
pub struct TlsMaterial {
    pub certs: Vec<CertificateDer<'static>>,
    pub key: PrivateKeyDer<'static>,
}

impl TlsMaterial {
    /// Build the rustls acceptor configuration served by axum-server.
    pub fn into_rustls_config(self) -> miette::Result<RustlsConfig> {
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let mut config = rustls::ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .into_diagnostic()
            .wrap_err("failed to select TLS protocol versions")?
            .with_no_client_auth()
            .with_single_cert(self.certs, self.key)
            .into_diagnostic()
            .wrap_err("TLS certificate and key do not form a valid pair")?;
        config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

        Ok(RustlsConfig::from_config(Arc::new(config)))
    }
}

/// Resolve TLS material from the given mode.
///
/// - `Disabled` → returns `None`
/// - `Provided` → parses the PEM files on disk
/// - `SelfSigned` → generates a fresh key pair and certificate
pub fn resolve_tls(mode: &TlsMode) -> miette::Result<Option<TlsMaterial>> {
    match mode {
        TlsMode::Disabled => Ok(None),
        TlsMode::Provided {
            cert_path,
            key_path,
        } => load_pem_files(cert_path, key_path).map(Some),
        TlsMode::SelfSigned { san_entries } => generate_self_signed(san_entries).map(Some),
    }
}

fn load_pem_files(cert_path: &Path, key_path: &Path) -> miette::Result<TlsMaterial> {
    let cert_pem = std::fs::read(cert_path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read TLS cert at {}", cert_path.display()))?;
    let key_pem = std::fs::read(key_path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read TLS key at {}", key_path.display()))?;

    let certs = rustls_pemfile::certs(&mut cert_pem.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to parse PEM in {}", cert_path.display()))?;
    if certs.is_empty() {
        return Err(miette!("no certificate found in {}", cert_path.display()));
    }

    let key = rustls_pemfile::private_key(&mut key_pem.as_slice())
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to parse PEM in {}", key_path.display()))?
        .ok_or_else(|| miette!("no private key found in {}", key_path.display()))?;

    info!(
        "Loaded TLS certificate chain ({} certs) from {}",
        certs.len(),
        cert_path.display()
    );

    Ok(TlsMaterial { certs, key })
}

fn generate_self_signed(san_entries: &[String]) -> miette::Result<TlsMaterial> {
    let key_pair = KeyPair::generate()
        .into_diagnostic()
        .wrap_err("failed to generate TLS key pair")?;

    let params = CertificateParams::new(san_entries.to_vec())
        .into_diagnostic()
        .wrap_err("failed to create certificate params")?;

    let cert = params
        .self_signed(&key_pair)
        .into_diagnostic()
        .wrap_err("failed to self-sign certificate")?;

    info!("Generated self-signed TLS certificate for {:?}", san_entries);

    Ok(TlsMaterial {
        certs: vec![cert.der().clone()],
        key: PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_pems(dir: &Path) -> (PathBuf, PathBuf) {
        let key_pair = KeyPair::generate().unwrap();
        let cert = CertificateParams::new(vec!["localhost".to_string()])
            .unwrap()
            .self_signed(&key_pair)
            .unwrap();

        let cert_path = dir.join("tls.crt");
        let key_path = dir.join("tls.key");
        std::fs::write(&cert_path, cert.pem()).unwrap();
        std::fs::write(&key_path, key_pair.serialize_pem()).unwrap();
        (cert_path, key_path)
    }

    #[test]
    fn test_disabled_returns_none() {
        let result = resolve_tls(&TlsMode::Disabled).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_self_signed_material() {
        let mode = TlsMode::SelfSigned {
            san_entries: vec!["localhost".to_string(), "127.0.0.1".to_string()],
        };

        let material = resolve_tls(&mode).unwrap().expect("should produce material");
        assert_eq!(material.certs.len(), 1);
        assert!(material.into_rustls_config().is_ok());
    }

    #[test]
    fn test_provided_loads_files() {
        let dir = tempdir().unwrap();
        let (cert_path, key_path) = write_pems(dir.path());

        let mode = TlsMode::Provided {
            cert_path,
            key_path,
        };

        let material = resolve_tls(&mode).unwrap().expect("should produce material");
        assert_eq!(material.certs.len(), 1);
        assert!(material.into_rustls_config().is_ok());
    }

    #[test]
    fn test_provided_missing_file_errors() {
        let mode = TlsMode::Provided {
            cert_path: PathBuf::from("/nonexistent/tls.crt"),
            key_path: PathBuf::from("/nonexistent/tls.key"),
        };

        assert!(resolve_tls(&mode).is_err());
    }

    #[test]
    fn test_provided_without_certificate_errors() {
        let dir = tempdir().unwrap();
        let (_, key_path) = write_pems(dir.path());

        // Key file in place of the certificate chain
        let mode = TlsMode::Provided {
            cert_path: key_path.clone(),
            key_path,
        };

        let err = resolve_tls(&mode).unwrap_err();
        assert!(err.to_string().contains("no certificate found"));
    }
}
