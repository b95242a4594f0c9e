//! rustls setup for the HTTPS connector
//!
//! The OS certificate store is read at most once per process.

use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::CertificateDer;
use std::sync::{Arc, OnceLock};

static NATIVE_ROOTS: OnceLock<Vec<CertificateDer<'static>>> = OnceLock::new();

/// Certificates from the OS store; empty when none could be loaded.
pub fn native_root_certs() -> &'static [CertificateDer<'static>] {
    NATIVE_ROOTS.get_or_init(|| {
        let loaded = rustls_native_certs::load_native_certs();
        for err in &loaded.errors {
            tracing::warn!(error = %err, "skipping unreadable native root certificate");
        }
        tracing::debug!(count = loaded.certs.len(), "native root certificates loaded");
        loaded.certs
    })
}

/// The process-wide provider when one is installed, else aws-lc-rs.
pub fn get_crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default().map_or_else(
        || Arc::new(rustls::crypto::aws_lc_rs::default_provider()),
        Arc::clone,
    )
}

/// # Errors
///
/// Fails when the OS store yields no usable root, so a device image without
/// certificates is caught when the client is built.
pub fn native_roots_client_config() -> Result<ClientConfig, String> {
    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(native_root_certs().iter().cloned());
    if ignored > 0 {
        tracing::warn!(added, ignored, "ignored unparsable native root certificates");
    }
    if added == 0 {
        return Err("OS certificate store has no usable root CA".to_owned());
    }

    let builder = ClientConfig::builder_with_provider(get_crypto_provider())
        .with_safe_default_protocol_versions()
        .map_err(|e| format!("TLS protocol versions: {e}"))?;
    Ok(builder.with_root_certificates(roots).with_no_client_auth())
}
