use aws_smithy_http_client::{
    Builder,
    tls::{self, TlsContext, TrustStore, rustls_provider::CryptoMode},
};
use aws_smithy_runtime_api::client::http::SharedHttpClient;
use s3cosi_common::{CosiError, Result};

pub(super) fn https_client(pem: &[u8]) -> Result<SharedHttpClient> {
    let trust_store = TrustStore::empty()
        .with_native_roots(true)
        .with_pem_certificate(pem.to_vec());
    let tls_context = TlsContext::builder()
        .with_trust_store(trust_store)
        .build()
        .map_err(|err| CosiError::ClientInit(format!("invalid TLS trust material: {err}")))?;

    Ok(Builder::new()
        .tls_provider(tls::Provider::Rustls(CryptoMode::AwsLc))
        .tls_context(tls_context)
        .build_https())
}
