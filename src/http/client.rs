//! Shared hyper client used by the runtime adapter, the readiness pinger and
//! the discovery registrar.
//!
//! One client is built per process and cloned into every adapter; clones share
//! the connection pool.

use std::time::Duration;

use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::dns::GaiResolver;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

/// Idle connections kept per host. Traffic is a handful of control-plane calls.
pub const CONNS_PER_HOST: usize = 16;
pub const MAX_IDLE_CONN_DURATION: Duration = Duration::from_secs(30);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

pub type HyperClient = Client<HttpsConnector<HttpConnector<GaiResolver>>, BoxBody<Bytes, hyper::Error>>;

/// Creates the hyper client. Accepts both `http://` and `https://` targets.
///
/// Fails only when the platform root certificates cannot be loaded.
pub fn create_client() -> std::io::Result<HyperClient> {
    let mut http_connector = HttpConnector::new_with_resolver(GaiResolver::new());
    http_connector.set_nodelay(true);
    http_connector.set_keepalive(Some(TCP_KEEPALIVE));
    http_connector.set_connect_timeout(Some(CONNECT_TIMEOUT));
    // https_or_http needs the connector to leave the scheme check to rustls
    http_connector.enforce_http(false);

    let tls = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .wrap_connector(http_connector);

    Ok(Client::builder(TokioExecutor::new())
        .pool_idle_timeout(MAX_IDLE_CONN_DURATION)
        .pool_max_idle_per_host(CONNS_PER_HOST)
        .build(tls))
}
