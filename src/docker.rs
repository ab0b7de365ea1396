//! Main entrypoint for interacting with the Docker API.
//!
//! API Reference: <https://docs.docker.com/engine/api/>

use std::{env, path::Path};

use hyper::{client::HttpConnector, Body, Client, Method, Response};
use mime::Mime;

use crate::{
    container::Containers,
    errors::{Error, Result},
    transport::{Headers, Transport},
};

#[cfg(feature = "tls")]
use hyper_openssl::HttpsConnector;
#[cfg(feature = "tls")]
use openssl::ssl::{SslConnector, SslFiletype, SslMethod};

#[cfg(feature = "unix-socket")]
use hyperlocal::UnixConnector;

/// Address used when `DOCKER_HOST` is not set
pub const DEFAULT_HOST: &str = "unix:///var/run/docker.sock";

/// Entrypoint interface for communicating with docker daemon
#[derive(Debug, Clone)]
pub struct Docker {
    transport: Transport,
}

fn get_http_connector() -> HttpConnector {
    let mut http = HttpConnector::new();
    http.enforce_http(false);

    http
}

#[cfg(feature = "tls")]
fn get_docker_for_tcp_tls(
    host: String,
    cert_path: &Path,
    verify: bool,
) -> Result<Docker> {
    let http = get_http_connector();
    let mut connector = SslConnector::builder(SslMethod::tls())?;
    connector.set_cipher_list("DEFAULT")?;
    let cert = cert_path.join("cert.pem");
    let key = cert_path.join("key.pem");
    connector.set_certificate_file(cert.as_path(), SslFiletype::PEM)?;
    connector.set_private_key_file(key.as_path(), SslFiletype::PEM)?;
    if verify {
        let ca = cert_path.join("ca.pem");
        connector.set_ca_file(ca.as_path())?;
    }

    Ok(Docker {
        transport: Transport::EncryptedTcp {
            client: Client::builder().build(HttpsConnector::with_connector(http, connector)?),
            host: format!("https://{}", host),
        },
    })
}

#[cfg(not(feature = "tls"))]
fn get_docker_for_tcp_tls(
    _host: String,
    _cert_path: &Path,
    _verify: bool,
) -> Result<Docker> {
    Err(Error::InvalidArgument(
        "TLS support was not compiled in, rebuild with the `tls` feature".to_owned(),
    ))
}

/// Strips any of the schemes docker accepts for tcp hosts, leaving the authority
fn tcp_authority(host: &str) -> Result<&str> {
    let mut it = host.splitn(2, "://");
    match (it.next(), it.next()) {
        (Some("tcp"), Some(authority))
        | (Some("http"), Some(authority))
        | (Some("https"), Some(authority)) => {
            if authority.is_empty() {
                Err(Error::MissingAuthority)
            } else {
                Ok(authority)
            }
        }
        (Some(scheme), Some(_)) => Err(Error::UnsupportedScheme(scheme.to_string())),
        (Some(authority), None) if !authority.is_empty() => Ok(authority),
        _ => Err(Error::MissingAuthority),
    }
}

impl Docker {
    /// Creates a new Docker instance by automatically choosing appropriate connection type based
    /// on provided `uri`.
    ///
    /// Supported schemes are:
    ///  - `unix://` with feature `unix-socket` enabled, otherwise returns an Error
    ///  - `tcp://`
    ///  - `http://`
    ///
    ///  To create a Docker instance utilizing TLS use explicit [Docker::tls](Docker::tls)
    ///  constructor.
    pub fn new<S>(uri: S) -> Result<Docker>
    where
        S: AsRef<str>,
    {
        let uri = uri.as_ref();
        let mut it = uri.split("://");

        match it.next() {
            #[cfg(feature = "unix-socket")]
            Some("unix") => match it.next() {
                Some(path) if !path.is_empty() => Ok(Docker::unix(path)),
                _ => Err(Error::MissingAuthority),
            },
            #[cfg(not(feature = "unix-socket"))]
            Some("unix") => Err(Error::UnsupportedScheme("unix".to_string())),
            Some("tcp") | Some("http") => match it.next() {
                Some(host) if !host.is_empty() => Ok(Docker::tcp(host)),
                _ => Err(Error::MissingAuthority),
            },
            Some(scheme) => Err(Error::UnsupportedScheme(scheme.to_string())),
            None => unreachable!(), // This is never possible because calling split on an empty string
                                    // always returns at least one element
        }
    }

    /// Creates a Docker instance the way the docker cli does, from `DOCKER_HOST`,
    /// `DOCKER_TLS_VERIFY` and `DOCKER_CERT_PATH`. TLS is only used when
    /// `DOCKER_TLS_VERIFY` is set.
    ///
    /// Falls back to [DEFAULT_HOST](DEFAULT_HOST) when `DOCKER_HOST` is unset.
    pub fn from_env() -> Result<Docker> {
        let host = env::var("DOCKER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_owned());
        if env::var("DOCKER_TLS_VERIFY").is_ok() {
            let certs = env::var("DOCKER_CERT_PATH").map_err(|_| {
                Error::InvalidArgument("DOCKER_TLS_VERIFY is set but DOCKER_CERT_PATH is not".into())
            })?;
            Docker::tls(&host, certs, true)
        } else {
            Docker::new(host)
        }
    }

    /// Creates a new docker instance for a docker host listening on a given Unix socket.
    ///
    /// `socket_path` is the part of URI that comes after the `unix://`. For example a URI `unix:///run/docker.sock` has a
    /// `socket_path` == "/run/docker.sock".
    #[cfg(feature = "unix-socket")]
    pub fn unix<S>(socket_path: S) -> Docker
    where
        S: Into<String>,
    {
        Docker {
            transport: Transport::Unix {
                client: Client::builder()
                    .pool_max_idle_per_host(0)
                    .build(UnixConnector),
                path: socket_path.into(),
            },
        }
    }

    /// Creates a new docker instance for a docker host listening on a given TCP socket `host`,
    /// talking TLS.
    ///
    /// `host` may carry a `tcp://`, `http://` or `https://` prefix, which is dropped.
    /// `cert_path` specifies the base path in the filesystem containing a certificate (`cert.pem`)
    /// and a key (`key.pem`) that will be used by the client. If verify is `true` a CA file will be
    /// added (`ca.pem`) to the connector.
    ///
    /// Returns an error when the crate is built without the `tls` feature.
    pub fn tls<S, P>(
        host: S,
        cert_path: P,
        verify: bool,
    ) -> Result<Docker>
    where
        S: AsRef<str>,
        P: AsRef<Path>,
    {
        let authority = tcp_authority(host.as_ref())?;
        get_docker_for_tcp_tls(authority.to_owned(), cert_path.as_ref(), verify)
    }

    /// Creates a new docker instance for a docker host listening on a given TCP socket `host`.
    /// `host` is the part of URI that comes after `tcp://` or `http://` schemes, also known as
    /// authority part.
    ///
    /// TLS is supported with feature `tls` enabled through [Docker::tls](Docker::tls) constructor.
    pub fn tcp<S>(host: S) -> Docker
    where
        S: Into<String>,
    {
        let http = get_http_connector();
        Docker {
            transport: Transport::Tcp {
                client: Client::builder().build(http),
                host: format!("tcp://{}", host.into()),
            },
        }
    }

    /// Exports an interface for interacting with docker containers
    pub fn containers(&'_ self) -> Containers<'_> {
        Containers::new(self)
    }

    //
    // Utility functions to make requests
    //

    /// Send a post request and return the raw response, body still unread.
    pub(crate) async fn post_raw<B>(
        &self,
        endpoint: &str,
        body: Option<(B, Mime)>,
    ) -> Result<Response<Body>>
    where
        B: Into<Body>,
    {
        self.transport
            .send(Method::POST, endpoint, body, Headers::None)
            .await
    }

}
