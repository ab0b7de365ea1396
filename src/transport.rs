//! Transports for communicating with the docker daemon

use hyper::{
    client::{Client, HttpConnector},
    header, Body, Method, Request, Response, StatusCode,
};
use log::{debug, trace};
use mime::Mime;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tls")]
use hyper_openssl::HttpsConnector;
#[cfg(feature = "unix-socket")]
use hyperlocal::UnixConnector;
#[cfg(feature = "unix-socket")]
use hyperlocal::Uri as DomainUri;

use crate::errors::{Error, Result};

/// Placeholder for requests without extra headers
pub(crate) struct Headers;

impl Headers {
    #[allow(non_upper_case_globals)]
    pub(crate) const None: Option<Vec<(&'static str, String)>> = None;
}

/// Transports are types which define the means of communication
/// with the docker daemon
#[derive(Clone, Debug)]
pub enum Transport {
    /// A network tcp interface
    Tcp {
        client: Client<HttpConnector>,
        host: String,
    },
    /// TCP/TLS
    #[cfg(feature = "tls")]
    EncryptedTcp {
        client: Client<HttpsConnector<HttpConnector>>,
        host: String,
    },
    /// A Unix domain socket
    #[cfg(feature = "unix-socket")]
    Unix {
        client: Client<UnixConnector>,
        path: String,
    },
}

impl Transport {
    /// Make a request and hand back the response as is, status and open body included.
    ///
    /// Statuses are not interpreted here. The body holds on to the underlying
    /// connection until it is dropped.
    pub async fn send<B, H>(
        &self,
        method: Method,
        endpoint: impl AsRef<str>,
        body: Option<(B, Mime)>,
        headers: Option<H>,
    ) -> Result<Response<Body>>
    where
        B: Into<Body>,
        H: IntoIterator<Item = (&'static str, String)>,
    {
        debug!("{} {}", method, endpoint.as_ref());
        let req = self.build_request(method, endpoint, body, headers)?;
        let response = self.send_request(req).await?;
        trace!("daemon responded {}", response.status());
        Ok(response)
    }

    /// Drains an unexpected response into a `Fault`, preferring the daemon's own message
    pub(crate) async fn fault_from(response: Response<Body>) -> Error {
        let status = response.status();
        match hyper::body::to_bytes(response.into_body()).await {
            Ok(bytes) => Self::fault(status, &String::from_utf8_lossy(&bytes)),
            Err(err) => Error::Hyper(err),
        }
    }

    fn fault(
        status: StatusCode,
        body: &str,
    ) -> Error {
        Error::Fault {
            code: status,
            message: Self::get_error_message(body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error code")
                    .to_owned()
            }),
        }
    }

    /// Builds an HTTP request.
    fn build_request<B, H>(
        &self,
        method: Method,
        endpoint: impl AsRef<str>,
        body: Option<(B, Mime)>,
        headers: Option<H>,
    ) -> Result<Request<Body>>
    where
        B: Into<Body>,
        H: IntoIterator<Item = (&'static str, String)>,
    {
        let builder = Request::builder();
        let req = match *self {
            Transport::Tcp { ref host, .. } => {
                builder
                    .method(method)
                    .uri(&format!("{}{}", host, endpoint.as_ref()))
            }
            #[cfg(feature = "tls")]
            Transport::EncryptedTcp { ref host, .. } => {
                builder
                    .method(method)
                    .uri(&format!("{}{}", host, endpoint.as_ref()))
            }
            #[cfg(feature = "unix-socket")]
            Transport::Unix { ref path, .. } => {
                let uri: hyper::Uri = DomainUri::new(&path, endpoint.as_ref()).into();
                builder.method(method).uri(uri)
            }
        };
        let mut req = req.header(header::HOST, "");

        if let Some(h) = headers {
            for (k, v) in h.into_iter() {
                req = req.header(k, v);
            }
        }

        match body {
            Some((b, c)) => Ok(req
                .header(header::CONTENT_TYPE, &c.to_string()[..])
                .body(b.into())?),
            _ => Ok(req.body(Body::empty())?),
        }
    }

    /// Send the given request to the docker daemon and return a Future of the response.
    async fn send_request(
        &self,
        req: Request<hyper::Body>,
    ) -> Result<Response<Body>> {
        match self {
            Transport::Tcp { ref client, .. } => Ok(client.request(req).await?),
            #[cfg(feature = "tls")]
            Transport::EncryptedTcp { ref client, .. } => Ok(client.request(req).await?),
            #[cfg(feature = "unix-socket")]
            Transport::Unix { ref client, .. } => Ok(client.request(req).await?),
        }
    }

    /// Extract the error message content from an HTTP response that
    /// contains a Docker JSON error structure.
    fn get_error_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.message)
            .ok()
    }
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    message: String,
}
