//! The `cp` command: copy a path out of a container onto the host.

use std::{
    fmt,
    io::{self, Write},
    path::PathBuf,
};

use futures_util::StreamExt;
use hyper::Body;
use log::{debug, trace};
use tokio::runtime::Handle;

use crate::{
    container::CopyOptions,
    docker::Docker,
    errors::{Error, Result},
    read::StreamReader,
    tarball,
};

/// Separates the container from the path in a `CONTAINER:PATH` locator
pub const LOCATOR_SEPARATOR: char = ':';

/// Where copied data ends up
#[derive(Clone, Debug, PartialEq)]
pub enum Destination {
    /// Raw tar stream on standard output, requested with `-`
    StandardOutput,
    /// Extracted into a host directory
    Directory(PathBuf),
}

impl From<&str> for Destination {
    fn from(arg: &str) -> Self {
        if arg == "-" {
            Destination::StandardOutput
        } else {
            Destination::Directory(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            Destination::StandardOutput => f.write_str("-"),
            Destination::Directory(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A parsed `cp` invocation
#[derive(Clone, Debug, PartialEq)]
pub struct CopyRequest {
    container: String,
    resource: String,
    destination: Destination,
}

impl CopyRequest {
    /// Builds a request from the two positional arguments, `CONTAINER:PATH` and `HOSTDIR|-`.
    ///
    /// The locator must contain exactly one separator with something on both sides.
    pub fn parse(
        locator: &str,
        destination: &str,
    ) -> Result<CopyRequest> {
        let parts: Vec<&str> = locator.split(LOCATOR_SEPARATOR).collect();
        match parts.as_slice() {
            [container, resource] if !container.is_empty() && !resource.is_empty() => {
                Ok(CopyRequest {
                    container: (*container).to_owned(),
                    resource: (*resource).to_owned(),
                    destination: Destination::from(destination),
                })
            }
            _ => Err(Error::InvalidArgument(format!(
                "path not specified, expected CONTAINER:PATH but got `{}`",
                locator
            ))),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }
}

/// Runs a copy against `docker`. Tar data requested on standard output is written to `out`.
///
/// The response body is owned by this call and dropped before it returns, whatever the
/// outcome. A failed extraction can leave the destination partially populated.
pub async fn run<W>(
    docker: &Docker,
    request: &CopyRequest,
    out: &mut W,
) -> Result<()>
where
    W: Write,
{
    debug!(
        "copying {}{}{} to {}",
        request.container, LOCATOR_SEPARATOR, request.resource, request.destination
    );
    let opts = CopyOptions::new(request.resource.as_str(), request.destination.to_string());
    let body = docker
        .containers()
        .get(request.container.as_str())
        .copy(&opts)
        .await?;

    match &request.destination {
        Destination::StandardOutput => stream_to(body, out).await,
        Destination::Directory(path) => extract(body, path.clone()).await,
    }
}

async fn stream_to<W>(
    mut body: Body,
    out: &mut W,
) -> Result<()>
where
    W: Write,
{
    let mut written = 0;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        out.write_all(&chunk)?;
        written += chunk.len();
    }
    out.flush()?;
    trace!("wrote {} bytes", written);
    Ok(())
}

async fn extract(
    body: Body,
    dest: PathBuf,
) -> Result<()> {
    let handle = Handle::current();
    tokio::task::spawn_blocking(move || tarball::unpack(StreamReader::new(body, handle), dest))
        .await
        .map_err(|e| Error::IO(io::Error::new(io::ErrorKind::Other, e)))?
}
