//! Operations against containers.
//!
//! API Reference: <https://docs.docker.com/engine/api/v1.19/#copy-files-or-folders-from-a-container>

use hyper::{Body, StatusCode};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    docker::Docker,
    errors::{Error, Result},
    transport::Transport,
};

/// Interface for accessing and manipulating a docker container
pub struct Container<'docker> {
    docker: &'docker Docker,
    id: String,
}

impl<'docker> Container<'docker> {
    /// Exports an interface exposing operations against a container instance
    pub fn new<S>(
        docker: &'docker Docker,
        id: S,
    ) -> Self
    where
        S: Into<String>,
    {
        Container {
            docker,
            id: id.into(),
        }
    }

    /// a getter for the container id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Copy a file/folder out of the container. The returned body is a tar stream of
    /// the requested resource.
    ///
    /// A 404 from the daemon becomes [Error::ContainerNotFound](Error::ContainerNotFound),
    /// any other status besides 200 a [Error::Fault](Error::Fault). The body keeps the
    /// connection open until it is dropped.
    pub async fn copy(
        &self,
        opts: &CopyOptions,
    ) -> Result<Body> {
        let body = opts.serialize()?;
        let response = self
            .docker
            .post_raw(
                &format!("/containers/{}/copy", self.id),
                Some((body, mime::APPLICATION_JSON)),
            )
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.into_body()),
            StatusCode::NOT_FOUND => Err(Error::ContainerNotFound(self.id.clone())),
            status => {
                trace!("copy from {} answered with {}", self.id, status);
                Err(Transport::fault_from(response).await)
            }
        }
    }
}

/// Interface for docker containers
pub struct Containers<'docker> {
    docker: &'docker Docker,
}

impl<'docker> Containers<'docker> {
    /// Exports an interface for interacting with docker containers
    pub fn new(docker: &'docker Docker) -> Self {
        Containers { docker }
    }

    /// Returns a reference to a set of operations available to a specific container instance
    pub fn get<S>(
        &self,
        name: S,
    ) -> Container<'docker>
    where
        S: Into<String>,
    {
        Container::new(self.docker, name)
    }
}

/// Request body of the copy endpoint
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CopyOptions {
    /// Path inside the container
    pub resource: String,
    /// Where the caller intends to put the data. Informational only, the daemon does not
    /// write to it.
    pub host_path: String,
}

impl CopyOptions {
    pub fn new<R, H>(
        resource: R,
        host_path: H,
    ) -> Self
    where
        R: Into<String>,
        H: Into<String>,
    {
        CopyOptions {
            resource: resource.into(),
            host_path: host_path.into(),
        }
    }

    /// serialize options as a string
    pub fn serialize(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::CopyOptions;

    #[test]
    fn copy_options_use_daemon_field_names() {
        let opts = CopyOptions::new("/etc/passwd", "-");
        assert_eq!(
            r#"{"Resource":"/etc/passwd","HostPath":"-"}"#,
            opts.serialize().unwrap()
        );
    }
}
