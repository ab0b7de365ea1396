//! Shipcopy copies files and folders out of [docker](https://www.docker.com/) containers
//!
//! # examples
//!
//! ```no_run
//! # async fn run() -> shipcopy::Result<()> {
//! use shipcopy::{cp, CopyRequest, Docker};
//!
//! let docker = Docker::from_env()?;
//! let request = CopyRequest::parse("mycontainer:/etc/passwd", "-")?;
//! cp::run(&docker, &request, &mut std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

pub mod container;
pub mod cp;
pub mod docker;
pub mod errors;
pub mod read;
pub mod tarball;
pub mod transport;

pub use crate::{
    container::{Container, Containers, CopyOptions},
    cp::{CopyRequest, Destination},
    docker::Docker,
    errors::{Error, Result},
};
