use std::{io::Read, path::Path};

use log::debug;
use tar::Archive;

use crate::errors::Result;

/// Unpacks a tar stream into `dest`, creating it if needed.
///
/// Ownership recorded in the archive is never applied, extracted files belong to the
/// invoking user so unprivileged extraction does not trip over `chown`. Permission bits
/// are kept.
pub fn unpack<R, P>(
    reader: R,
    dest: P,
) -> Result<()>
where
    R: Read,
    P: AsRef<Path>,
{
    let dest = dest.as_ref();
    debug!("unpacking archive into {}", dest.display());
    let mut archive = Archive::new(reader);
    archive.set_preserve_ownerships(false);
    archive.set_overwrite(true);
    archive.unpack(dest)?;
    Ok(())
}
