/// Non-Windows stand-ins: symbolic links play the part of reparse points.
use super::FileAttributes;
use crate::error::ReparseError;
use std::fs;
use std::io;
use std::path::Path;

pub(super) fn attributes(path: &Path) -> io::Result<FileAttributes> {
    let meta = fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() {
        // Like the Windows directory bit on a junction: describes the target kind.
        let directory = fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false);
        return Ok(FileAttributes {
            directory,
            reparse_point: true,
        });
    }
    Ok(FileAttributes {
        directory: meta.is_dir(),
        reparse_point: false,
    })
}

pub(super) fn substitute_name(path: &Path) -> Result<String, ReparseError> {
    fs::read_link(path)
        .map(|target| target.to_string_lossy().into_owned())
        .map_err(ReparseError::DeviceControl)
}
