/// Platform-specific functionality: attribute queries, reparse data
/// retrieval and drive enumeration.
///
/// The scanner only talks to the filesystem's link machinery through the
/// [`ReparseProbe`] trait so that the traversal rules can be exercised with
/// a scripted probe.
pub mod drives;

#[cfg(windows)]
mod win32;
#[cfg(windows)]
use self::win32 as sys;

#[cfg(not(windows))]
mod fallback;
#[cfg(not(windows))]
use self::fallback as sys;

use crate::error::ReparseError;
use crate::model::VolumeTag;
use std::io;
use std::path::Path;

pub use drives::logical_drives;

/// The two attribute bits the scanner cares about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileAttributes {
    pub directory: bool,
    pub reparse_point: bool,
}

/// OS seam used by the reparse resolver and the tree builder.
pub trait ReparseProbe {
    /// Query attributes of `path` itself, without following any link.
    fn attributes(&self, path: &Path) -> io::Result<FileAttributes>;

    /// Read the substitute name stored in the reparse point at `path`.
    fn substitute_name(&self, path: &Path) -> Result<String, ReparseError>;

    /// The volume a scan rooted at `root` must stay on.
    fn volume_of(&self, root: &Path) -> VolumeTag {
        VolumeTag::from_path(root)
    }
}

impl<P: ReparseProbe + ?Sized> ReparseProbe for &P {
    fn attributes(&self, path: &Path) -> io::Result<FileAttributes> {
        (**self).attributes(path)
    }

    fn substitute_name(&self, path: &Path) -> Result<String, ReparseError> {
        (**self).substitute_name(path)
    }

    fn volume_of(&self, root: &Path) -> VolumeTag {
        (**self).volume_of(root)
    }
}

/// The running platform's probe.
///
/// On Windows this issues `GetFileAttributesW` and
/// `FSCTL_GET_REPARSE_POINT`. Elsewhere symbolic links stand in for reparse
/// points; their targets never carry a drive letter, so they always fail
/// closed.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProbe;

impl ReparseProbe for SystemProbe {
    fn attributes(&self, path: &Path) -> io::Result<FileAttributes> {
        sys::attributes(path)
    }

    fn substitute_name(&self, path: &Path) -> Result<String, ReparseError> {
        sys::substitute_name(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn plain_entries_are_not_reparse_points() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f.txt");
        fs::write(&file, b"hello").unwrap();

        let dir_attrs = SystemProbe.attributes(tmp.path()).unwrap();
        assert_eq!(
            dir_attrs,
            FileAttributes {
                directory: true,
                reparse_point: false
            }
        );

        let file_attrs = SystemProbe.attributes(&file).unwrap();
        assert!(!file_attrs.directory);
        assert!(!file_attrs.reparse_point);
    }

    #[test]
    fn missing_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(SystemProbe.attributes(&tmp.path().join("nope")).is_err());
    }

    #[test]
    fn plain_directory_has_no_reparse_data() {
        let tmp = TempDir::new().unwrap();
        assert!(SystemProbe.substitute_name(tmp.path()).is_err());
    }

    #[cfg(windows)]
    #[test]
    fn open_failure_carries_the_os_error() {
        let tmp = TempDir::new().unwrap();
        match SystemProbe.substitute_name(&tmp.path().join("nope")) {
            Err(ReparseError::Open(err)) => {
                assert_eq!(err.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Open, got {other:?}"),
        }
    }

    #[cfg(windows)]
    #[test]
    fn device_control_failure_carries_the_os_error() {
        // ERROR_NOT_A_REPARSE_POINT
        const NOT_A_REPARSE_POINT: i32 = 4390;
        let tmp = TempDir::new().unwrap();
        match SystemProbe.substitute_name(tmp.path()) {
            Err(ReparseError::DeviceControl(err)) => {
                assert_eq!(err.raw_os_error(), Some(NOT_A_REPARSE_POINT));
            }
            other => panic!("expected DeviceControl, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_a_reparse_point() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("real");
        let link = tmp.path().join("link");
        fs::create_dir(&target).unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let attrs = SystemProbe.attributes(&link).unwrap();
        assert!(attrs.directory);
        assert!(attrs.reparse_point);
        assert_eq!(
            SystemProbe.substitute_name(&link).unwrap(),
            target.to_string_lossy()
        );
    }
}
