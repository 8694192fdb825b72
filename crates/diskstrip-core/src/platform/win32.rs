/// Windows attribute and reparse-data queries.
///
/// The reparse point is opened with `FILE_FLAG_OPEN_REPARSE_POINT` (so the
/// link itself is opened, not its target) and `FILE_FLAG_BACKUP_SEMANTICS`
/// (required to open directories). One handle per call, always closed, and
/// no retries.
use super::FileAttributes;
use crate::error::ReparseError;
use crate::reparse::parse_substitute_name;
use std::ffi::c_void;
use std::io;
use std::iter;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, GetFileAttributesW, FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_REPARSE_POINT,
    FILE_FLAGS_AND_ATTRIBUTES, FILE_FLAG_BACKUP_SEMANTICS, FILE_FLAG_OPEN_REPARSE_POINT,
    FILE_SHARE_READ, FILE_SHARE_WRITE, INVALID_FILE_ATTRIBUTES, OPEN_EXISTING,
};
use windows::Win32::System::Ioctl::FSCTL_GET_REPARSE_POINT;
use windows::Win32::System::IO::DeviceIoControl;

/// `MAXIMUM_REPARSE_DATA_BUFFER_SIZE`.
const MAX_REPARSE_SIZE: usize = 16 * 1024;

const GENERIC_READ: u32 = 0x8000_0000;

/// Closes the wrapped handle on drop.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn to_wide(path: &Path) -> Vec<u16> {
    path.as_os_str()
        .encode_wide()
        .chain(iter::once(0))
        .collect()
}

pub(super) fn attributes(path: &Path) -> io::Result<FileAttributes> {
    let wide = to_wide(path);
    let attrs = unsafe { GetFileAttributesW(PCWSTR(wide.as_ptr())) };
    if attrs == INVALID_FILE_ATTRIBUTES {
        return Err(io::Error::last_os_error());
    }
    Ok(FileAttributes {
        directory: attrs & FILE_ATTRIBUTE_DIRECTORY.0 != 0,
        reparse_point: attrs & FILE_ATTRIBUTE_REPARSE_POINT.0 != 0,
    })
}

pub(super) fn substitute_name(path: &Path) -> Result<String, ReparseError> {
    let wide = to_wide(path);

    let handle = match unsafe {
        CreateFileW(
            PCWSTR(wide.as_ptr()),
            GENERIC_READ,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            None,
            OPEN_EXISTING,
            FILE_FLAGS_AND_ATTRIBUTES(
                FILE_FLAG_OPEN_REPARSE_POINT.0 | FILE_FLAG_BACKUP_SEMANTICS.0,
            ),
            None,
        )
    } {
        Ok(h) => OwnedHandle(h),
        Err(e) => {
            let err = io::Error::from(e);
            tracing::trace!("CreateFileW failed for {}: {err}", path.display());
            return Err(ReparseError::Open(err));
        }
    };

    let mut buf = vec![0u8; MAX_REPARSE_SIZE];
    let mut bytes_returned: u32 = 0;
    let ok = unsafe {
        DeviceIoControl(
            handle.0,
            FSCTL_GET_REPARSE_POINT,
            None,
            0,
            Some(buf.as_mut_ptr() as *mut c_void),
            buf.len() as u32,
            Some(&mut bytes_returned),
            None,
        )
    };
    if let Err(e) = ok {
        return Err(ReparseError::DeviceControl(io::Error::from(e)));
    }
    drop(handle);

    let len = (bytes_returned as usize).min(buf.len());
    parse_substitute_name(&buf[..len])
}
