/// Drive enumeration.
///
/// Lists the drive letters currently assigned on the system so a frontend
/// can offer them as scan roots.
use crate::model::VolumeTag;

/// Enumerate all logical drives, in letter order.
///
/// Returns an empty vec on platforms without drive letters.
#[cfg(windows)]
pub fn logical_drives() -> Vec<VolumeTag> {
    let mask = unsafe { windows::Win32::Storage::FileSystem::GetLogicalDrives() };
    if mask == 0 {
        tracing::warn!("GetLogicalDrives returned 0");
    }
    drives_from_mask(mask)
}

#[cfg(not(windows))]
pub fn logical_drives() -> Vec<VolumeTag> {
    Vec::new()
}

/// Decode a `GetLogicalDrives` bitmask: bit 0 is `A:`, bit 25 is `Z:`.
pub fn drives_from_mask(mask: u32) -> Vec<VolumeTag> {
    (b'A'..=b'Z')
        .enumerate()
        .filter(|(bit, _)| mask & (1 << bit) != 0)
        .filter_map(|(_, letter)| VolumeTag::drive(letter as char))
        .collect()
}

/// The root directory of a drive, e.g. `C:\`.
pub fn drive_root(volume: &VolumeTag) -> Option<std::path::PathBuf> {
    volume
        .letter()
        .map(|letter| std::path::PathBuf::from(format!("{letter}:\\")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bitmask() {
        // A:, C:, D:
        let drives = drives_from_mask(0b1101);
        let labels: Vec<String> = drives.iter().map(|d| d.to_string()).collect();
        assert_eq!(labels, ["A:", "C:", "D:"]);
    }

    #[test]
    fn empty_mask_yields_nothing() {
        assert!(drives_from_mask(0).is_empty());
    }

    #[test]
    fn high_bits_are_ignored() {
        let drives = drives_from_mask(1 << 25 | 1 << 30);
        assert_eq!(drives.len(), 1);
        assert_eq!(drives[0].to_string(), "Z:");
    }

    #[test]
    fn drive_root_path() {
        let c = VolumeTag::drive('c').unwrap();
        assert_eq!(drive_root(&c).unwrap().to_string_lossy(), "C:\\");
        assert!(drive_root(&VolumeTag::unlettered()).is_none());
    }

    #[test]
    fn logical_drives_does_not_panic() {
        let _ = logical_drives();
    }
}
