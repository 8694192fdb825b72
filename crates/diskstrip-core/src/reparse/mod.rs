/// Reparse-point resolution: decides whether a link may be traversed.
///
/// A reparse point (junction, symbolic link, volume mount point) is only
/// followed when its substitute name provably points at the volume the scan
/// started on. Every case that cannot be proven (UNC shares, volume GUID
/// paths, unreadable or unparseable reparse data) resolves to "foreign",
/// which prunes the subtree.
pub mod buffer;

use crate::model::volume::{drive_prefix, VolumeTag};
use crate::platform::{FileAttributes, ReparseProbe};
use std::path::Path;
use tracing::trace;

pub use buffer::parse_substitute_name;

/// Markers that identify a UNC substitute name. Checked on the upper-cased target.
const UNC_MARKERS: [&str; 3] = [r"\??\UNC\", r"\\?\UNC\", r"\\UNC\"];

/// Marker of a `\??\Volume{GUID}\` substitute name.
const VOLUME_GUID_MARKER: &str = "VOLUME{";

/// Classification of a reparse point's substitute name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReparseTarget {
    SameVolumeDrivePath,
    OtherVolumeDrivePath,
    UncPath,
    VolumeGuidPath,
    Unresolvable,
}

impl ReparseTarget {
    /// Classify a substitute name against the scan root's volume.
    pub fn classify(substitute: &str, root_volume: &VolumeTag) -> Self {
        let upper = substitute.to_uppercase();

        if UNC_MARKERS.iter().any(|marker| upper.contains(marker)) {
            return Self::UncPath;
        }

        if let Some(letter) = drive_prefix(&upper) {
            return if root_volume.is_drive(letter) {
                Self::SameVolumeDrivePath
            } else {
                Self::OtherVolumeDrivePath
            };
        }

        if upper.contains(VOLUME_GUID_MARKER) {
            return Self::VolumeGuidPath;
        }

        Self::Unresolvable
    }

    /// Only a drive path on the root's own volume may be traversed.
    #[inline]
    pub fn is_same_volume(self) -> bool {
        self == Self::SameVolumeDrivePath
    }
}

/// Answers reparse questions for one scan root.
#[derive(Debug)]
pub struct ReparseResolver<P> {
    probe: P,
    volume: VolumeTag,
}

impl<P: ReparseProbe> ReparseResolver<P> {
    /// Create a resolver for a scan rooted at `root`.
    pub fn new(probe: P, root: &Path) -> Self {
        let volume = probe.volume_of(root);
        Self { probe, volume }
    }

    pub fn volume(&self) -> VolumeTag {
        self.volume
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// `true` if `path` carries the reparse-point attribute.
    ///
    /// A path whose attributes cannot be read at all reports `false`.
    pub fn is_reparse_point(&self, path: &Path) -> bool {
        self.probe
            .attributes(path)
            .map(|attrs| attrs.reparse_point)
            .unwrap_or(false)
    }

    /// Classify the target of the reparse point at `path`.
    ///
    /// Any failure to read or parse the reparse data is `Unresolvable`.
    pub fn classify(&self, path: &Path) -> ReparseTarget {
        match self.probe.substitute_name(path) {
            Ok(substitute) => {
                let target = ReparseTarget::classify(&substitute, &self.volume);
                trace!(path = %path.display(), %substitute, ?target, "classified reparse point");
                target
            }
            Err(err) => {
                trace!(path = %path.display(), error = %err, "unreadable reparse point");
                ReparseTarget::Unresolvable
            }
        }
    }

    /// Classify `path` given attributes the caller already holds.
    ///
    /// `None` means the entry is not a reparse point and is always traversable.
    pub fn target_of(&self, path: &Path, attrs: FileAttributes) -> Option<ReparseTarget> {
        attrs.reparse_point.then(|| self.classify(path))
    }

    /// `true` if `path` may be traversed without leaving the root's volume.
    ///
    /// Ordinary entries are always traversable. An entry whose attributes
    /// cannot be read is not.
    pub fn resolves_to_same_volume(&self, path: &Path) -> bool {
        match self.probe.attributes(path) {
            Ok(attrs) => self
                .target_of(path, attrs)
                .map_or(true, ReparseTarget::is_same_volume),
            Err(_) => false,
        }
    }
}
