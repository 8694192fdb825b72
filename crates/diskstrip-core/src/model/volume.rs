/// Volume identity for the scan root.
///
/// A volume is identified by its drive letter. The tag is derived once from
/// the root path and never changes during a scan; reparse targets are
/// compared against it to decide whether a link stays on the scanned volume.
use std::fmt;
use std::path::Path;

/// Long-path and device prefixes that may precede a drive letter.
const PATH_PREFIXES: [&str; 3] = [r"\\?\", r"\??\", r"\\.\"];

/// Normalised volume identifier, e.g. `C:`.
///
/// Paths without a drive letter (UNC shares, POSIX paths) produce a tag with
/// no letter, which matches no drive-letter target at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VolumeTag {
    letter: Option<char>,
}

impl VolumeTag {
    /// Tag for the given drive letter (case-insensitive).
    pub fn drive(letter: char) -> Option<Self> {
        letter.is_ascii_alphabetic().then(|| Self {
            letter: Some(letter.to_ascii_uppercase()),
        })
    }

    /// Tag for a root that lives on no lettered volume.
    pub fn unlettered() -> Self {
        Self { letter: None }
    }

    /// Derive the volume of `path` from its leading drive letter.
    pub fn from_path(path: &Path) -> Self {
        let text = path.to_string_lossy();
        drive_prefix(&text)
            .and_then(Self::drive)
            .unwrap_or_else(Self::unlettered)
    }

    pub fn letter(&self) -> Option<char> {
        self.letter
    }

    /// `true` when `letter` names this volume.
    pub fn is_drive(&self, letter: char) -> bool {
        self.letter == Some(letter.to_ascii_uppercase())
    }
}

impl fmt::Display for VolumeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter {
            Some(letter) => write!(f, "{letter}:"),
            None => f.write_str("<no drive>"),
        }
    }
}

/// Return the drive letter if `text` starts with `X:`, after stripping any
/// long-path or device prefix.
pub fn drive_prefix(text: &str) -> Option<char> {
    let mut rest = text;
    for prefix in PATH_PREFIXES {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
            break;
        }
    }
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => Some(letter),
        _ => None,
    }
}
