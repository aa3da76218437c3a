//! Trim markers embedded in track filenames
//!
//! A trimmed track keeps its audio untouched; the play window is encoded in
//! the filename as a suffix before the extension:
//!
//! ```text
//! <base>_from_<start>s_to_<end>s<ext>
//! <base>_from_<start>s_to_end<ext>
//! ```
//!
//! All parsing and formatting of that suffix lives here so the store and
//! the HTTP layer never build marker strings by hand.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Full filename grammar: base, markers, extension
static MARKED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>.+)_from_(?P<start>\d+)s_to_(?:(?P<end>\d+)s|end)(?P<ext>\.[^.]+)$")
        .expect("marked name pattern is valid")
});

/// Marker suffix anywhere in a name (used when listing)
static MARKER_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"_from_(?P<start>\d+)s_to_(?:(?P<end>\d+)s|end)")
        .expect("marker suffix pattern is valid")
});

/// Start/end play window in whole seconds
///
/// `end == None` means "play to the end of the file".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimMarkers {
    pub start: u32,
    pub end: Option<u32>,
}

impl TrimMarkers {
    pub fn new(start: u32, end: Option<u32>) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for TrimMarkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "_from_{}s_to_{}s", self.start, end),
            None => write!(f, "_from_{}s_to_end", self.start),
        }
    }
}

/// A filename split into base, markers and extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkedName<'a> {
    pub base: &'a str,
    pub markers: TrimMarkers,
    /// Extension including the leading dot
    pub extension: &'a str,
}

impl<'a> MarkedName<'a> {
    /// Parse a filename carrying a marker suffix
    ///
    /// Returns `None` when the name has no suffix, no extension, or a marker
    /// value that does not fit in `u32`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cuedeck_common::markers::MarkedName;
    ///
    /// let parsed = MarkedName::parse("thunder_from_10s_to_end.wav").unwrap();
    /// assert_eq!(parsed.base, "thunder");
    /// assert_eq!(parsed.markers.start, 10);
    /// assert_eq!(parsed.markers.end, None);
    /// assert_eq!(parsed.extension, ".wav");
    ///
    /// assert!(MarkedName::parse("thunder.wav").is_none());
    /// ```
    pub fn parse(name: &'a str) -> Option<Self> {
        let caps = MARKED_NAME.captures(name)?;
        let markers = markers_from_captures(&caps)?;
        Some(Self {
            base: caps.name("base")?.as_str(),
            markers,
            extension: caps.name("ext")?.as_str(),
        })
    }

    /// Render back to a filename
    pub fn to_file_name(&self) -> String {
        format!("{}{}{}", self.base, self.markers, self.extension)
    }
}

fn markers_from_captures(caps: &regex::Captures<'_>) -> Option<TrimMarkers> {
    let start = caps.name("start")?.as_str().parse().ok()?;
    let end = match caps.name("end") {
        Some(end) => Some(end.as_str().parse().ok()?),
        None => None,
    };
    Some(TrimMarkers { start, end })
}

/// Find a marker suffix anywhere in `name`
///
/// Looser than [`MarkedName::parse`]: the suffix need not sit directly
/// before the extension.
pub fn find_markers(name: &str) -> Option<TrimMarkers> {
    let caps = MARKER_SUFFIX.captures(name)?;
    markers_from_captures(&caps)
}

/// Split `name` at its last extension dot
///
/// `"cue.mp3"` → `("cue", ".mp3")`, `"cue"` → `("cue", "")`.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Remove the marker suffix, keeping the extension
///
/// Names without a suffix come back unchanged.
pub fn strip_markers(name: &str) -> String {
    match MarkedName::parse(name) {
        Some(parsed) => format!("{}{}", parsed.base, parsed.extension),
        None => name.to_string(),
    }
}

/// Replace (or add) the marker suffix on `name`
///
/// # Examples
///
/// ```
/// use cuedeck_common::markers::{with_markers, TrimMarkers};
///
/// assert_eq!(
///     with_markers("rain.mp3", TrimMarkers::new(3, Some(40))),
///     "rain_from_3s_to_40s.mp3"
/// );
/// assert_eq!(
///     with_markers("rain_from_3s_to_40s.mp3", TrimMarkers::new(5, None)),
///     "rain_from_5s_to_end.mp3"
/// );
/// ```
pub fn with_markers(name: &str, markers: TrimMarkers) -> String {
    let stripped = strip_markers(name);
    let (base, extension) = split_extension(&stripped);
    format!("{}{}{}", base, markers, extension)
}

/// Decide the filename actually stored when renaming `old_name` to `new_name`
///
/// - `new_name` already carries markers → used verbatim
/// - `old_name` carried markers → they are grafted onto `new_name`'s base,
///   keeping the old extension
/// - otherwise → `new_name` unchanged
///
/// # Examples
///
/// ```
/// use cuedeck_common::markers::resolve_rename;
///
/// assert_eq!(
///     resolve_rename("door_from_2s_to_9s.mp3", "slam.mp3"),
///     "slam_from_2s_to_9s.mp3"
/// );
/// assert_eq!(resolve_rename("door.mp3", "slam.mp3"), "slam.mp3");
/// ```
pub fn resolve_rename(old_name: &str, new_name: &str) -> String {
    if MarkedName::parse(new_name).is_some() {
        return new_name.to_string();
    }

    match MarkedName::parse(old_name) {
        Some(old) => {
            let (base, _) = split_extension(new_name);
            format!("{}{}{}", base, old.markers, old.extension)
        }
        None => new_name.to_string(),
    }
}
