//! Ordering helpers for scene and track names
//!
//! Scenes are shown in natural order ("Scene 9" before "Scene 10"); track
//! filenames use Unicode collation (CLDR root), the order a browser's
//! `localeCompare` produces.

use feruca::{Collator, Locale, Tailoring};
use std::cell::RefCell;
use std::cmp::Ordering;

thread_local! {
    // Punctuation is non-ignorable, so "cue_2" sorts before "cue2"
    static COLLATOR: RefCell<Collator> =
        RefCell::new(Collator::new(Tailoring::Cldr(Locale::Root), false, true));
}

/// Compare two scene names for display
///
/// Names that both parse fully as integers compare numerically; anything
/// else falls back to [`natural_cmp`].
///
/// # Examples
///
/// ```
/// use cuedeck_common::natural::compare_scene_names;
///
/// let mut scenes = vec!["Scene 2", "Scene 10", "Scene 1"];
/// scenes.sort_by(|a, b| compare_scene_names(a, b));
/// assert_eq!(scenes, vec!["Scene 1", "Scene 2", "Scene 10"]);
/// ```
pub fn compare_scene_names(a: &str, b: &str) -> Ordering {
    if is_integer(a) && is_integer(b) {
        return compare_digit_runs(a, b);
    }
    natural_cmp(a, b)
}

fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Case-insensitive comparison where embedded digit runs compare by value
///
/// Exact ties (e.g. "scene 1" vs "Scene 1") are broken byte-wise so the
/// result is a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);

    loop {
        let ord = match (left.next(), right.next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(Chunk::Digits(x)), Some(Chunk::Digits(y))) => compare_digit_runs(x, y),
            (Some(Chunk::Text(x)), Some(Chunk::Text(y))) => compare_folded(x, y),
            (Some(x), Some(y)) => compare_folded(x.as_str(), y.as_str()),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a.cmp(b)
}

/// Collation order for filenames
///
/// Punctuation sorts ahead of digits and letters. Case only decides between
/// otherwise equal names, lowercase first. Digits are not compared by
/// value, so "Track10" sorts before "Track2". Names the collator cannot
/// tell apart fall back to byte order.
///
/// # Examples
///
/// ```
/// use cuedeck_common::natural::locale_cmp;
///
/// let mut names = vec!["track.mp3", "cue2.mp3", "track_copy.mp3", "cue_2.mp3"];
/// names.sort_by(|a, b| locale_cmp(a, b));
/// assert_eq!(names, vec!["cue_2.mp3", "cue2.mp3", "track_copy.mp3", "track.mp3"]);
/// ```
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with(|collator| collator.borrow_mut().collate(a, b))
        .then_with(|| a.cmp(b))
}

fn compare_folded(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Compare two ASCII digit runs by numeric value without parsing
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        // "007" after "7" so equal values still order deterministically
        .then_with(|| a.len().cmp(&b.len()))
}

#[derive(Debug, Clone, Copy)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

impl<'a> Chunk<'a> {
    fn as_str(&self) -> &'a str {
        match self {
            Chunk::Digits(s) | Chunk::Text(s) => s,
        }
    }
}

/// Splits a string into alternating digit / non-digit runs
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest.len());

        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if digits {
            Chunk::Digits(chunk)
        } else {
            Chunk::Text(chunk)
        })
    }
}
