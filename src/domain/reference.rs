//! Reference-token parsing.
//!
//! Finding aids locate items with printed reference tokens such as `6.(1)`,
//! `2/3/1`, or `106.?`. This module normalizes one raw token into a
//! [`HierarchyPath`] — an ordered, non-empty sequence of positive integers —
//! plus a fuzziness flag for tokens that needed heuristic repair.
//!
//! Parsing is total: every input string, including empty and malformed ones,
//! produces a path. Records with no recoverable structure receive a synthetic
//! single-segment path derived from their position, so that no record is ever
//! dropped from the tree.

use std::{fmt, num::NonZeroU32, sync::LazyLock};

use nonempty::NonEmpty;
use regex::Regex;

/// A normalized position in the nested numbering scheme of one document.
///
/// Segments are always positive; "no structural information" is represented
/// by a synthetic path, never by a zero segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HierarchyPath(NonEmpty<NonZeroU32>);

impl HierarchyPath {
    /// A path with a single segment.
    #[must_use]
    pub const fn root(segment: NonZeroU32) -> Self {
        Self(NonEmpty::new(segment))
    }

    /// Builds a path from raw integers.
    ///
    /// Returns `None` if the sequence is empty or contains a zero.
    #[must_use]
    pub fn from_segments<I>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let segments: Option<Vec<NonZeroU32>> =
            segments.into_iter().map(NonZeroU32::new).collect();
        NonEmpty::from_vec(segments?).map(Self)
    }

    /// The number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the segments in order.
    pub fn segments(&self) -> impl Iterator<Item = NonZeroU32> + '_ {
        self.0.iter().copied()
    }

    /// The deepest segment.
    #[must_use]
    pub fn last(&self) -> NonZeroU32 {
        *self.0.last()
    }

    /// The path one segment shorter, or `None` for a root path.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let mut segments: Vec<NonZeroU32> = self.0.iter().copied().collect();
        segments.pop();
        NonEmpty::from_vec(segments).map(Self)
    }

    /// The path extended by one segment.
    #[must_use]
    pub fn child(&self, segment: NonZeroU32) -> Self {
        let mut path = self.0.clone();
        path.push(segment);
        Self(path)
    }

    /// Whether `self` is a strict prefix of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.depth() < other.depth()
            && self.segments().zip(other.segments()).all(|(a, b)| a == b)
    }

    /// Whether `other` is exactly one segment deeper than `self` and extends
    /// it.
    #[must_use]
    pub fn is_parent_of(&self, other: &Self) -> bool {
        self.depth() + 1 == other.depth() && self.is_ancestor_of(other)
    }
}

impl fmt::Display for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// The grammar a reference token matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Slash-separated segments, e.g. `2/3/1` or `10./4./7.`.
    SlashPath,
    /// Numeric prefix with parenthesized descendants, e.g. `6.(1)`.
    Composite,
    /// A bare parenthesized numeral, e.g. `(2)`. Context-dependent: the
    /// builder composes it onto the most recent open root context.
    Parenthetical,
    /// A bare numeral with optional trailing dot, e.g. `7.`.
    BareNumeral,
    /// A numeral with a fuzzy marker or letter suffix, e.g. `106.?`, `45a`.
    FuzzyNumeral,
    /// No grammar matched; the path is a synthetic marker derived from the
    /// record's position.
    Synthetic,
}

/// The result of parsing one raw reference token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    /// The normalized path. For [`TokenKind::Parenthetical`] this is a
    /// single-segment path; composition into the open context is the tree
    /// builder's job.
    pub path: HierarchyPath,
    /// True when any segment was inferred from an ambiguous token.
    pub fuzzy: bool,
    /// The grammar that matched.
    pub kind: TokenKind,
}

static COMPOSITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.?\s*((?:\(\s*\d+\s*\)\s*\.?\s*)+)$").expect("valid regex")
});
static PAREN_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*(\d+)\s*\)").expect("valid regex"));
static PAREN_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\s*(\d+)\s*\)$").expect("valid regex"));
static BARE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.?$").expect("valid regex"));
static LEADING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)").expect("valid regex"));

/// Parses a raw reference token into a path and fuzziness flag.
///
/// Total over every input string. `order_index` seeds the synthetic fallback
/// path for unparseable tokens.
#[must_use]
pub fn parse(raw: &str, order_index: usize) -> ParsedReference {
    let s = clean(raw);

    if s.contains('/') {
        return parse_slash_path(&s, order_index);
    }

    if let Some(captures) = COMPOSITE_RE.captures(&s) {
        let mut segments = vec![parse_u32(&captures[1])];
        segments.extend(
            PAREN_GROUP_RE
                .captures_iter(&captures[2])
                .map(|c| parse_u32(&c[1])),
        );
        return assemble(segments, false, TokenKind::Composite, order_index);
    }

    if let Some(captures) = PAREN_ONLY_RE.captures(&s) {
        return assemble(
            vec![parse_u32(&captures[1])],
            false,
            TokenKind::Parenthetical,
            order_index,
        );
    }

    if let Some(captures) = BARE_RE.captures(&s) {
        return assemble(
            vec![parse_u32(&captures[1])],
            false,
            TokenKind::BareNumeral,
            order_index,
        );
    }

    // Fuzzy numeric: starts with digits, no slash or parenthesis. Covers
    // `106.?`, `25??`, and letter-suffixed numerals like `45a`.
    if !s.contains('(') {
        if let Some(captures) = LEADING_DIGITS_RE.captures(&s) {
            return assemble(
                vec![parse_u32(&captures[1])],
                true,
                TokenKind::FuzzyNumeral,
                order_index,
            );
        }
    }

    synthetic(order_index)
}

/// Strips stray quotes and surrounding whitespace, e.g. `"26.` from OCR.
fn clean(raw: &str) -> String {
    raw.trim().replace(['"', '\''], "").trim().to_string()
}

fn parse_slash_path(s: &str, order_index: usize) -> ParsedReference {
    let mut fuzzy = false;
    let mut segments = Vec::new();

    for part in s.split('/') {
        let part = part.trim().trim_end_matches('.');
        match LEADING_DIGITS_RE.captures(part) {
            Some(captures) => {
                if captures[1].len() != part.len() {
                    // Trailing junk after the digits, e.g. `4a`.
                    fuzzy = true;
                }
                segments.push(parse_u32(&captures[1]));
            }
            None => {
                // Non-numeric segment: contribute a positional placeholder.
                fuzzy = true;
                segments.push(None);
            }
        }
    }

    assemble(segments, fuzzy, TokenKind::SlashPath, order_index)
}

/// Resolves a sequence of optionally-missing segment values into a path.
///
/// A missing or zero segment falls back to its 1-based position in the token,
/// which forces the fuzzy flag. The caller guarantees `segments` is non-empty.
fn assemble(
    segments: Vec<Option<NonZeroU32>>,
    fuzzy: bool,
    kind: TokenKind,
    order_index: usize,
) -> ParsedReference {
    if segments.is_empty() {
        return synthetic(order_index);
    }

    let mut fuzzy = fuzzy;
    let resolved: Vec<NonZeroU32> = segments
        .into_iter()
        .enumerate()
        .map(|(i, segment)| {
            segment.unwrap_or_else(|| {
                fuzzy = true;
                position_segment(i)
            })
        })
        .collect();

    let path = NonEmpty::from_vec(resolved).map(HierarchyPath);
    path.map_or_else(
        || synthetic(order_index),
        |path| ParsedReference { path, fuzzy, kind },
    )
}

fn parse_u32(digits: &str) -> Option<NonZeroU32> {
    digits.parse::<u32>().ok().and_then(NonZeroU32::new)
}

/// 1-based placeholder for a segment whose printed value was unusable.
fn position_segment(index: usize) -> NonZeroU32 {
    let value = u32::try_from(index.saturating_add(1)).unwrap_or(u32::MAX);
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// The fallback path for a token that matched no grammar: a single segment
/// derived from the record's position, guaranteeing the record still gets a
/// place in the tree.
fn synthetic(order_index: usize) -> ParsedReference {
    let value = u32::try_from(order_index.saturating_add(1)).unwrap_or(u32::MAX);
    let segment = NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN);
    ParsedReference {
        path: HierarchyPath::root(segment),
        fuzzy: true,
        kind: TokenKind::Synthetic,
    }
}
