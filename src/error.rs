//! Error types shared across the bitset, layout, and tree modules.
//!
//! Each kind of failure is a structured `*Kind` enum wrapped in a small
//! context-carrying struct, with a hand-written [`core::fmt::Display`]
//! rather than a `thiserror` derive, so the crate stays usable from
//! `no_std`.

use core::fmt;

/// Unifying error type for all fallible Bonsai operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BonsaiError {
    /// A wire-format value failed to parse: bad magic, unknown tag, oversized dictionary.
    Format(FormatError),
    /// An index or rank argument fell outside its valid range.
    Bounds(BoundsError),
    /// The underlying I/O source or sink reported an error.
    #[cfg(feature = "std")]
    Io(IoErrorInfo),
}

impl fmt::Display for BonsaiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(e) => write!(f, "{e}"),
            Self::Bounds(e) => write!(f, "{e}"),
            #[cfg(feature = "std")]
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BonsaiError {}

impl From<FormatError> for BonsaiError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

impl From<BoundsError> for BonsaiError {
    fn from(e: BoundsError) -> Self {
        Self::Bounds(e)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for BonsaiError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(IoErrorInfo {
            message: e.to_string(),
        })
    }
}

/// Kinds of format errors that can arise while reading the binary encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The full-binary tree magic number did not match `0x0066797883657302`.
    BadTreeMagic { found: u64 },
    /// A primitive layout's one-byte encoding tag was neither `0` (plain) nor `1` (byte-dictionary).
    UnknownPrimitiveTag { tag: u8 },
    /// A higher-level layout tag byte (optional/product/col) was not `1`.
    UnknownLayoutTag { tag: u8 },
    /// Byte-dictionary length exceeded the 256-entry ceiling.
    DictionaryTooLarge { len: u32 },
    /// A dictionary index referenced a slot past the dictionary's length.
    DictionaryIndexOutOfRange { index: u32, dict_len: u32 },
    /// Fewer bytes remained in the source than the format required.
    UnexpectedEof { needed: usize, available: usize },
    /// A length-prefixed string was not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadTreeMagic { found } => {
                write!(f, "bad tree magic number: found {found:#018x}")
            }
            Self::UnknownPrimitiveTag { tag } => {
                write!(f, "unknown primitive encoding tag: {tag}")
            }
            Self::UnknownLayoutTag { tag } => write!(f, "unknown layout tag byte: {tag}"),
            Self::DictionaryTooLarge { len } => {
                write!(f, "byte-dictionary length {len} exceeds 256-entry ceiling")
            }
            Self::DictionaryIndexOutOfRange { index, dict_len } => write!(
                f,
                "dictionary index {index} out of range (dictionary length {dict_len})"
            ),
            Self::UnexpectedEof { needed, available } => write!(
                f,
                "unexpected end of input: needed {needed} bytes, {available} available"
            ),
            Self::InvalidUtf8 => write!(f, "length-prefixed string was not valid UTF-8"),
        }
    }
}

/// A format error, with the kind of failure that occurred.
///
/// The source position at the point of failure is left undefined per the
/// spec's error handling design — callers should not assume the underlying
/// reader can be resumed after a `Format` error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    pub kind: FormatErrorKind,
}

impl FormatError {
    pub fn new(kind: FormatErrorKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "format error: {}", self.kind)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FormatError {}

/// Kinds of bounds violations. These indicate a caller bug and are meant to
/// fail fast rather than be recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsErrorKind {
    /// `get(i)` (or equivalent) was called with `i` outside `[0, len)`.
    Index,
    /// `select(k)` was called with `k` outside `[1, popcount]`.
    Select,
}

/// A bounds error: index/select argument out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsError {
    pub kind: BoundsErrorKind,
    /// The offending argument.
    pub requested: usize,
    /// The exclusive upper bound that `requested` violated (`len` or `popcount`).
    pub bound: usize,
}

impl fmt::Display for BoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BoundsErrorKind::Index => write!(
                f,
                "index {} out of bounds (length {})",
                self.requested, self.bound
            ),
            BoundsErrorKind::Select => write!(
                f,
                "select rank {} out of bounds (popcount {})",
                self.requested, self.bound
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BoundsError {}

/// Captured message from an I/O error, since `std::io::Error` does not implement
/// `PartialEq`/`Clone` and the rest of this crate's error types need to.
#[cfg(feature = "std")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoErrorInfo {
    pub message: alloc::string::String,
}

#[cfg(feature = "std")]
impl fmt::Display for IoErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I/O error: {}", self.message)
    }
}

pub(crate) fn index_bounds(requested: usize, len: usize) -> BoundsError {
    BoundsError {
        kind: BoundsErrorKind::Index,
        requested,
        bound: len,
    }
}

pub(crate) fn select_bounds(requested: usize, popcount: usize) -> BoundsError {
    BoundsError {
        kind: BoundsErrorKind::Select,
        requested,
        bound: popcount,
    }
}
