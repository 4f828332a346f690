//! Core shared types for the daemon.
//!
//! This crate is intentionally small and holds only types that are meaningful
//! independent of any particular cache layer: positions, tagged repository
//! paths, and interned symbol names.

mod backend;
mod name;
mod panic_util;
mod path;

pub use backend::{Backend, FoldedLookup, ShallowLookup};
pub use name::{InternedName, Name, NameInterner, SymbolName};
pub use panic_util::{describe_panic, PanicDetail};
pub use path::{PathResolver, RepoPath, RootKind};

/// The set of symbols a file defines, enough to rebuild the reverse naming
/// table when the file's defining set changes (Trigger B).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileInfo {
    pub symbols: Vec<SymbolName>,
}

impl FileInfo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(symbols: Vec<SymbolName>) -> Self {
        Self { symbols }
    }
}

/// A position in a text document expressed as (line, UTF-16 code unit offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    #[inline]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open range in a text document expressed with document positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// A textual edit described by a range replacement.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

impl TextEdit {
    #[inline]
    pub fn new(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }
}
