//! The pluggable cache backend.
//!
//! Parsing, shallow-declaration extraction, folded-declaration synthesis,
//! linearization, and type inference are treated as external pure functions
//! the core orchestrates against a `Context` that holds the pluggable cache
//! backend. This trait is that seam: the daemon's cache layers (`nova-cache`)
//! and buffer table
//! (`nova-vfs`) are generic over it, so the invalidation machinery never has
//! to know what an AST or a typed AST actually looks like.
//!
//! `fold_decl`, `linearize`, and `typecheck` take a lookup closure instead of
//! a reference to the whole cache, because they may need to demand a decl for
//! a symbol that the caller hasn't computed yet; the cache layer supplies a
//! closure that recurses back into its own memoized lookup.

use crate::{FileInfo, SymbolName};

/// A lookup from symbol name to an already-or-newly-computed shallow decl.
/// Returns `None` if the symbol is unknown (e.g. dangling supertype
/// reference); backends must tolerate that rather than panicking.
pub type ShallowLookup<'a, D> = dyn FnMut(&SymbolName) -> Option<D> + 'a;

/// A lookup from symbol name to an already-or-newly-computed folded decl.
pub type FoldedLookup<'a, D> = dyn FnMut(&SymbolName) -> Option<D> + 'a;

/// The external, pure query functions the daemon core orchestrates but does
/// not implement. A production backend wraps a real parser/type-checker; test
/// backends implement these over a trivial fixture language.
pub trait Backend: Clone + Send + Sync + 'static {
    type Ast: Clone + Send + Sync + 'static;
    type Tast: Clone + Send + Sync + 'static;
    type ShallowDecl: Clone + Send + Sync + 'static;
    type FoldedDecl: Clone + Send + Sync + 'static;
    type Linearization: Clone + Send + Sync + 'static;

    /// Parse `contents` into an AST. Depends solely on `contents`.
    fn parse(&self, contents: &str) -> Self::Ast;

    /// Extract the set of symbols a file defines from its AST, enough to
    /// rebuild the reverse naming table.
    fn file_info(&self, ast: &Self::Ast) -> FileInfo;

    /// Extract `symbol`'s shallow declaration (signature without transitive
    /// resolution) from `ast`, if `ast` defines it.
    fn shallow_decl(&self, ast: &Self::Ast, symbol: &SymbolName) -> Option<Self::ShallowDecl>;

    /// Resolve `symbol`'s fully folded declaration from its shallow decl,
    /// demanding supertype shallow decls through `lookup_shallow`.
    fn fold_decl(
        &self,
        symbol: &SymbolName,
        shallow: &Self::ShallowDecl,
        lookup_shallow: &mut ShallowLookup<'_, Self::ShallowDecl>,
    ) -> Self::FoldedDecl;

    /// Compute the method-resolution order for `class`, demanding folded
    /// decls through `lookup_folded`.
    fn linearize(
        &self,
        class: &SymbolName,
        lookup_folded: &mut FoldedLookup<'_, Self::FoldedDecl>,
    ) -> Self::Linearization;

    /// Annotate `ast` with inferred types, demanding folded decls through
    /// `lookup_folded`.
    fn typecheck(
        &self,
        ast: &Self::Ast,
        lookup_folded: &mut FoldedLookup<'_, Self::FoldedDecl>,
    ) -> Self::Tast;
}
