//! The Entry Table: the set of editor-held, in-memory buffers.
//!
//! An [`Entry`] exists iff the editor currently considers the file open
//!. Its AST is cached directly on the entry because it
//! depends solely on the entry's own contents — no cross-entry
//! invalidation is ever needed for it, unlike the shallow/folded/TAST caches
//! in `nova-cache`, which the [`Invalidation Engine`](../nova_cache/index.html)
//! must invalidate on every mutation here.

use std::collections::HashMap;
use std::sync::Arc;

use nova_core::{Backend, RepoPath};
use nova_ids::{EntryId, EntryIdAllocator};

/// An editor-held in-memory buffer.
pub struct Entry<B: Backend> {
    id: EntryId,
    path: RepoPath,
    contents: String,
    ast: Option<Arc<B::Ast>>,
}

impl<B: Backend> Entry<B> {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn path(&self) -> &RepoPath {
        &self.path
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Returns the cached AST, computing and caching it via `backend` if this
    /// is the first request since the entry was created or last edited.
    pub fn ast(&mut self, backend: &B) -> Arc<B::Ast> {
        if let Some(ast) = &self.ast {
            return ast.clone();
        }
        let ast = Arc::new(backend.parse(&self.contents));
        self.ast = Some(ast.clone());
        ast
    }

    /// Discard the cached AST (Trigger A: invalidate the AST of this entry).
    fn invalidate_ast(&mut self) {
        self.ast = None;
    }
}

/// Outcome of [`EntryTable::open`], used by the Invalidation Engine to decide
/// whether Trigger A actually needs to run: a no-op re-open must not
/// invalidate anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A brand new entry was created.
    Created(EntryId),
    /// An existing entry's contents were replaced with different contents.
    ContentsReplaced(EntryId),
    /// An entry for this path already existed with identical contents; no
    /// mutation occurred.
    NoOp(EntryId),
}

impl OpenOutcome {
    pub fn entry_id(self) -> EntryId {
        match self {
            OpenOutcome::Created(id) | OpenOutcome::ContentsReplaced(id) | OpenOutcome::NoOp(id) => id,
        }
    }

    pub fn changed(self) -> bool {
        !matches!(self, OpenOutcome::NoOp(_))
    }
}

/// The set of currently-open buffers, keyed by path.
pub struct EntryTable<B: Backend> {
    by_path: HashMap<RepoPath, Entry<B>>,
    ids: EntryIdAllocator,
}

impl<B: Backend> Default for EntryTable<B> {
    fn default() -> Self {
        Self {
            by_path: HashMap::new(),
            ids: EntryIdAllocator::new(),
        }
    }
}

impl<B: Backend> EntryTable<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &RepoPath) -> Option<&Entry<B>> {
        self.by_path.get(path)
    }

    pub fn get_mut(&mut self, path: &RepoPath) -> Option<&mut Entry<B>> {
        self.by_path.get_mut(path)
    }

    pub fn contains(&self, path: &RepoPath) -> bool {
        self.by_path.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &RepoPath> {
        self.by_path.keys()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// `File_opened`: create an entry, replace an existing one's contents, or
    /// no-op if the contents are unchanged.
    ///
    /// Callers that only have a path and no new contents should not call
    /// this at all — that case means "read from disk", and existing entries
    /// are left untouched.
    pub fn open(&mut self, path: RepoPath, contents: String) -> OpenOutcome {
        if let Some(existing) = self.by_path.get_mut(&path) {
            if existing.contents == contents {
                tracing::trace!(path = %existing.path, "file_opened no-op: contents unchanged");
                return OpenOutcome::NoOp(existing.id);
            }
            existing.contents = contents;
            existing.invalidate_ast();
            tracing::debug!(path = %existing.path, "file_opened: contents replaced");
            return OpenOutcome::ContentsReplaced(existing.id);
        }

        let id = self.ids.alloc();
        tracing::debug!(path = %path, ?id, "file_opened: new entry");
        self.by_path.insert(
            path.clone(),
            Entry {
                id,
                path,
                contents,
                ast: None,
            },
        );
        OpenOutcome::Created(id)
    }

    /// `File_closed`: remove the entry, if any.
    pub fn close(&mut self, path: &RepoPath) -> Option<Entry<B>> {
        let removed = self.by_path.remove(path);
        if removed.is_some() {
            tracing::debug!(%path, "file_closed");
        }
        removed
    }
}
