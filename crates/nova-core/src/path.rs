//! Repository-relative paths tagged with a root.
//!
//! The daemon talks to three distinct roots at once: the repository root, the
//! scratch directory holding materialized standard-library stubs, and (during
//! tests) an arbitrary scratch root. Rather than a process-global prefix
//! table, callers hold a [`PathResolver`] capability and use it to resolve a
//! [`RepoPath`] to an absolute path on demand. This keeps root rewrites
//! (e.g. stub-directory re-materialization) observable only through the
//! resolver, never through a tagged path's identity.

use std::path::{Path, PathBuf};

/// Which root a [`RepoPath`] is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum RootKind {
    /// The repository under analysis.
    Repo,
    /// The scratch directory holding materialized standard-library stubs.
    Stdlib,
    /// A scratch root used for synthetic/non-addressable buffers (e.g. a
    /// buffer opened with no backing file).
    Scratch,
}

/// A repository-relative path tagged with the root it is relative to.
///
/// Equality is structural: two `RepoPath`s are equal iff their root and
/// relative path are equal, regardless of what either root currently resolves
/// to on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct RepoPath {
    root: RootKind,
    rel: PathBuf,
}

impl RepoPath {
    pub fn new(root: RootKind, rel: impl Into<PathBuf>) -> Self {
        Self { root, rel: rel.into() }
    }

    pub fn repo(rel: impl Into<PathBuf>) -> Self {
        Self::new(RootKind::Repo, rel)
    }

    pub fn root(&self) -> RootKind {
        self.root
    }

    pub fn relative(&self) -> &Path {
        &self.rel
    }

    /// Whether this path's file extension indicates it is a source file the
    /// Forward/Reverse Naming Tables should track. Non-source files are
    /// ignored by Trigger B but still counted in backlog progress.
    pub fn is_source_file(&self) -> bool {
        self.rel
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("src"))
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}:{}", self.root, self.rel.display())
    }
}

/// Resolves tagged [`RepoPath`]s to absolute filesystem paths.
///
/// This is the explicit capability that replaces a process-global path
/// prefix registry. `InitializedState` owns the single instance for a
/// running daemon; tests
/// construct their own instance pointed at a `tempfile::TempDir`.
#[derive(Debug, Clone)]
pub struct PathResolver {
    repo_root: PathBuf,
    stdlib_root: PathBuf,
    scratch_root: PathBuf,
}

impl PathResolver {
    pub fn new(repo_root: impl Into<PathBuf>, stdlib_root: impl Into<PathBuf>, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            stdlib_root: stdlib_root.into(),
            scratch_root: scratch_root.into(),
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn stdlib_root(&self) -> &Path {
        &self.stdlib_root
    }

    /// Re-point the stdlib root at a freshly materialized directory.
    /// Observable only through this resolver; callers must not invalidate
    /// caches as a result.
    pub fn set_stdlib_root(&mut self, new_root: impl Into<PathBuf>) {
        self.stdlib_root = new_root.into();
    }

    pub fn resolve(&self, path: &RepoPath) -> PathBuf {
        let root = match path.root {
            RootKind::Repo => &self.repo_root,
            RootKind::Stdlib => &self.stdlib_root,
            RootKind::Scratch => &self.scratch_root,
        };
        root.join(&path.rel)
    }
}
