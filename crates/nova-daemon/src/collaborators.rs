//! Traits standing in for the daemon's external collaborators: the
//! saved-state loader, the stdlib-stub materializer, and the symbol-index
//! environment. The core only needs their contracts, not their
//! implementations — production backs these with real I/O and a real
//! ranking index; tests back them with in-memory fakes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nova_core::{FileInfo, RepoPath};
use nova_naming::NameDelta;

/// The on-disk saved-state blob loader.
pub trait SavedStateLoader: Send {
    /// Load either the blob at `saved_state_path` (if given) or discover one
    /// on its own. Returns the forward index it encodes plus the paths that
    /// changed on disk since the blob was produced.
    ///
    /// When `saved_state_path` is supplied, the caller is asserting there are
    /// no changed files since that blob was produced, so
    /// implementations backing a supplied path should return an empty
    /// changed-files list.
    fn load(&mut self, saved_state_path: Option<&Path>) -> anyhow::Result<SavedState>;
}

/// What a [`SavedStateLoader`] produces.
pub struct SavedState {
    pub files: HashMap<RepoPath, FileInfo>,
    pub changed_files: Vec<RepoPath>,
}

/// Materializes the standard-library stub files into a scratch directory
///.
pub trait StdlibMaterializer: Send {
    /// Create a fresh directory (any path is acceptable) containing the
    /// stub files, and return its path.
    fn materialize(&mut self) -> anyhow::Result<PathBuf>;

    /// Remove a previously materialized directory.
    fn cleanup(&mut self, dir: &Path) -> anyhow::Result<()>;
}

/// The opaque autocomplete ranking / symbol index service.
pub trait SymbolIndexEnv: Send {
    fn apply_delta(&mut self, path: &RepoPath, delta: &NameDelta);
}

/// A `SymbolIndexEnv` that does nothing, for configurations that disable
/// ranked autocomplete (`use_ranked_autocomplete = false`).
#[derive(Debug, Default)]
pub struct NoopSymbolIndexEnv;

impl SymbolIndexEnv for NoopSymbolIndexEnv {
    fn apply_delta(&mut self, _path: &RepoPath, _delta: &NameDelta) {}
}

/// A `StdlibMaterializer` that creates an empty directory under a given
/// scratch root, for configurations / tests with no real stub corpus.
pub struct EmptyDirMaterializer {
    scratch_root: PathBuf,
    counter: u64,
}

impl EmptyDirMaterializer {
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self { scratch_root: scratch_root.into(), counter: 0 }
    }
}

impl StdlibMaterializer for EmptyDirMaterializer {
    fn materialize(&mut self) -> anyhow::Result<PathBuf> {
        self.counter += 1;
        let dir = self.scratch_root.join(format!("stdlib-{}", self.counter));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn cleanup(&mut self, dir: &Path) -> anyhow::Result<()> {
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}

/// A `SavedStateLoader` backed by an in-memory map, for tests that construct
/// saved state programmatically instead of reading a real blob from disk.
pub struct InMemorySavedStateLoader {
    pub files: Arc<HashMap<RepoPath, FileInfo>>,
    pub changed_files: Vec<RepoPath>,
}

impl SavedStateLoader for InMemorySavedStateLoader {
    fn load(&mut self, saved_state_path: Option<&Path>) -> anyhow::Result<SavedState> {
        let changed_files = if saved_state_path.is_some() {
            Vec::new()
        } else {
            self.changed_files.clone()
        };
        Ok(SavedState {
            files: (*self.files).clone(),
            changed_files,
        })
    }
}
