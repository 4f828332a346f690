//! The read view through which a query sees the world.

use nova_core::Backend;
use nova_vfs::EntryTable;

/// Options fixed for the lifetime of a `Context`. `shallow_class_decl_mode`
/// must be enabled — it is not exposed as a toggle because the core's
/// invalidation rules assume it.
#[derive(Debug, Clone, Copy)]
pub struct ProgramOptions {
    pub use_ranked_autocomplete: bool,
}

/// A cheap-to-derive read view: the backend plus the entry table. Mutating a
/// `Context` means producing a new one; in practice this crate mutates
/// the entry table in place and treats that as "producing a new Context"
/// since nothing outside holds a stale `Context` across a mutation (the
/// daemon loop is single-threaded and does not hand Contexts across turns).
pub struct Context<B: Backend> {
    pub backend: B,
    pub options: ProgramOptions,
    pub entries: EntryTable<B>,
}

impl<B: Backend> Context<B> {
    pub fn new(backend: B, options: ProgramOptions) -> Self {
        Self {
            backend,
            options,
            entries: EntryTable::new(),
        }
    }
}
