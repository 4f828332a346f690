//! Dense, process-lifetime identifiers.
//!
//! Every open buffer gets a small dense id rather than being keyed directly
//! by `RepoPath` everywhere: it keeps cache maps cheap to hash and index.

/// Identifies a single editor-held buffer ([`Entry`](../nova_vfs/struct.Entry.html))
/// for the lifetime of that buffer. Never reused: a file closed and reopened
/// gets a fresh `EntryId`, so stale references into per-entry caches fail
/// closed rather than aliasing a different buffer's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u32);

impl EntryId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }
}

/// Allocates fresh, never-reused [`EntryId`]s.
#[derive(Debug, Default)]
pub struct EntryIdAllocator {
    next: u32,
}

impl EntryIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> EntryId {
        let id = EntryId(self.next);
        self.next = self
            .next
            .checked_add(1)
            .expect("EntryIdAllocator exhausted: too many entries opened this process");
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_ids_are_never_reused() {
        let mut alloc = EntryIdAllocator::new();
        let a = alloc.alloc();
        let b = alloc.alloc();
        assert_ne!(a, b);
    }
}
