//! Change ledger for one turn pass.
//!
//! Processing code marks entities as it mutates them; the persister reads the
//! ledger afterwards. Nothing is diffed retrospectively, so an entity that is
//! only read never ends up in a write set.

use std::collections::{BTreeMap, BTreeSet};

/// Kinds of records the pipeline can write back.
///
/// Queue kinds are keyed by the owner (general id or nation id) and mean
/// "replace that owner's queued commands".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    General,
    City,
    Nation,
    Troop,
    Diplomacy,
    GeneralQueue,
    NationQueue,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::General,
        EntityKind::City,
        EntityKind::Nation,
        EntityKind::Troop,
        EntityKind::Diplomacy,
        EntityKind::GeneralQueue,
        EntityKind::NationQueue,
    ];
}

type Ledger = BTreeMap<EntityKind, BTreeSet<i64>>;

/// Drained contents of a [`DirtyTracker`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyChanges {
    dirty: Ledger,
    created: Ledger,
    deleted: Ledger,
}

impl DirtyChanges {
    pub fn dirty_ids(&self, kind: EntityKind) -> BTreeSet<i64> {
        self.dirty.get(&kind).cloned().unwrap_or_default()
    }

    pub fn created_ids(&self, kind: EntityKind) -> BTreeSet<i64> {
        self.created.get(&kind).cloned().unwrap_or_default()
    }

    pub fn deleted_ids(&self, kind: EntityKind) -> BTreeSet<i64> {
        self.deleted.get(&kind).cloned().unwrap_or_default()
    }

    /// Ids to upsert: dirty or created, minus anything deleted this pass.
    pub fn upsert_ids(&self, kind: EntityKind) -> BTreeSet<i64> {
        let deleted = self.deleted_ids(kind);
        self.dirty_ids(kind)
            .into_iter()
            .chain(self.created_ids(kind))
            .filter(|id| !deleted.contains(id))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty() && self.created.is_empty() && self.deleted.is_empty()
    }
}

/// Per-pass set of touched entities. Created fresh for every pass and never
/// shared between worlds.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    changes: DirtyChanges,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mutation. Idempotent.
    pub fn mark_dirty(&mut self, kind: EntityKind, id: impl Into<i64>) {
        self.changes.dirty.entry(kind).or_default().insert(id.into());
    }

    pub fn mark_created(&mut self, kind: EntityKind, id: impl Into<i64>) {
        self.changes.created.entry(kind).or_default().insert(id.into());
    }

    pub fn mark_deleted(&mut self, kind: EntityKind, id: impl Into<i64>) {
        self.changes.deleted.entry(kind).or_default().insert(id.into());
    }

    pub fn dirty_ids(&self, kind: EntityKind) -> BTreeSet<i64> {
        self.changes.dirty_ids(kind)
    }

    pub fn created_ids(&self, kind: EntityKind) -> BTreeSet<i64> {
        self.changes.created_ids(kind)
    }

    pub fn deleted_ids(&self, kind: EntityKind) -> BTreeSet<i64> {
        self.changes.deleted_ids(kind)
    }

    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }

    /// Take every ledger, leaving the tracker clean.
    pub fn consume_all(&mut self) -> DirtyChanges {
        std::mem::take(&mut self.changes)
    }
}
