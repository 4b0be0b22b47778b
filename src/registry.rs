use crate::calendar::Calendar;
use crate::decode::RecordId;
use crate::wbs::Wbs;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Entities that are looked up by their XER key column.
pub trait Keyed {
    fn key(&self) -> Option<RecordId>;
}

/// Id-keyed lookup table for one entity kind.
///
/// Entries are shared as `Arc`s so a task keeps the entity it resolved even
/// if the registry is changed or dropped afterwards.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: HashMap<RecordId, Arc<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T: Keyed> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `entity` under its key, replacing any entry with the same id.
    /// Returns `false` (and drops the entity) when it has no id.
    pub fn insert(&mut self, entity: T) -> bool {
        match entity.key() {
            Some(id) => {
                self.entries.insert(id, Arc::new(entity));
                true
            }
            None => false,
        }
    }

    /// Resolves a possibly-null reference. A null id is passed through as
    /// `None` without a lookup.
    pub fn find_by_id(&self, id: Option<RecordId>) -> Option<Arc<T>> {
        id.and_then(|id| self.entries.get(&id).cloned())
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.entries.get(&id).map(Arc::as_ref)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values().map(Arc::as_ref)
    }
}

impl<T: Keyed> Extend<T> for Registry<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for entity in iter {
            self.insert(entity);
        }
    }
}

impl<T: Keyed> FromIterator<T> for Registry<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

pub type CalendarRegistry = Registry<Calendar>;
pub type WbsRegistry = Registry<Wbs>;

impl WbsRegistry {
    /// Parent chain of `wbs_id`, nearest first, excluding the node itself.
    /// Stops at a missing parent or when a node repeats.
    pub fn ancestors(&self, wbs_id: RecordId) -> Vec<Arc<Wbs>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([wbs_id]);
        let mut current = self.entries.get(&wbs_id).and_then(|node| node.parent_wbs_id);

        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                break;
            }
            let Some(parent) = self.entries.get(&parent_id) else {
                break;
            };
            chain.push(Arc::clone(parent));
            current = parent.parent_wbs_id;
        }
        chain
    }
}

/// The lookups a task needs while it is being built.
///
/// Populate both registries before building any task: references are
/// resolved once, at construction, against whatever is registered then.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub calendars: CalendarRegistry,
    pub wbs: WbsRegistry,
}

impl Registries {
    pub fn new(calendars: CalendarRegistry, wbs: WbsRegistry) -> Self {
        Self { calendars, wbs }
    }
}
