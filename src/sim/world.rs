/// World: the entity arena and the position index.
///
/// ## Ownership
///
///   - `entities`: every live entity, keyed by a stable `EntityId`.
///   - `index`:    `Coord -> EntityId`, at most one entity per cell.
///
/// The two are only changed together, through `spawn()`, `relocate()` and
/// `remove()`. Removing an entity drops its index binding in the same call,
/// so a lookup never resolves to a dead entity.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::domain::coord::Coord;
use crate::domain::entity::{Entity, EntityId, EntityKind};
use crate::domain::rules::PlayField;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cell {at} is already held by {by:?}")]
pub struct CellOccupied {
    pub at: Coord,
    pub by: EntityKind,
}

pub struct World {
    pub field: PlayField,
    entities: BTreeMap<EntityId, Entity>,
    index: HashMap<Coord, EntityId>,
    next_id: u32,
}

impl World {
    pub fn new(field: PlayField) -> Self {
        World {
            field,
            entities: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 0,
        }
    }

    /// Create an entity and bind it at `pos`.
    pub fn spawn(&mut self, kind: EntityKind, pos: Coord) -> Result<EntityId, CellOccupied> {
        if let Some(other) = self.occupant(pos) {
            return Err(CellOccupied { at: pos, by: other.kind });
        }
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Entity { id, kind, pos });
        self.index.insert(pos, id);
        Ok(id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Entity bound at `pos`, if any.
    pub fn occupant(&self, pos: Coord) -> Option<&Entity> {
        self.index.get(&pos).and_then(|id| self.entities.get(id))
    }

    /// Move an entity's binding to `to`. The caller has cleared `to`.
    pub(super) fn relocate(&mut self, id: EntityId, to: Coord) {
        let Some(entity) = self.entities.get_mut(&id) else { return };
        let from = entity.pos;
        entity.pos = to;
        if self.index.get(&from) == Some(&id) {
            self.index.remove(&from);
        }
        self.index.insert(to, id);
    }

    /// Destroy an entity and every index entry pointing at it.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        if self.index.get(&entity.pos) == Some(&id) {
            self.index.remove(&entity.pos);
        } else {
            self.index.retain(|_, v| *v != id);
        }
        Some(entity)
    }

    /// Live entities in creation order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.values().filter(|e| e.kind == kind).count()
    }

    /// Index bindings sorted by coordinate (for debug dumps).
    pub fn bindings(&self) -> Vec<(Coord, EntityKind)> {
        let mut out: Vec<_> = self
            .index
            .iter()
            .filter_map(|(c, id)| self.entities.get(id).map(|e| (*c, e.kind)))
            .collect();
        out.sort_by_key(|(c, _)| (c.y, c.x));
        out
    }

    /// Does the index hold exactly one correct binding per live entity?
    pub fn index_consistent(&self) -> bool {
        self.index.len() == self.entities.len()
            && self
                .entities
                .values()
                .all(|e| self.index.get(&e.pos) == Some(&e.id))
    }
}
