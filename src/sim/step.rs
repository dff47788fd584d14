/// Movement resolution: one directional step for one entity.
///
/// Processing order:
///   1. Candidate = current + direction
///   2. Bounds check against the play field (not the map's own size)
///   3. Occupancy check through the position index + contact rules
///      - empty    → accept
///      - blocking → reject, nothing changes
///      - pickup   → remove the pickup, accept
///   4. Rebind the mover at the candidate cell
///
/// The caller applies the pickup's effect from the returned `Step`.

use thiserror::Error;

use crate::domain::coord::{Coord, Direction};
use crate::domain::entity::{EntityId, EntityKind};
use crate::domain::rules::{self, Contact, Pickup};
use super::world::World;

/// An accepted step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Step {
    pub from: Coord,
    pub to: Coord,
    /// Pickup consumed at `to`, already removed from the world.
    pub pickup: Option<Pickup>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejected {
    #[error("entity {0:?} is not alive")]
    UnknownEntity(EntityId),
    #[error("{target} is outside the play field")]
    OutOfBounds { target: Coord },
    #[error("{target} is blocked by {by:?}")]
    Blocked { target: Coord, by: EntityKind },
}

pub fn attempt_move(world: &mut World, id: EntityId, dir: Direction) -> Result<Step, MoveRejected> {
    let from = world.get(id).ok_or(MoveRejected::UnknownEntity(id))?.pos;
    let target = from + dir;

    if !world.field.contains(target) {
        return Err(MoveRejected::OutOfBounds { target });
    }

    let mut pickup = None;
    if let Some(occupant) = world.occupant(target) {
        let (other, kind) = (occupant.id, occupant.kind);
        match rules::on_contact(kind) {
            Contact::Blocked => return Err(MoveRejected::Blocked { target, by: kind }),
            Contact::Pickup(p) => {
                world.remove(other);
                pickup = Some(p);
            }
        }
    }

    world.relocate(id, target);
    Ok(Step { from, to: target, pickup })
}
