//! Pre-mutation checks: is a drop legal, is a removal safe.

use std::collections::{HashSet, VecDeque};

use crate::{Error, OccupancyLedger, TablePos, Template};

/// Decides whether dropping `template` with its anchor at `anchor` is legal,
/// and if so returns the resolved absolute cell for every item, in template
/// order.
///
/// Both call sites share this single implementation: the hover path (run on
/// every drag-move to pick the accept/reject cursor, read-only) and the drop
/// path (authoritative, followed by [`OccupancyLedger::record`]). Rejections
/// are [`Error::OutOfBounds`] for anything that resolves outside the usable
/// 8x8 area (the automap border is permanently non-droppable) and
/// [`Error::CellOccupied`] for overlap with the ledger.
pub fn validate_placement(
    ledger: &OccupancyLedger,
    anchor: TablePos,
    template: &Template,
) -> Result<Vec<TablePos>, Error> {
    let mut resolved = Vec::with_capacity(template.items.len());

    for item in &template.items {
        let pos = anchor + item.location();
        if !pos.is_usable() {
            return Err(Error::OutOfBounds { pos });
        }
        if ledger.is_occupied(pos) {
            return Err(Error::CellOccupied { pos });
        }
        resolved.push(pos);
    }

    Ok(resolved)
}

/// Whether removing `removed` from an instance would leave some remaining
/// cell unreachable from `anchor`.
///
/// Cells are adjacent iff they differ by exactly one orthogonal step and both
/// stay in the instance. Removing the anchor itself is not this function's
/// business: that always removes the whole instance (see
/// [`OccupancyLedger::remove_instance`]).
pub fn would_disconnect(cells: &[TablePos], anchor: TablePos, removed: TablePos) -> bool {
    let remaining: HashSet<TablePos> = cells
        .iter()
        .copied()
        .filter(|cell| *cell != removed)
        .collect();
    // a lone anchor (or nothing at all) has nothing left to orphan
    if remaining.len() <= 1 {
        return false;
    }

    let mut reached = HashSet::with_capacity(remaining.len());
    let mut queue = VecDeque::new();
    reached.insert(anchor);
    queue.push_back(anchor);

    while let Some(pos) = queue.pop_front() {
        for neighbor in pos.neighbors_4().iter() {
            if remaining.contains(neighbor) && reached.insert(*neighbor) {
                queue.push_back(*neighbor);
            }
        }
    }

    remaining.iter().any(|cell| !reached.contains(cell))
}
