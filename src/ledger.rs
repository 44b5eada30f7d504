//! The occupancy ledger: the single source of truth for what is where.

use std::collections::HashMap;

use log::{debug, error};

use crate::{Error, TablePos, TemplateItem};

/// One placed occurrence of a template on the table.
///
/// Created whole on a successful drop and only ever shrunk cell-by-cell (via
/// connectivity-checked removals) or destroyed whole via its anchor. There is
/// no in-place move; remove and re-place instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedInstance {
    /// Absolute table cell of the anchor item.
    pub anchor: TablePos,
    /// Absolute table cells of every remaining item, in template order.
    pub cells: Vec<TablePos>,
    /// Sterilized name of the originating template.
    pub template: String,
}

/// Records which table cells are occupied, by which item, and which cells
/// belong together as one instance.
///
/// The ledger never touches rendering or hardware; the frame synchronizer
/// reacts to it instead. Invariant: a cell appears in at most one instance,
/// so the recorded coordinate-sets are pairwise disjoint.
#[derive(Debug, Default)]
pub struct OccupancyLedger {
    occupants: HashMap<TablePos, TemplateItem>,
    instances: Vec<PlacedInstance>,
}

impl OccupancyLedger {
    pub fn new() -> OccupancyLedger {
        OccupancyLedger::default()
    }

    pub fn is_occupied(&self, pos: TablePos) -> bool {
        self.occupants.contains_key(&pos)
    }

    pub fn occupant_at(&self, pos: TablePos) -> Option<&TemplateItem> {
        self.occupants.get(&pos)
    }

    /// The instance one of whose cells is `pos`, if any.
    pub fn instance_at(&self, pos: TablePos) -> Option<&PlacedInstance> {
        self.instances
            .iter()
            .find(|instance| instance.cells.contains(&pos))
    }

    /// Records a validated placement as one instance.
    ///
    /// Callers are expected to have gone through the placement validator
    /// first; the occupancy re-check here is defensive. Tripping it means a
    /// caller mutated between validate and record, which is a logic bug.
    pub fn record(
        &mut self,
        anchor: TablePos,
        cells: Vec<(TablePos, TemplateItem)>,
        template: &str,
    ) -> Result<(), Error> {
        for (pos, _) in &cells {
            if self.is_occupied(*pos) {
                error!(
                    "occupancy conflict at ({}, {}) while recording {:?}",
                    pos.row, pos.col, template
                );
                return Err(Error::OccupancyConflict { pos: *pos });
            }
        }

        let mut layout = Vec::with_capacity(cells.len());
        for (pos, item) in cells {
            layout.push(pos);
            self.occupants.insert(pos, item);
        }

        debug!(
            "placed {:?} at ({}, {}) covering {} cells",
            template,
            anchor.row,
            anchor.col,
            layout.len()
        );
        self.instances.push(PlacedInstance {
            anchor,
            cells: layout,
            template: template.to_owned(),
        });
        Ok(())
    }

    /// Removes a single cell's occupant. When that was the instance's last
    /// cell, the instance bookkeeping goes with it.
    pub fn remove(&mut self, pos: TablePos) -> Option<TemplateItem> {
        let item = self.occupants.remove(&pos)?;

        if let Some(index) = self
            .instances
            .iter()
            .position(|instance| instance.cells.contains(&pos))
        {
            let instance = &mut self.instances[index];
            instance.cells.retain(|cell| *cell != pos);
            if instance.cells.is_empty() {
                debug!("instance of {:?} is now empty, dropping it", instance.template);
                self.instances.remove(index);
            }
        }

        Some(item)
    }

    /// Removes every cell of the instance anchored at `anchor`.
    pub fn remove_instance(&mut self, anchor: TablePos) -> Option<PlacedInstance> {
        let index = self
            .instances
            .iter()
            .position(|instance| instance.anchor == anchor)?;
        let instance = self.instances.remove(index);

        for cell in &instance.cells {
            self.occupants.remove(cell);
        }
        debug!(
            "removed instance of {:?} anchored at ({}, {})",
            instance.template, anchor.row, anchor.col
        );
        Some(instance)
    }

    /// Every occupied cell, in no particular order.
    pub fn all_occupied(&self) -> impl Iterator<Item = TablePos> + '_ {
        self.occupants.keys().copied()
    }

    /// Every occupied cell together with its occupant.
    pub fn occupants(&self) -> impl Iterator<Item = (TablePos, &TemplateItem)> {
        self.occupants.iter().map(|(pos, item)| (*pos, item))
    }

    pub fn instances(&self) -> &[PlacedInstance] {
        &self.instances
    }

    pub fn clear(&mut self) {
        self.occupants.clear();
        self.instances.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Button, Offset};
    use std::collections::HashSet;

    fn item(name: &str) -> TemplateItem {
        TemplateItem::Button(Button::new(name, name, Offset::ANCHOR))
    }

    fn record_pair(ledger: &mut OccupancyLedger, anchor: TablePos, second: TablePos, name: &str) {
        ledger
            .record(
                anchor,
                vec![(anchor, item(name)), (second, item(name))],
                name,
            )
            .unwrap();
    }

    #[test]
    fn record_and_query() {
        let mut ledger = OccupancyLedger::new();
        record_pair(&mut ledger, TablePos::new(3, 3), TablePos::new(4, 3), "a");

        assert!(ledger.is_occupied(TablePos::new(3, 3)));
        assert!(ledger.is_occupied(TablePos::new(4, 3)));
        assert!(!ledger.is_occupied(TablePos::new(3, 4)));
        assert_eq!(ledger.instance_at(TablePos::new(4, 3)).unwrap().anchor, TablePos::new(3, 3));
    }

    #[test]
    fn double_record_is_a_conflict() {
        let mut ledger = OccupancyLedger::new();
        record_pair(&mut ledger, TablePos::new(3, 3), TablePos::new(4, 3), "a");

        let err = ledger
            .record(
                TablePos::new(4, 3),
                vec![(TablePos::new(4, 3), item("b"))],
                "b",
            )
            .unwrap_err();
        assert!(matches!(err, Error::OccupancyConflict { .. }));
        assert!(!err.is_rejection());
        // the failed record must not have left partial state behind
        assert_eq!(ledger.instances().len(), 1);
    }

    #[test]
    fn instance_sets_stay_disjoint() {
        let mut ledger = OccupancyLedger::new();
        record_pair(&mut ledger, TablePos::new(1, 0), TablePos::new(2, 0), "a");
        record_pair(&mut ledger, TablePos::new(5, 5), TablePos::new(5, 6), "b");
        ledger.remove(TablePos::new(2, 0));
        record_pair(&mut ledger, TablePos::new(2, 0), TablePos::new(2, 1), "c");

        let mut seen = HashSet::new();
        for instance in ledger.instances() {
            for cell in &instance.cells {
                assert!(seen.insert(*cell), "cell {:?} appears in two instances", cell);
            }
        }
        assert_eq!(seen.len(), ledger.all_occupied().count());
    }

    #[test]
    fn removing_the_last_cell_drops_the_instance() {
        let mut ledger = OccupancyLedger::new();
        ledger
            .record(
                TablePos::new(2, 2),
                vec![(TablePos::new(2, 2), item("solo"))],
                "solo",
            )
            .unwrap();

        assert!(ledger.remove(TablePos::new(2, 2)).is_some());
        assert!(ledger.instances().is_empty());
        assert!(ledger.remove(TablePos::new(2, 2)).is_none());
    }

    #[test]
    fn remove_instance_clears_every_cell() {
        let mut ledger = OccupancyLedger::new();
        record_pair(&mut ledger, TablePos::new(3, 3), TablePos::new(4, 3), "a");

        let instance = ledger.remove_instance(TablePos::new(3, 3)).unwrap();
        assert_eq!(instance.cells.len(), 2);
        assert_eq!(ledger.all_occupied().count(), 0);
        assert!(ledger.remove_instance(TablePos::new(3, 3)).is_none());
    }
}
