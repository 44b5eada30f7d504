//! The editor session: registry, ledger and frame state behind one mutation
//! entry point.

use log::debug;

use crate::placement::{validate_placement, would_disconnect};
use crate::{
    Error, Frame, FrameSync, HwPos, OccupancyLedger, TablePos, TemplateItem, TemplateRegistry,
    sterilize_name,
};

/// A mutation of the grid.
///
/// All mutations go through [`Session::apply`], which runs synchronously and
/// never yields, so validate → record → recompute is one atomic step that the
/// poll loop can't observe half-done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drop the named template with its anchor at `anchor`.
    Place { template: String, anchor: TablePos },
    /// Remove a single cell. Rejected with [`Error::WouldOrphan`] if that
    /// would disconnect part of its instance from the anchor; removing the
    /// anchor cell removes the whole instance instead.
    RemoveCell { pos: TablePos },
    /// Remove the whole instance anchored at `anchor`.
    RemoveInstance { anchor: TablePos },
    /// Remove everything from the grid.
    Clear,
}

/// One open editor session: the loaded templates, what is placed where, and
/// the LED frame derived from it.
///
/// Owned by a single UI/poll context; nothing here suspends or locks.
#[derive(Debug, Default)]
pub struct Session {
    registry: TemplateRegistry,
    ledger: OccupancyLedger,
    sync: FrameSync,
}

impl Session {
    pub fn new(registry: TemplateRegistry) -> Session {
        Session {
            registry,
            ledger: OccupancyLedger::new(),
            sync: FrameSync::new(),
        }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.registry
    }

    pub fn ledger(&self) -> &OccupancyLedger {
        &self.ledger
    }

    /// Read-only drop check for drag-hover feedback. Exactly the validation
    /// that [`Command::Place`] will run at drop time, so the accept/reject
    /// cursor can never disagree with the drop itself.
    pub fn check_drop(&self, template: &str, anchor: TablePos) -> Result<Vec<TablePos>, Error> {
        let template = self
            .registry
            .get(template)
            .ok_or_else(|| Error::UnknownTemplate {
                name: template.to_owned(),
            })?;
        validate_placement(&self.ledger, anchor, template)
    }

    /// Applies one command. On success the frame has already been recomputed
    /// from the updated ledger.
    pub fn apply(&mut self, command: Command) -> Result<(), Error> {
        match command {
            Command::Place { template, anchor } => {
                let key = sterilize_name(&template);
                let definition =
                    self.registry
                        .get(&key)
                        .ok_or_else(|| Error::UnknownTemplate {
                            name: template.clone(),
                        })?;

                let cells = validate_placement(&self.ledger, anchor, definition)?;
                let pairs = cells
                    .iter()
                    .zip(&definition.items)
                    .map(|(pos, item)| (*pos, item.clone()))
                    .collect();
                self.ledger.record(anchor, pairs, &key)?;
            }
            Command::RemoveCell { pos } => {
                let instance = match self.ledger.instance_at(pos) {
                    Some(instance) => instance,
                    None => {
                        debug!("remove of empty cell ({}, {}) ignored", pos.row, pos.col);
                        return Ok(());
                    }
                };

                if instance.anchor == pos {
                    // taking out the anchor always takes the whole instance
                    self.ledger.remove_instance(pos);
                } else {
                    if would_disconnect(&instance.cells, instance.anchor, pos) {
                        return Err(Error::WouldOrphan { pos });
                    }
                    self.ledger.remove(pos);
                }
            }
            Command::RemoveInstance { anchor } => {
                if self.ledger.remove_instance(anchor).is_none() {
                    debug!(
                        "no instance anchored at ({}, {}), nothing removed",
                        anchor.row, anchor.col
                    );
                    return Ok(());
                }
            }
            Command::Clear => self.ledger.clear(),
        }

        self.sync.recompute(&self.ledger);
        Ok(())
    }

    // --- run-mode entry points, driven by the hardware poll loop ---

    /// Handles a pad going down; returns the occupant whose shortcut should
    /// be pressed, if any.
    pub fn press(&mut self, hw: HwPos) -> Option<&TemplateItem> {
        self.sync.on_press(&self.ledger, hw)
    }

    /// Handles a pad coming up; returns the occupant whose shortcut should be
    /// released, if any.
    pub fn release(&mut self, hw: HwPos) -> Option<&TemplateItem> {
        self.sync.on_release(&self.ledger, hw)
    }

    /// Rebuilds the frame from the ledger (used when entering run mode).
    pub fn recompute_frame(&mut self) {
        self.sync.recompute(&self.ledger);
    }

    /// The frame that should currently be displayed.
    pub fn frame(&self) -> &Frame {
        self.sync.frame()
    }

    /// The frame to send, iff it changed since the last send.
    pub fn flush_frame(&mut self) -> Option<&Frame> {
        self.sync.flush_frame()
    }

    /// Forgets frame state after the device has been reset to all-off.
    pub fn reset_frames(&mut self) {
        self.sync.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Button, Color, Led, Offset, Template, TemplateItem, TemplateKind};

    fn session_with_line_template() -> Session {
        // a 3-cell horizontal line: anchor, (0,1), (0,2)
        let items = vec![
            TemplateItem::Button(Button::new("a", "a", Offset::ANCHOR)),
            TemplateItem::Button(Button::new("b", "b", Offset::new(0, 1))),
            TemplateItem::Button(Button::new("c", "c", Offset::new(0, 2))),
        ];
        let template = Template::new("Line", TemplateKind::Buttons, items).unwrap();
        let mut registry = TemplateRegistry::new();
        registry.insert(template);
        Session::new(registry)
    }

    #[test]
    fn place_records_and_lights_cells() {
        let mut session = session_with_line_template();
        session
            .apply(Command::Place {
                template: "Line".to_owned(),
                anchor: TablePos::new(4, 4),
            })
            .unwrap();

        assert!(session.ledger().is_occupied(TablePos::new(4, 4)));
        assert!(session.ledger().is_occupied(TablePos::new(4, 6)));

        let hw = TablePos::new(4, 5).to_hardware().unwrap();
        assert_ne!(session.frame().get(hw), Color::BLACK);
    }

    #[test]
    fn hover_check_and_drop_agree() {
        let mut session = session_with_line_template();
        let anchor = TablePos::new(4, 4);

        assert!(session.check_drop("Line", anchor).is_ok());
        session
            .apply(Command::Place { template: "Line".to_owned(), anchor })
            .unwrap();

        // second drop on the same spot: hover says no, and so does the drop
        let hover = session.check_drop("Line", anchor);
        assert!(matches!(hover, Err(Error::CellOccupied { .. })));
        let drop = session.apply(Command::Place { template: "Line".to_owned(), anchor });
        assert!(matches!(drop, Err(Error::CellOccupied { .. })));
    }

    #[test]
    fn unknown_template_is_reported() {
        let mut session = session_with_line_template();
        let result = session.apply(Command::Place {
            template: "Nope".to_owned(),
            anchor: TablePos::new(1, 1),
        });
        assert!(matches!(result, Err(Error::UnknownTemplate { .. })));
    }

    #[test]
    fn orphaning_removal_is_rejected() {
        let mut session = session_with_line_template();
        session
            .apply(Command::Place {
                template: "Line".to_owned(),
                anchor: TablePos::new(4, 4),
            })
            .unwrap();

        // the middle cell would orphan the end cell
        let middle = session.apply(Command::RemoveCell { pos: TablePos::new(4, 5) });
        assert!(matches!(middle, Err(Error::WouldOrphan { .. })));
        assert!(session.ledger().is_occupied(TablePos::new(4, 5)));

        // the end cell is fine
        session
            .apply(Command::RemoveCell { pos: TablePos::new(4, 6) })
            .unwrap();
        assert!(!session.ledger().is_occupied(TablePos::new(4, 6)));
        let hw = TablePos::new(4, 6).to_hardware().unwrap();
        assert_eq!(session.frame().get(hw), Color::BLACK);
    }

    #[test]
    fn removing_the_anchor_removes_the_instance() {
        let mut session = session_with_line_template();
        session
            .apply(Command::Place {
                template: "Line".to_owned(),
                anchor: TablePos::new(4, 4),
            })
            .unwrap();

        session
            .apply(Command::RemoveCell { pos: TablePos::new(4, 4) })
            .unwrap();
        assert_eq!(session.ledger().all_occupied().count(), 0);
        assert_eq!(session.frame(), &Frame::blank());
    }

    #[test]
    fn press_release_round_trip_through_session() {
        let mut session = session_with_line_template();
        session
            .apply(Command::Place {
                template: "Line".to_owned(),
                anchor: TablePos::new(4, 4),
            })
            .unwrap();
        // placement counts as a frame change
        assert!(session.flush_frame().is_some());

        let hw = TablePos::new(4, 4).to_hardware().unwrap();
        let pushed = session.press(hw).unwrap().pushed_color();
        assert_eq!(pushed, Color::new(Led::Off, Led::Full));
        assert!(session.flush_frame().is_some());
        assert!(session.flush_frame().is_none());

        session.release(hw).unwrap();
        assert!(session.flush_frame().is_some());
    }
}
