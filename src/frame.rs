//! LED frame state and the press/release synchronizer.

use std::collections::HashSet;

use log::debug;

use crate::{Color, HwPos, OccupancyLedger, TablePos, TemplateItem};

/// Number of pads in the main grid.
pub const GRID_LEDS: usize = 64;
/// Number of border LEDs: 8 scene-launch plus 8 automap.
pub const AUTOMAP_LEDS: usize = 16;

/// Everything the hardware should currently display.
///
/// `grid` is row-major over the 8x8 pad area. `automap` follows the
/// original Launchpad's rapid-update order: the eight scene-launch LEDs of
/// the right column top-to-bottom, then the eight automap LEDs of the top row
/// left-to-right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub grid: [Color; GRID_LEDS],
    pub automap: [Color; AUTOMAP_LEDS],
}

impl Frame {
    /// A frame with every LED off.
    pub fn blank() -> Frame {
        Frame {
            grid: [Color::BLACK; GRID_LEDS],
            automap: [Color::BLACK; AUTOMAP_LEDS],
        }
    }

    pub fn get(&self, pos: HwPos) -> Color {
        self.grid[pos.frame_index()]
    }

    pub fn set(&mut self, pos: HwPos, color: Color) {
        self.grid[pos.frame_index()] = color;
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::blank()
    }
}

/// Keeps the desired LED frame in step with the ledger and the currently
/// pressed pads, and decides when a hardware write is actually needed.
#[derive(Debug, Default)]
pub struct FrameSync {
    /// What should be lit right now.
    frame: Frame,
    /// The last frame handed out for sending; writes are gated on a diff
    /// against this so every poll tick doesn't hit the wire.
    sent: Frame,
    pressed: HashSet<TablePos>,
}

impl FrameSync {
    pub fn new() -> FrameSync {
        FrameSync::default()
    }

    /// The desired frame as of the last recompute/press/release.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Table cells whose pads are currently held down.
    pub fn pressed(&self) -> impl Iterator<Item = TablePos> + '_ {
        self.pressed.iter().copied()
    }

    /// Rebuilds the full frame from the ledger: every occupied usable cell
    /// shows its occupant's resting color, everything else is off. Any
    /// pressed-state overlay is discarded.
    pub fn recompute(&mut self, ledger: &OccupancyLedger) {
        let mut frame = Frame::blank();
        for (pos, item) in ledger.occupants() {
            // border cells never reach the ledger, but a resolved position is
            // required to index the frame anyway
            if let Some(hw) = pos.to_hardware() {
                frame.set(hw, item.normal_color());
            }
        }
        self.pressed.clear();
        self.frame = frame;
    }

    /// Flips the pad at `hw` to its occupant's pushed color and returns the
    /// occupant, so the caller can fire the bound shortcut.
    ///
    /// Returns `None` for unoccupied pads and for pads that are already down
    /// (re-pressing is a no-op, so shortcuts never double-fire).
    pub fn on_press<'a>(
        &mut self,
        ledger: &'a OccupancyLedger,
        hw: HwPos,
    ) -> Option<&'a TemplateItem> {
        let pos = hw.to_table();
        let item = ledger.occupant_at(pos)?;
        if !self.pressed.insert(pos) {
            return None;
        }
        self.frame.set(hw, item.pushed_color());
        Some(item)
    }

    /// Restores the pad at `hw` to its occupant's resting color and returns
    /// the occupant. `None` if the pad wasn't recorded as pressed.
    pub fn on_release<'a>(
        &mut self,
        ledger: &'a OccupancyLedger,
        hw: HwPos,
    ) -> Option<&'a TemplateItem> {
        let pos = hw.to_table();
        if !self.pressed.remove(&pos) {
            return None;
        }
        match ledger.occupant_at(pos) {
            Some(item) => {
                self.frame.set(hw, item.normal_color());
                Some(item)
            }
            // occupant vanished mid-press (cell removed); just blank the pad
            None => {
                self.frame.set(hw, Color::BLACK);
                None
            }
        }
    }

    /// Returns the desired frame iff it differs from the last one handed
    /// out, and records it as sent. This is what keeps the poll loop from
    /// re-sending an unchanged frame every tick.
    pub fn flush_frame(&mut self) -> Option<&Frame> {
        if self.frame == self.sent {
            return None;
        }
        debug!("frame changed since last send");
        self.sent = self.frame.clone();
        Some(&self.frame)
    }

    /// Forgets all frame state, e.g. after the device has been reset to
    /// all-off externally.
    pub fn reset(&mut self) {
        self.frame = Frame::blank();
        self.sent = Frame::blank();
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Button, Led, Offset};

    fn ledger_with_button_at(pos: TablePos) -> OccupancyLedger {
        let mut button = Button::new("pad", "pad", Offset::ANCHOR);
        button.normal_color = Color::new(Led::Full, Led::Off);
        button.pushed_color = Color::new(Led::Off, Led::Full);
        let mut ledger = OccupancyLedger::new();
        ledger
            .record(pos, vec![(pos, TemplateItem::Button(button))], "pad")
            .unwrap();
        ledger
    }

    #[test]
    fn recompute_lights_occupied_cells_only() {
        let ledger = ledger_with_button_at(TablePos::new(2, 2));
        let mut sync = FrameSync::new();
        sync.recompute(&ledger);

        let hw = TablePos::new(2, 2).to_hardware().unwrap();
        assert_eq!(sync.frame().get(hw), Color::new(Led::Full, Led::Off));
        assert_eq!(sync.frame().get(HwPos::new(0, 0)), Color::BLACK);
    }

    #[test]
    fn press_and_release_restore_colors() {
        let ledger = ledger_with_button_at(TablePos::new(2, 2));
        let mut sync = FrameSync::new();
        sync.recompute(&ledger);
        // recompute counts as the initial send
        assert!(sync.flush_frame().is_some());

        let hw = TablePos::new(2, 2).to_hardware().unwrap();

        assert!(sync.on_press(&ledger, hw).is_some());
        assert_eq!(sync.frame().get(hw), Color::new(Led::Off, Led::Full));
        assert!(sync.flush_frame().is_some());

        assert!(sync.on_release(&ledger, hw).is_some());
        assert_eq!(sync.frame().get(hw), Color::new(Led::Full, Led::Off));
        assert!(sync.flush_frame().is_some());

        // nothing changed since: no emission
        assert!(sync.flush_frame().is_none());
    }

    #[test]
    fn repress_and_stray_release_are_no_ops() {
        let ledger = ledger_with_button_at(TablePos::new(2, 2));
        let mut sync = FrameSync::new();
        sync.recompute(&ledger);

        let hw = TablePos::new(2, 2).to_hardware().unwrap();
        assert!(sync.on_press(&ledger, hw).is_some());
        assert!(sync.on_press(&ledger, hw).is_none());

        // releasing a pad that was never pressed
        assert!(sync.on_release(&ledger, HwPos::new(5, 5)).is_none());

        assert!(sync.on_release(&ledger, hw).is_some());
        assert!(sync.on_release(&ledger, hw).is_none());
    }

    #[test]
    fn pressing_an_empty_pad_does_nothing() {
        let ledger = OccupancyLedger::new();
        let mut sync = FrameSync::new();
        sync.recompute(&ledger);
        assert!(sync.flush_frame().is_none()); // blank == blank

        assert!(sync.on_press(&ledger, HwPos::new(3, 3)).is_none());
        assert!(sync.flush_frame().is_none());
    }
}
