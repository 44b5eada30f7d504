//! The collaborator seams: pad hardware and keyboard emission.
//!
//! Run mode only ever talks to these traits, so it can be driven by the real
//! midir-backed [`Launchpad`](crate::Launchpad), by the in-memory mocks in
//! this module, or by anything else that can show a frame and report button
//! transitions.

use std::collections::VecDeque;

use crate::{Frame, HwPos, MidiError};

/// A press/release somewhere on the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PadEvent {
    /// A pad of the main 8x8 grid.
    Pad { pos: HwPos, pressed: bool },
    /// A scene-launch or automap button; `index` follows the frame's automap
    /// order (scene column first, then the top row).
    Automap { index: u8, pressed: bool },
}

/// The grid hardware, reduced to what run mode needs: show a frame, report
/// button transitions, go dark.
pub trait PadDevice {
    /// Pushes a full frame to the device.
    fn send_frame(&mut self, frame: &Frame) -> Result<(), MidiError>;

    /// Returns one pending button transition, or `None` if there is nothing
    /// to report right now. Never blocks.
    fn poll_event(&mut self) -> Option<PadEvent>;

    /// Turns every LED off, leaving the device in a clean state.
    fn reset(&mut self) -> Result<(), MidiError>;
}

/// Emits keyboard shortcuts on behalf of pressed pads. Combo strings are
/// passed through uninterpreted, e.g. `"ctrl+shift+s"`.
pub trait KeyEmitter {
    fn press(&mut self, combo: &str);
    fn release(&mut self, combo: &str);
}

/// In-memory pad device for tests and headless use. Frames pile up in
/// `sent`, events are fed in through [`MockPad::push_event`].
#[derive(Debug, Default)]
pub struct MockPad {
    pub sent: Vec<Frame>,
    pub queued: VecDeque<PadEvent>,
    pub resets: usize,
}

impl MockPad {
    pub fn new() -> MockPad {
        MockPad::default()
    }

    pub fn push_event(&mut self, event: PadEvent) {
        self.queued.push_back(event);
    }
}

impl PadDevice for MockPad {
    fn send_frame(&mut self, frame: &Frame) -> Result<(), MidiError> {
        self.sent.push(frame.clone());
        Ok(())
    }

    fn poll_event(&mut self) -> Option<PadEvent> {
        self.queued.pop_front()
    }

    fn reset(&mut self) -> Result<(), MidiError> {
        self.resets += 1;
        Ok(())
    }
}

/// Records every emitted combo as `(combo, pressed)` instead of touching the
/// OS keyboard.
#[derive(Debug, Default)]
pub struct MockKeys {
    pub log: Vec<(String, bool)>,
}

impl MockKeys {
    pub fn new() -> MockKeys {
        MockKeys::default()
    }
}

impl KeyEmitter for MockKeys {
    fn press(&mut self, combo: &str) {
        self.log.push((combo.to_owned(), true));
    }

    fn release(&mut self, combo: &str) {
        self.log.push((combo.to_owned(), false));
    }
}
