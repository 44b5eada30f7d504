//! Run mode: the polling loop that ties a session to the hardware and the
//! keyboard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info};

use crate::{KeyEmitter, MidiError, PadDevice, PadEvent, Session, TemplateItem};

/// How often run mode polls the device for button transitions.
pub const POLL_INTERVAL: Duration = Duration::from_millis(30);

/// Drives one [`Session`] against a pad device and a key emitter.
///
/// Everything runs on the caller's thread: [`Controller::tick`] drains the
/// pending button transitions, fires or releases the bound shortcuts, and
/// repaints the device only when the frame actually changed.
pub struct Controller<D: PadDevice, K: KeyEmitter> {
    device: D,
    keys: K,
    /// Combos currently held down, so stopping can release them all.
    held: Vec<String>,
}

impl<D: PadDevice, K: KeyEmitter> Controller<D, K> {
    pub fn new(device: D, keys: K) -> Controller<D, K> {
        Controller { device, keys, held: Vec::new() }
    }

    /// Enters run mode: repaints the frame from the ledger and pushes it to
    /// the device.
    pub fn start(&mut self, session: &mut Session) -> Result<(), MidiError> {
        info!("entering run mode");
        session.recompute_frame();
        self.flush(session)
    }

    /// One poll step: handle all pending transitions, then repaint if needed.
    pub fn tick(&mut self, session: &mut Session) -> Result<(), MidiError> {
        while let Some(event) = self.device.poll_event() {
            match event {
                PadEvent::Pad { pos, pressed: true } => {
                    if let Some(item) = session.press(pos) {
                        let combo = match item {
                            TemplateItem::Button(button) => button.keyboard_combo.clone(),
                        };
                        if !combo.is_empty() {
                            debug!("pad ({}, {}) down, pressing {:?}", pos.x, pos.y, combo);
                            self.keys.press(&combo);
                            self.held.push(combo);
                        }
                    }
                }
                PadEvent::Pad { pos, pressed: false } => {
                    if let Some(item) = session.release(pos) {
                        let combo = match item {
                            TemplateItem::Button(button) => button.keyboard_combo.clone(),
                        };
                        if !combo.is_empty() {
                            debug!("pad ({}, {}) up, releasing {:?}", pos.x, pos.y, combo);
                            self.keys.release(&combo);
                            // two pads may bind the same combo; only this
                            // pad's hold ends
                            if let Some(index) = self.held.iter().position(|held| *held == combo) {
                                self.held.swap_remove(index);
                            }
                        }
                    }
                }
                PadEvent::Automap { index, .. } => {
                    debug!("automap button {} ignored", index);
                }
            }
        }

        self.flush(session)
    }

    /// Polls at [`POLL_INTERVAL`] until `stop` is raised, then leaves the
    /// device clean. After this returns no further press/release processing
    /// happens.
    pub fn run(&mut self, session: &mut Session, stop: &AtomicBool) -> Result<(), MidiError> {
        self.start(session)?;
        while !stop.load(Ordering::Relaxed) {
            self.tick(session)?;
            std::thread::sleep(POLL_INTERVAL);
        }
        self.stop(session)
    }

    /// Leaves run mode: releases every combo still held and turns all LEDs
    /// off so the hardware isn't left showing a dead frame.
    pub fn stop(&mut self, session: &mut Session) -> Result<(), MidiError> {
        info!("leaving run mode");
        for combo in self.held.drain(..) {
            self.keys.release(&combo);
        }
        session.reset_frames();
        self.device.reset()
    }

    fn flush(&mut self, session: &mut Session) -> Result<(), MidiError> {
        if let Some(frame) = session.flush_frame() {
            self.device.send_frame(frame)?;
        }
        Ok(())
    }

    /// Mutable access to the device and emitter, e.g. to feed events into a
    /// mock between ticks.
    pub fn parts_mut(&mut self) -> (&mut D, &mut K) {
        (&mut self.device, &mut self.keys)
    }

    /// Gives the device and emitter back, e.g. to inspect a mock after a
    /// test run.
    pub fn into_parts(self) -> (D, K) {
        (self.device, self.keys)
    }
}
