//! midir-backed [`PadDevice`] for the original Launchpad / Launchpad S.

use std::sync::mpsc;

use log::debug;
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use crate::{Color, Frame, HwPos, MidiError, PadDevice, PadEvent};

const MIDI_DEVICE_KEYWORD: &str = "Launchpad";

fn guess_port<T: midir::MidiIO>(midi_io: &T, keyword: &str) -> Option<T::Port> {
    for port in midi_io.ports() {
        let name = crate::ok_or_continue!(midi_io.port_name(&port));

        if name.contains(keyword) {
            return Some(port);
        }
    }

    None
}

/// Decodes a raw Launchpad MIDI message into a [`PadEvent`].
///
/// The Launchpad sends no note-off messages; a zero-velocity note-on is a
/// release. Grid x 8 is the scene-launch column, and the top-row automap
/// buttons arrive as controller changes 104..=111.
fn decode_event(data: &[u8]) -> Option<PadEvent> {
    match data {
        &[0x90, button, velocity] => {
            let (x, y) = (button % 16, button / 16);
            let pressed = velocity != 0;
            if x < 8 {
                Some(PadEvent::Pad { pos: HwPos::new(x, y), pressed })
            } else {
                // x == 8 is the scene-launch column; higher x values don't
                // exist on the hardware
                Some(PadEvent::Automap { index: y, pressed })
            }
        }
        &[0xB0, number @ 104..=111, velocity] => Some(PadEvent::Automap {
            index: 8 + (number - 104),
            pressed: velocity != 0,
        }),
        _ => {
            debug!("ignoring midi message {:?}", data);
            None
        }
    }
}

// Bit 5..4 green brightness, bit 2 copy-to-both-buffers, bit 1..0 red
// brightness
fn color_code(color: Color) -> u8 {
    (color.green().code() << 4) | (0b01 << 2) | color.red().code()
}

/// A connected original Launchpad (or Launchpad S), found by MIDI port name.
///
/// Input arrives on a midir callback thread and is buffered into a channel;
/// [`PadDevice::poll_event`] drains it without blocking, which fits the
/// cooperative poll loop of run mode.
pub struct Launchpad {
    connection: MidiOutputConnection,
    // never read, but dropping it would close the input stream
    #[allow(dead_code)]
    input: MidiInputConnection<()>,
    receiver: mpsc::Receiver<PadEvent>,
}

impl Launchpad {
    /// Connects to the first MIDI input and output ports whose names contain
    /// `"Launchpad"`, resets the device and discards any stale button events
    /// that queued up while nothing was connected.
    pub fn guess() -> Result<Launchpad, MidiError> {
        let midi_output = MidiOutput::new(crate::APPLICATION_NAME)?;
        let out_port = guess_port(&midi_output, MIDI_DEVICE_KEYWORD)
            .ok_or(MidiError::NoPortFound { keyword: MIDI_DEVICE_KEYWORD })?;
        let connection = midi_output.connect(&out_port, "Padkey output")?;

        let midi_input = MidiInput::new(crate::APPLICATION_NAME)?;
        let in_port = guess_port(&midi_input, MIDI_DEVICE_KEYWORD)
            .ok_or(MidiError::NoPortFound { keyword: MIDI_DEVICE_KEYWORD })?;

        let (sender, receiver) = mpsc::channel();
        let input = midi_input.connect(
            &in_port,
            "Padkey input",
            move |_timestamp, data, _: &mut ()| {
                if let Some(event) = decode_event(data) {
                    // the receiver lives as long as the connection, so a send
                    // failure just means we're shutting down
                    let _ = sender.send(event);
                }
            },
            (),
        )?;

        let mut launchpad = Launchpad { connection, input, receiver };
        launchpad.reset()?;
        let stale = launchpad.drain();
        if stale > 0 {
            debug!("discarded {} stale button events", stale);
        }
        Ok(launchpad)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), MidiError> {
        self.connection.send(bytes)?;
        Ok(())
    }

    /// Discards all pending button events and returns how many there were.
    /// The Launchpad queues button input while disconnected and releases it
    /// all at once on connect; this gets rid of that burst.
    pub fn drain(&mut self) -> usize {
        self.receiver.try_iter().count()
    }
}

impl PadDevice for Launchpad {
    /// Repaints the whole device with the rapid LED update: each `0xB2`
    /// message carries two color codes, and the device walks the 8x8 grid
    /// left-to-right top-to-bottom, then the scene column, then the automap
    /// row. 40 messages cover all 80 LEDs; the trailing plain message resets
    /// the write cursor for the next repaint.
    fn send_frame(&mut self, frame: &Frame) -> Result<(), MidiError> {
        let mut codes = Vec::with_capacity(80);
        codes.extend(frame.grid.iter().map(|&color| color_code(color)));
        codes.extend(frame.automap.iter().map(|&color| color_code(color)));

        for pair in codes.chunks(2) {
            self.send(&[0xB2, pair[0], pair[1]])?;
        }
        self.send(&[0xB0, 0x01, 0x00])
    }

    fn poll_event(&mut self) -> Option<PadEvent> {
        self.receiver.try_recv().ok()
    }

    /// All LEDs off; also resets the device's mapping mode, buffer settings
    /// and duty cycle to their defaults.
    fn reset(&mut self) -> Result<(), MidiError> {
        self.send(&[0xB0, 0x00, 0x00])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Led;

    #[test]
    fn grid_notes_decode_to_pads() {
        assert_eq!(
            decode_event(&[0x90, 0x00, 127]),
            Some(PadEvent::Pad { pos: HwPos::new(0, 0), pressed: true })
        );
        assert_eq!(
            decode_event(&[0x90, 0x13, 0]),
            Some(PadEvent::Pad { pos: HwPos::new(3, 1), pressed: false })
        );
    }

    #[test]
    fn scene_and_automap_buttons_decode_to_automap() {
        // x == 8 is the scene-launch column
        assert_eq!(
            decode_event(&[0x90, 0x28, 127]),
            Some(PadEvent::Automap { index: 2, pressed: true })
        );
        // controller changes 104..=111 are the top row
        assert_eq!(
            decode_event(&[0xB0, 106, 127]),
            Some(PadEvent::Automap { index: 10, pressed: true })
        );
    }

    #[test]
    fn unrelated_messages_are_ignored() {
        assert_eq!(decode_event(&[0xB0, 0, 3]), None);
        assert_eq!(decode_event(&[0xF8]), None);
    }

    #[test]
    fn color_codes_pack_green_high_red_low() {
        assert_eq!(color_code(Color::BLACK), 0b0000100);
        assert_eq!(color_code(Color::new(Led::Full, Led::Off)), 0b0000111);
        assert_eq!(color_code(Color::new(Led::Off, Led::Full)), 0b0110100);
    }
}
