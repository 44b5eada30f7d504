//! Bi-color LED values for the original Launchpad's red/green LEDs.

use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Serialize, Serializer};

/// One LED channel's intensity. The original Launchpad drives each channel of
/// its bi-color LEDs at one of four discrete levels; there is no continuous
/// color space.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Hash, Copy, Clone)]
#[repr(u8)]
pub enum Led {
    Off = 0,
    Low = 1,
    Medium = 2,
    Full = 3,
}

impl Led {
    /// The wire value of this intensity, 0..=3.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Led::code`]. Returns `None` for anything above 3.
    pub fn from_code(code: u8) -> Option<Led> {
        match code {
            0 => Some(Led::Off),
            1 => Some(Led::Low),
            2 => Some(Led::Medium),
            3 => Some(Led::Full),
            _ => None,
        }
    }
}

impl Default for Led {
    fn default() -> Self {
        Led::Off
    }
}

/// A bi-color LED value: independent red and green channels.
///
/// Yellow shades are obtained by driving both channels at once. The named
/// constants cover the corners of the (tiny) palette.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Hash)]
pub struct Color {
    red: Led,
    green: Led,
}

impl Color {
    pub const BLACK: Color = Color { red: Led::Off, green: Led::Off };
    pub const RED: Color = Color { red: Led::Full, green: Led::Off };
    pub const GREEN: Color = Color { red: Led::Off, green: Led::Full };
    pub const YELLOW: Color = Color { red: Led::Full, green: Led::Full };
    pub const AMBER: Color = Color { red: Led::Full, green: Led::Medium };

    pub fn new(red: Led, green: Led) -> Color {
        Color { red, green }
    }

    pub fn red(&self) -> Led {
        self.red
    }

    pub fn green(&self) -> Led {
        self.green
    }
}

// On the wire (and in template files) a color is a two-element array of
// channel codes, e.g. `[3, 0]` for full red.
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.red.code(), self.green.code()].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [red, green] = <[u8; 2]>::deserialize(deserializer)?;
        let red = Led::from_code(red)
            .ok_or_else(|| D::Error::custom(format!("red intensity {} out of range 0..=3", red)))?;
        let green = Led::from_code(green)
            .ok_or_else(|| D::Error::custom(format!("green intensity {} out of range 0..=3", green)))?;
        Ok(Color { red, green })
    }
}
