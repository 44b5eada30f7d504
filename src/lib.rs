/*!
Bind a Novation Launchpad's pad grid to keyboard shortcuts.

Templates are named groups of buttons with colors and key combos, laid out as
offsets around an anchor cell. They are dropped onto an 8x8 grid, and the crate keeps
the book on which cells are occupied, validates drops (bounds, overlap,
connectivity on removal), derives the LED frame the hardware should show, and
in run mode polls the device and fires the bound shortcuts.

# Placing a template and running it

```
use padkey::{
    Button, Command, Controller, MockKeys, MockPad, Offset, Session, TablePos,
    Template, TemplateItem, TemplateKind, TemplateRegistry,
};

let mut jump = Button::new("Jump", "jump", Offset::ANCHOR);
jump.keyboard_combo = "space".to_owned();
let template = Template::new(
    "Jump",
    TemplateKind::Buttons,
    vec![TemplateItem::Button(jump)],
)?;

let mut registry = TemplateRegistry::new();
registry.insert(template);

let mut session = Session::new(registry);
session.apply(Command::Place {
    template: "Jump".to_owned(),
    anchor: TablePos::new(3, 3),
})?;

// swap MockPad/MockKeys for `Launchpad::guess()?` and a real key emitter
let mut controller = Controller::new(MockPad::new(), MockKeys::new());
controller.start(&mut session)?;
controller.tick(&mut session)?;
controller.stop(&mut session)?;
# Ok::<(), Box<dyn std::error::Error>>(())
```

# Coordinate spaces

Three spaces show up throughout: the 9x9 editor *table* (with the automap
border), the 0-based 8x8 *hardware* grid, and template-relative *offsets*.
See the [`pos`](TablePos) types for the exact conversions.

# Hover vs. drop

Drag-hover feedback and the drop itself go through the same validator
([`Session::check_drop`] and [`Command::Place`]), so the accept/reject cursor
shown while dragging can never disagree with what the drop will do.
*/

pub mod util;

mod color;
pub use color::*;

mod pos;
pub use pos::*;

mod errors;
pub use errors::*;

mod template;
pub use template::*;

mod registry;
pub use registry::*;

mod ledger;
pub use ledger::*;

pub mod placement;
pub use placement::{validate_placement, would_disconnect};

mod frame;
pub use frame::*;

mod session;
pub use session::*;

mod hardware;
pub use hardware::*;

mod launchpad;
pub use launchpad::*;

mod controller;
pub use controller::*;

pub mod prelude {
    pub use crate::controller::Controller;
    pub use crate::hardware::{KeyEmitter, PadDevice, PadEvent};
    pub use crate::session::{Command, Session};
    pub use crate::{Color, HwPos, Led, Offset, TablePos};
}

/// Identifier used for e.g. the midi port names etc.
const APPLICATION_NAME: &str = "Padkey";
