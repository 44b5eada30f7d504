use crate::TablePos;

/// Errors from placement, removal and template handling.
///
/// [`Error::is_rejection`] separates the expected, user-facing outcomes (a
/// drop or removal that simply isn't allowed) from invariant violations that
/// point at a bug or at inconsistent template data.
#[derive(Debug)]
pub enum Error {
    /// The drop target resolves outside the usable 8x8 area.
    OutOfBounds { pos: TablePos },
    /// The drop target overlaps a cell that is already occupied.
    CellOccupied { pos: TablePos },
    /// Removing this cell would cut part of its instance off from the anchor.
    WouldOrphan { pos: TablePos },
    /// The ledger's defensive re-check failed at record time. The validator
    /// is the primary gate, so hitting this means a caller skipped it.
    OccupancyConflict { pos: TablePos },
    /// A template file declares an item kind this version doesn't know.
    UnsupportedItemType { type_name: String },
    /// A template file violates the schema.
    MalformedTemplateFile { reason: String },
    /// A command referenced a template that isn't in the registry.
    UnknownTemplate { name: String },
}

impl Error {
    /// Whether this is an expected, recoverable outcome (shown to the user as
    /// a rejected drop/removal) rather than an internal failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::OutOfBounds { .. } | Self::CellOccupied { .. } | Self::WouldOrphan { .. }
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfBounds { pos } => {
                write!(f, "target cell ({}, {}) is outside the usable grid", pos.row, pos.col)
            }
            Self::CellOccupied { pos } => {
                write!(f, "target cell ({}, {}) is already occupied", pos.row, pos.col)
            }
            Self::WouldOrphan { pos } => write!(
                f,
                "removing cell ({}, {}) would disconnect the rest of its template",
                pos.row, pos.col
            ),
            Self::OccupancyConflict { pos } => write!(
                f,
                "ledger re-check failed: cell ({}, {}) recorded twice",
                pos.row, pos.col
            ),
            Self::UnsupportedItemType { type_name } => {
                write!(f, "unsupported template item type {:?}", type_name)
            }
            Self::MalformedTemplateFile { reason } => {
                write!(f, "malformed template file: {}", reason)
            }
            Self::UnknownTemplate { name } => write!(f, "no loaded template named {:?}", name),
        }
    }
}

impl std::error::Error for Error {}

/// Errors from talking to the MIDI hardware.
#[derive(Debug)]
pub enum MidiError {
    InputConnectError(midir::ConnectError<midir::MidiInput>),
    OutputConnectError(midir::ConnectError<midir::MidiOutput>),
    InitError(midir::InitError),
    PortInfoError(midir::PortInfoError),
    SendError(midir::SendError),
    NoPortFound {
        // The keyword that was searched for
        keyword: &'static str,
    },
}

impl std::fmt::Display for MidiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InputConnectError(_) => f.write_str("connecting to MIDI input port failed"),
            Self::OutputConnectError(_) => f.write_str("connecting to MIDI output port failed"),
            Self::InitError(_) => f.write_str("MIDI context initialization failed"),
            Self::PortInfoError(_) => f.write_str("MIDI port retrieval failed"),
            Self::SendError(_) => f.write_str("sending MIDI message failed"),
            Self::NoPortFound { keyword } => write!(f, "couldn't find a port for {:?}", keyword),
        }
    }
}

impl std::error::Error for MidiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InputConnectError(e) => Some(e),
            Self::OutputConnectError(e) => Some(e),
            Self::InitError(e) => Some(e),
            Self::PortInfoError(e) => Some(e),
            Self::SendError(e) => Some(e),
            Self::NoPortFound { keyword: _ } => None,
        }
    }
}

impl From<midir::ConnectError<midir::MidiInput>> for MidiError {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Self::InputConnectError(e)
    }
}

impl From<midir::ConnectError<midir::MidiOutput>> for MidiError {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        Self::OutputConnectError(e)
    }
}

impl From<midir::InitError> for MidiError {
    fn from(e: midir::InitError) -> Self {
        Self::InitError(e)
    }
}

impl From<midir::PortInfoError> for MidiError {
    fn from(e: midir::PortInfoError) -> Self {
        Self::PortInfoError(e)
    }
}

impl From<midir::SendError> for MidiError {
    fn from(e: midir::SendError) -> Self {
        Self::SendError(e)
    }
}
