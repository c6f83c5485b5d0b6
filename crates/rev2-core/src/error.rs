//! Error types for the rev2-core crate.

use thiserror::Error;

/// Errors that can occur while decoding, transforming or framing patch memory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The message header matches neither an edit buffer nor a program dump.
    #[error("Unknown SysEx frame, header {header:02X?}")]
    UnknownFrame { header: Vec<u8> },

    /// The `F0 ... F7` envelope is missing or the message is empty.
    #[error("Malformed SysEx envelope: {0}")]
    MalformedEnvelope(String),

    /// A block handed to the codec or the patch buffer has the wrong size.
    #[error("Size contract violated for {what}: expected {expected} bytes, got {actual}")]
    SizeContract {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Wire data contains a byte with the high bit set.
    #[error("Invalid wire byte 0x{value:02X} at offset {offset}")]
    InvalidWireByte { offset: usize, value: u8 },

    /// A sequencer track index is outside the valid range.
    #[error("{kind} track {track} out of range (max {max})")]
    TrackOutOfRange {
        kind: &'static str,
        track: usize,
        max: usize,
    },

    /// A program number does not address one of the synth's slots.
    #[error("Program number {0} out of range")]
    ProgramOutOfRange(usize),

    /// A program dump was requested for a patch without an assigned slot.
    #[error("Patch has no program number assigned")]
    MissingProgramNumber,

    /// A layer name contains characters the synth cannot display.
    #[error("Invalid patch name: {0}")]
    InvalidName(String),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
