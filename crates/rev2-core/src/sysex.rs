//! SysEx envelope and DSI message headers.
//!
//! Program data travels in two message shapes:
//!
//! ```text
//! edit buffer:  F0 01 <model> 03 <packed data...> F7
//! program dump: F0 01 <model> 02 <bank> <program> <packed data...> F7
//! ```

use crate::error::{Error, Result};
use crate::program::{ProgramNumber, PROGRAMS_PER_BANK};

pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;

/// DSI/Sequential manufacturer id.
pub const DSI_ID: u8 = 0x01;

/// Model id of the Prophet Rev2.
pub const REV2_MODEL_ID: u8 = 0x2F;

pub const PROGRAM_DATA_DUMP: u8 = 0x02;
pub const EDIT_BUFFER_DATA_DUMP: u8 = 0x03;
pub const REQUEST_PROGRAM_DUMP: u8 = 0x05;
pub const REQUEST_EDIT_BUFFER_DUMP: u8 = 0x06;

/// Payload offset of an edit buffer dump.
pub const EDIT_BUFFER_HEADER_LEN: usize = 3;

/// Payload offset of a program dump.
pub const PROGRAM_DUMP_HEADER_LEN: usize = 5;

/// A SysEx message without its `F0`/`F7` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sysex {
    data: Vec<u8>,
}

impl Sysex {
    /// Wrap data bytes that carry no envelope.
    pub fn from_data(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Parse a complete `F0 ... F7` message.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [SYSEX_START, data @ .., SYSEX_END] => Ok(Self::from_data(data.to_vec())),
            [] => Err(Error::MalformedEnvelope("empty message".to_string())),
            [first, ..] if *first != SYSEX_START => Err(Error::MalformedEnvelope(format!(
                "expected start byte F0, found {:02X}",
                first
            ))),
            _ => Err(Error::MalformedEnvelope("missing end byte F7".to_string())),
        }
    }

    /// Data bytes between the envelope bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The complete message including envelope.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() + 2);
        bytes.push(SYSEX_START);
        bytes.extend_from_slice(&self.data);
        bytes.push(SYSEX_END);
        bytes
    }

    /// Length of the complete message including envelope.
    pub fn len(&self) -> usize {
        self.data.len() + 2
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Split a byte stream such as a `.syx` file into messages.
///
/// Bytes outside an `F0 ... F7` pair are skipped. A trailing message without
/// end byte is an error.
pub fn split_stream(bytes: &[u8]) -> Result<Vec<Sysex>> {
    let mut messages = Vec::new();
    let mut rest = bytes;
    while let Some(start) = rest.iter().position(|&b| b == SYSEX_START) {
        if start > 0 {
            log::debug!("Skipping {} bytes outside SysEx envelope", start);
        }
        rest = &rest[start..];
        let end = rest
            .iter()
            .position(|&b| b == SYSEX_END)
            .ok_or_else(|| Error::MalformedEnvelope("missing end byte F7".to_string()))?;
        messages.push(Sysex::parse(&rest[..=end])?);
        rest = &rest[end + 1..];
    }
    if !rest.is_empty() {
        log::debug!("Skipping {} trailing bytes outside SysEx envelope", rest.len());
    }
    Ok(messages)
}

/// The kind of program dump a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpKind {
    EditBuffer,
    Program(ProgramNumber),
}

impl DumpKind {
    /// Offset of the packed data within the message data.
    pub fn payload_offset(&self) -> usize {
        match self {
            DumpKind::EditBuffer => EDIT_BUFFER_HEADER_LEN,
            DumpKind::Program(_) => PROGRAM_DUMP_HEADER_LEN,
        }
    }

    /// The packed data of a classified message.
    pub fn payload<'a>(&self, message: &'a Sysex) -> &'a [u8] {
        &message.data()[self.payload_offset()..]
    }

    pub fn program(&self) -> Option<ProgramNumber> {
        match self {
            DumpKind::EditBuffer => None,
            DumpKind::Program(program) => Some(*program),
        }
    }
}

/// Whether a message is an edit buffer dump for `model_id`.
pub fn is_edit_buffer_dump(message: &Sysex, model_id: u8) -> bool {
    message.data().starts_with(&[DSI_ID, model_id, EDIT_BUFFER_DATA_DUMP])
}

/// Whether a message is a single program dump for `model_id`.
pub fn is_program_dump(message: &Sysex, model_id: u8) -> bool {
    let data = message.data();
    data.len() >= PROGRAM_DUMP_HEADER_LEN && data.starts_with(&[DSI_ID, model_id, PROGRAM_DATA_DUMP])
}

/// Classify an inbound message.
pub fn classify(message: &Sysex, model_id: u8) -> Result<DumpKind> {
    if is_edit_buffer_dump(message, model_id) {
        return Ok(DumpKind::EditBuffer);
    }
    if is_program_dump(message, model_id) {
        let data = message.data();
        // Bank and program bytes are 7 bit, so an out-of-range slot is a malformed header.
        let program = ProgramNumber::from_bank_program(data[3], data[4]).map_err(|_| {
            Error::UnknownFrame {
                header: data[..PROGRAM_DUMP_HEADER_LEN].to_vec(),
            }
        })?;
        return Ok(DumpKind::Program(program));
    }
    let data = message.data();
    Err(Error::UnknownFrame {
        header: data[..data.len().min(PROGRAM_DUMP_HEADER_LEN)].to_vec(),
    })
}

fn bank_program_bytes(program: ProgramNumber) -> [u8; 2] {
    let index = program.index();
    [(index / PROGRAMS_PER_BANK) as u8, (index % PROGRAMS_PER_BANK) as u8]
}

/// Frame packed data as an edit buffer dump.
pub fn edit_buffer_frame(model_id: u8, payload: &[u8]) -> Sysex {
    let mut data = Vec::with_capacity(EDIT_BUFFER_HEADER_LEN + payload.len());
    data.extend_from_slice(&[DSI_ID, model_id, EDIT_BUFFER_DATA_DUMP]);
    data.extend_from_slice(payload);
    Sysex::from_data(data)
}

/// Frame packed data as a program dump for `program`.
pub fn program_dump_frame(model_id: u8, program: ProgramNumber, payload: &[u8]) -> Sysex {
    let mut data = Vec::with_capacity(PROGRAM_DUMP_HEADER_LEN + payload.len());
    data.extend_from_slice(&[DSI_ID, model_id, PROGRAM_DATA_DUMP]);
    data.extend_from_slice(&bank_program_bytes(program));
    data.extend_from_slice(payload);
    Sysex::from_data(data)
}

/// Ask the synth for its edit buffer.
pub fn edit_buffer_request(model_id: u8) -> Sysex {
    Sysex::from_data(vec![DSI_ID, model_id, REQUEST_EDIT_BUFFER_DUMP])
}

/// Ask the synth for a stored program.
pub fn program_request(model_id: u8, program: ProgramNumber) -> Sysex {
    let [bank, number] = bank_program_bytes(program);
    Sysex::from_data(vec![DSI_ID, model_id, REQUEST_PROGRAM_DUMP, bank, number])
}
