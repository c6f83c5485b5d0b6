//! rev2-core - patch memory engine for the Sequential/DSI Prophet Rev2
//!
//! The Rev2 exchanges programs as SysEx dumps holding a packed 2048-byte
//! memory image with two mirrored layers. This crate provides:
//!
//! - A single offset table describing that memory ([`layout`])
//! - The decoded program buffer ([`RawPatch`])
//! - 7-bit packing ([`PackingCodec`], [`DsiPacking`])
//! - Message classification and framing ([`sysex`], [`PatchFrameBuilder`])
//! - Pure sequencer transformations ([`sequencer`])
//! - Voice fingerprints for deduplication ([`fingerprint`])
//!
//! # Example
//!
//! ```
//! use rev2_core::{sequencer, RawPatch, Rev2, Sysex};
//!
//! let synth = Rev2::new();
//! let message = synth.patch_to_sysex(&RawPatch::new()).unwrap();
//!
//! // Bytes as they would be read from a .syx file
//! let inbound = Sysex::parse(&message.to_bytes()).unwrap();
//! let patch = synth.patch_from_sysex(&inbound).unwrap();
//!
//! let converted = sequencer::poly_to_gated(&patch, 0).unwrap();
//! let outbound = synth.patch_to_sysex(&converted).unwrap();
//! assert!(synth.is_edit_buffer_dump(&outbound));
//! ```

pub mod error;
pub mod fingerprint;
pub mod frames;
pub mod layout;
pub mod packing;
pub mod patch;
pub mod program;
pub mod sequencer;
pub mod synth;
pub mod sysex;

// Re-export main types
pub use error::{Error, Result};
pub use fingerprint::{fingerprint, same_voice};
pub use frames::{FrameFormat, PatchFrameBuilder};
pub use layout::{Layer, PATCH_SIZE, PAYLOAD_SIZE};
pub use packing::{DsiPacking, PackingCodec};
pub use patch::{LayerMode, RawPatch};
pub use program::{bank_name, ProgramNumber};
pub use synth::Rev2;
pub use sysex::{split_stream, DumpKind, Sysex, REV2_MODEL_ID};
