//! Voice identity of a program.
//!
//! Two programs sound the same if their memory matches outside the name and
//! the documented-unused areas of both layers.

use crate::layout::{blank_out_zones, PATCH_SIZE};
use crate::patch::RawPatch;

/// A copy of `patch` with every blank-out zone zeroed.
pub fn fingerprint(patch: &RawPatch) -> RawPatch {
    let mut result = patch.clone();
    result.set_program(None);
    let bytes = result.as_bytes_mut();
    for zone in blank_out_zones() {
        bytes[zone].fill(0);
    }
    result
}

/// Whether two programs are voice-identical.
pub fn same_voice(a: &RawPatch, b: &RawPatch) -> bool {
    fingerprint(a).as_bytes() == fingerprint(b).as_bytes()
}

/// Offsets at which the fingerprints of two programs differ.
pub fn differing_offsets(a: &RawPatch, b: &RawPatch) -> Vec<usize> {
    let (fa, fb) = (fingerprint(a), fingerprint(b));
    (0..PATCH_SIZE)
        .filter(|&offset| fa.as_bytes()[offset] != fb.as_bytes()[offset])
        .collect()
}
