//! 7-bit packing of program memory for SysEx transport.
//!
//! SysEx data bytes must have the high bit clear. DSI synths pack every group
//! of up to seven raw bytes into eight wire bytes: one byte collecting the
//! high bits (bit `i` belongs to byte `i` of the group) followed by the seven
//! low parts.

use crate::error::{Error, Result};
use crate::layout::PAYLOAD_SIZE;

/// Converts raw memory to and from wire-safe bytes.
pub trait PackingCodec {
    /// Number of raw bytes a single dump carries.
    fn raw_size(&self) -> usize;

    /// Number of wire bytes for [`raw_size`](Self::raw_size) raw bytes.
    fn encoded_size(&self) -> usize;

    /// Pack exactly `raw_size` bytes.
    fn encode(&self, raw: &[u8]) -> Result<Vec<u8>>;

    /// Unpack exactly `encoded_size` bytes into a block of `target_size` bytes.
    ///
    /// Bytes past the decoded payload are zero.
    fn decode(&self, wire: &[u8], target_size: usize) -> Result<Vec<u8>>;
}

/// The MS-bit packing used by DSI/Sequential instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DsiPacking {
    raw_size: usize,
}

impl Default for DsiPacking {
    fn default() -> Self {
        Self::new(PAYLOAD_SIZE)
    }
}

impl DsiPacking {
    pub fn new(raw_size: usize) -> Self {
        Self { raw_size }
    }
}

/// Wire length for `raw_len` raw bytes.
pub fn packed_len(raw_len: usize) -> usize {
    let full = raw_len / 7;
    let rest = raw_len % 7;
    full * 8 + if rest > 0 { rest + 1 } else { 0 }
}

/// Pack any number of bytes.
pub fn pack(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(packed_len(raw.len()));
    for group in raw.chunks(7) {
        let high_bits = group
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &b)| acc | ((b >> 7) << i));
        out.push(high_bits);
        out.extend(group.iter().map(|&b| b & 0x7F));
    }
    out
}

/// Unpack wire bytes, stopping once `max_len` raw bytes are produced.
pub fn unpack(wire: &[u8], max_len: usize) -> Result<Vec<u8>> {
    if let Some(offset) = wire.iter().position(|&b| b & 0x80 != 0) {
        return Err(Error::InvalidWireByte {
            offset,
            value: wire[offset],
        });
    }
    let mut out = Vec::with_capacity(max_len);
    'groups: for group in wire.chunks(8) {
        let (high_bits, low) = match group.split_first() {
            Some(split) => split,
            None => break,
        };
        for (i, &b) in low.iter().enumerate() {
            if out.len() == max_len {
                break 'groups;
            }
            out.push(b | (((high_bits >> i) & 1) << 7));
        }
    }
    Ok(out)
}

impl PackingCodec for DsiPacking {
    fn raw_size(&self) -> usize {
        self.raw_size
    }

    fn encoded_size(&self) -> usize {
        packed_len(self.raw_size)
    }

    fn encode(&self, raw: &[u8]) -> Result<Vec<u8>> {
        if raw.len() != self.raw_size {
            return Err(Error::SizeContract {
                what: "raw payload",
                expected: self.raw_size,
                actual: raw.len(),
            });
        }
        let wire = pack(raw);
        debug_assert_eq!(wire.len(), self.encoded_size());
        Ok(wire)
    }

    fn decode(&self, wire: &[u8], target_size: usize) -> Result<Vec<u8>> {
        if wire.len() != self.encoded_size() {
            return Err(Error::SizeContract {
                what: "encoded payload",
                expected: self.encoded_size(),
                actual: wire.len(),
            });
        }
        let mut raw = unpack(wire, target_size)?;
        log::trace!("Unpacked {} wire bytes into {} raw bytes", wire.len(), raw.len());
        raw.resize(target_size, 0);
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PATCH_SIZE;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_size_contract() {
        let codec = DsiPacking::default();
        assert_eq!(codec.raw_size(), 2046);
        assert_eq!(codec.encoded_size(), 2339);
    }

    #[test]
    fn test_pack_group() {
        let wire = pack(&[0x80, 0x01, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x81]);
        assert_eq!(
            wire,
            vec![0b0000_0101, 0x00, 0x01, 0x7F, 0, 0, 0, 0, 0b0000_0001, 0x01]
        );
        assert_eq!(unpack(&wire, 8).unwrap(), vec![0x80, 0x01, 0xFF, 0, 0, 0, 0, 0x81]);
    }

    #[test]
    fn test_round_trip_random_blocks() {
        let codec = DsiPacking::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x2F);
        for _ in 0..32 {
            let raw: Vec<u8> = (0..PAYLOAD_SIZE).map(|_| rng.random()).collect();
            let wire = codec.encode(&raw).unwrap();
            assert_eq!(wire.len(), 2339);
            assert!(wire.iter().all(|&b| b < 0x80));

            let decoded = codec.decode(&wire, PATCH_SIZE).unwrap();
            assert_eq!(decoded.len(), PATCH_SIZE);
            assert_eq!(&decoded[..PAYLOAD_SIZE], &raw[..]);
            assert_eq!(&decoded[PAYLOAD_SIZE..], &[0, 0]);
        }
    }

    #[test]
    fn test_encode_rejects_wrong_size() {
        let codec = DsiPacking::default();
        let err = codec.encode(&[0; PATCH_SIZE]).unwrap_err();
        assert!(matches!(err, Error::SizeContract { expected: 2046, actual: 2048, .. }));
    }

    #[test]
    fn test_decode_rejects_wrong_size() {
        let codec = DsiPacking::default();
        assert!(matches!(
            codec.decode(&[0; 2338], PATCH_SIZE),
            Err(Error::SizeContract { expected: 2339, actual: 2338, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_high_bit() {
        let codec = DsiPacking::default();
        let mut wire = vec![0u8; 2339];
        wire[17] = 0xF7;
        assert_eq!(
            codec.decode(&wire, PATCH_SIZE),
            Err(Error::InvalidWireByte { offset: 17, value: 0xF7 })
        );
    }
}
