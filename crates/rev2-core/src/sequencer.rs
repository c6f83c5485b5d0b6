//! Sequencer transformations.
//!
//! Every function takes a program by reference and returns an edited copy.
//! The Rev2 has two sequencers per layer: a 6-track, 64-step poly sequencer
//! storing absolute notes and velocities, and a 4-track, 16-step gated
//! sequencer storing relative values in half-semitone resolution.

use crate::error::{Error, Result};
use crate::layout::{
    Layer, CLOCK_DIVIDE, DEFAULT_NOTE, DEST_OSC_ALL_FREQ, GATED_MAX_VALUE, GATED_REST,
    GATED_SEQ_DESTINATION, GATED_SEQ_ON, GATED_SEQ_TRACKS, GATED_STEPS, GATED_TRACKS, POLY_SEQ,
    POLY_STEPS, POLY_TRACKS, TEMPO,
};
use crate::patch::RawPatch;

/// Poly sequencer note used together with [`REST_VELOCITY`] to mark a rest.
pub const REST_NOTE: u8 = 60;

/// Out-of-range velocity marking a rest.
pub const REST_VELOCITY: u8 = 128;

/// Notes above this value hold the previous step.
pub const TIE_THRESHOLD: u8 = 128;

const OCTAVE: i32 = 12;

/// What a poly sequencer step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyStep {
    /// Play `note` at `velocity`.
    Note { note: u8, velocity: u8 },
    /// Silence.
    Rest,
    /// Keep the previous note sounding.
    Tie,
}

impl PolyStep {
    pub fn classify(note: u8, velocity: u8) -> Self {
        if note == REST_NOTE && velocity == REST_VELOCITY {
            PolyStep::Rest
        } else if note > TIE_THRESHOLD {
            PolyStep::Tie
        } else {
            PolyStep::Note { note, velocity }
        }
    }
}

/// Clamp a wide intermediate into the numeric gated step range.
fn clamp_step(value: i32) -> u8 {
    value.clamp(0, GATED_MAX_VALUE as i32) as u8
}

fn check_track(kind: &'static str, track: usize, max: usize) -> Result<()> {
    if track > max {
        return Err(Error::TrackOutOfRange { kind, track, max });
    }
    Ok(())
}

/// Lowest note among the first 16 steps of a poly track, capped at 127.
fn lowest_note(patch: &RawPatch, track: usize) -> i32 {
    (0..GATED_STEPS)
        .map(|step| patch.poly_note(Layer::A, track, step) as i32)
        .fold(127, i32::min)
}

/// The first note of the track, moved down in octaves until it is no
/// higher than the lowest note, so all relative offsets are non-negative.
fn index_note(patch: &RawPatch, track: usize, lowest: i32) -> i32 {
    let mut index = patch.poly_note(Layer::A, track, 0) as i32;
    while index > lowest {
        index -= OCTAVE;
    }
    index
}

/// Copy poly sequencer track 0 into the gated sequencer.
///
/// Notes go to `gated_track`, velocities to `gated_track + 1`.
pub fn poly_to_gated(patch: &RawPatch, gated_track: usize) -> Result<RawPatch> {
    poly_track_to_gated(patch, 0, gated_track)
}

/// Copy a poly sequencer track of Layer A into a pair of gated tracks.
///
/// The gated sequencer is switched on with destination "all oscillator
/// frequencies". In a stacked program, the gated sequencer settings, tempo
/// and clock divide of Layer A are mirrored into Layer B.
pub fn poly_track_to_gated(
    patch: &RawPatch,
    poly_track: usize,
    gated_track: usize,
) -> Result<RawPatch> {
    check_track("poly", poly_track, POLY_TRACKS - 1)?;
    check_track("gated", gated_track, GATED_TRACKS - 2)?;

    let mut result = patch.clone();
    let lowest = lowest_note(patch, poly_track);
    let index = index_note(patch, poly_track, lowest);
    log::debug!(
        "Converting poly track {} to gated tracks {}/{} (lowest note {}, index note {})",
        poly_track,
        gated_track,
        gated_track + 1,
        lowest,
        index
    );

    for step in 0..GATED_STEPS {
        let note = patch.poly_note(Layer::A, poly_track, step);
        let velocity = patch.poly_velocity(Layer::A, poly_track, step);
        let gated_note = match PolyStep::classify(note, velocity) {
            PolyStep::Note { note, velocity } if velocity > 0 => {
                clamp_step((note as i32 - index) * 2)
            }
            // 127 is the rest; the reset (126) is never produced here.
            _ => GATED_REST,
        };
        result.set_gated_step(Layer::A, gated_track, step, gated_note);
        result.set_gated_step(Layer::A, gated_track + 1, step, clamp_step(velocity as i32 / 2));
    }

    result.set_byte(&GATED_SEQ_ON, Layer::A, 0);
    result.set_byte(&GATED_SEQ_DESTINATION, Layer::A, DEST_OSC_ALL_FREQ);

    if result.is_stacked() {
        log::debug!("Stacked program, mirroring gated sequencer into layer B");
        for field in [GATED_SEQ_DESTINATION, GATED_SEQ_ON, GATED_SEQ_TRACKS, TEMPO, CLOCK_DIVIDE] {
            result.mirror_field(&field, Layer::A);
        }
    }

    Ok(result)
}

/// Take over all sequencer content of `source`, leaving every other sound
/// parameter of `target` untouched.
///
/// Both layers' poly and gated sequencer data, the sequencer switch, the gated
/// destination, tempo and clock divide are copied.
pub fn copy_sequencers(target: &RawPatch, source: &RawPatch) -> RawPatch {
    let mut result = target.clone();
    for field in [
        POLY_SEQ,
        GATED_SEQ_TRACKS,
        GATED_SEQ_ON,
        GATED_SEQ_DESTINATION,
        TEMPO,
        CLOCK_DIVIDE,
    ] {
        result.copy_field_from(source, &field);
    }
    result
}

/// Reset the poly sequencer of the selected layers to default notes at zero velocity.
pub fn clear_poly_sequencer(patch: &RawPatch, layer_a: bool, layer_b: bool) -> RawPatch {
    let mut result = patch.clone();
    for (layer, selected) in [(Layer::A, layer_a), (Layer::B, layer_b)] {
        if !selected {
            continue;
        }
        for track in 0..POLY_TRACKS {
            for step in 0..POLY_STEPS {
                result.set_poly_note(layer, track, step, DEFAULT_NOTE);
                result.set_poly_velocity(layer, track, step, 0);
            }
        }
    }
    result
}

/// Copy one whole layer over the other.
pub fn copy_layer(patch: &RawPatch, from: Layer) -> RawPatch {
    let mut result = patch.clone();
    let source = patch.layer(from);
    result.layer_mut(from.other()).copy_from_slice(source);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{AB_MODE, GATED_RESET, LAYER_SIZE, PATCH_SIZE};
    use rand::{Rng, SeedableRng};

    fn random_patch(seed: u64) -> RawPatch {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let bytes: Vec<u8> = (0..PATCH_SIZE).map(|_| rng.random()).collect();
        RawPatch::from_bytes(&bytes).unwrap()
    }

    fn with_poly_track(notes: &[u8], velocities: &[u8]) -> RawPatch {
        let mut patch = RawPatch::new();
        for (step, (&note, &velocity)) in notes.iter().zip(velocities).enumerate() {
            patch.set_poly_note(Layer::A, 0, step, note);
            patch.set_poly_velocity(Layer::A, 0, step, velocity);
        }
        patch
    }

    #[test]
    fn test_index_note_descends_by_octaves() {
        let notes = [60u8, 62, 64, 65, 67, 69, 71, 72, 55, 57, 59, 60, 62, 64, 65, 67];
        let patch = with_poly_track(&notes, &[100; 16]);
        assert_eq!(lowest_note(&patch, 0), 55);
        assert_eq!(index_note(&patch, 0, 55), 48);

        let converted = poly_to_gated(&patch, 0).unwrap();
        assert_eq!(converted.gated_step(Layer::A, 0, 0), 24);
        assert_eq!(converted.gated_step(Layer::A, 0, 1), 28);
        assert_eq!(converted.gated_step(Layer::A, 0, 8), 14);
        assert_eq!(converted.gated_step(Layer::A, 1, 0), 50);
    }

    #[test]
    fn test_rest_and_tie_become_rest() {
        let mut notes = [60u8; 16];
        let mut velocities = [100u8; 16];
        velocities[1] = 128;
        notes[2] = 200;
        velocities[3] = 0;
        let patch = with_poly_track(&notes, &velocities);
        let converted = poly_to_gated(&patch, 2).unwrap();

        assert_eq!(converted.gated_step(Layer::A, 2, 0), 0);
        assert_eq!(converted.gated_step(Layer::A, 2, 1), GATED_REST);
        assert_eq!(converted.gated_step(Layer::A, 2, 2), GATED_REST);
        assert_eq!(converted.gated_step(Layer::A, 2, 3), GATED_REST);
        // Velocities are written even for rests.
        assert_eq!(converted.gated_step(Layer::A, 3, 1), 64);
        assert_eq!(converted.gated_step(Layer::A, 3, 3), 0);
    }

    #[test]
    fn test_classify_poly_step() {
        assert_eq!(PolyStep::classify(60, 128), PolyStep::Rest);
        assert_eq!(PolyStep::classify(129, 10), PolyStep::Tie);
        assert_eq!(PolyStep::classify(128, 10), PolyStep::Note { note: 128, velocity: 10 });
        assert_eq!(PolyStep::classify(61, 128), PolyStep::Note { note: 61, velocity: 128 });
    }

    #[test]
    fn test_switches_on_gated_sequencer() {
        let mut patch = random_patch(1);
        patch.set_byte(&AB_MODE, Layer::A, 0);
        let converted = poly_to_gated(&patch, 0).unwrap();
        assert!(converted.gated_seq_active(Layer::A));
        assert_eq!(converted.gated_destination(Layer::A), DEST_OSC_ALL_FREQ);
        // Not stacked: layer B stays as it was.
        assert_eq!(converted.layer(Layer::B), patch.layer(Layer::B));
    }

    #[test]
    fn test_stacked_mirrors_layer_a() {
        for seed in 0..20 {
            let mut patch = random_patch(seed);
            patch.set_byte(&AB_MODE, Layer::A, 1);
            let converted = poly_track_to_gated(&patch, (seed % 6) as usize, 1).unwrap();
            for field in [GATED_SEQ_ON, GATED_SEQ_DESTINATION, GATED_SEQ_TRACKS, TEMPO, CLOCK_DIVIDE] {
                assert_eq!(
                    converted.field(&field, Layer::B),
                    converted.field(&field, Layer::A),
                    "{} not mirrored",
                    field.name
                );
            }
        }
    }

    #[test]
    fn test_clamp_bounds() {
        for seed in 100..140 {
            let patch = random_patch(seed);
            let converted = poly_to_gated(&patch, 0).unwrap();
            for step in 0..GATED_STEPS {
                let note = converted.gated_step(Layer::A, 0, step);
                assert!(note <= GATED_MAX_VALUE || note == GATED_REST);
                assert_ne!(note, GATED_RESET);
                assert!(converted.gated_step(Layer::A, 1, step) <= GATED_MAX_VALUE);
            }
        }
    }

    #[test]
    fn test_track_bounds() {
        let patch = RawPatch::new();
        assert!(poly_to_gated(&patch, 2).is_ok());
        assert_eq!(
            poly_to_gated(&patch, 3).unwrap_err(),
            Error::TrackOutOfRange { kind: "gated", track: 3, max: 2 }
        );
        assert!(poly_track_to_gated(&patch, 6, 0).is_err());
    }

    #[test]
    fn test_input_not_mutated() {
        let patch = random_patch(7);
        let before = patch.clone();
        let _ = poly_to_gated(&patch, 0).unwrap();
        let _ = clear_poly_sequencer(&patch, true, true);
        assert_eq!(patch, before);
    }

    #[test]
    fn test_copy_sequencers() {
        let target = random_patch(10);
        let source = random_patch(11);
        let copied = copy_sequencers(&target, &source);

        let sequencer_fields = [
            POLY_SEQ,
            GATED_SEQ_TRACKS,
            GATED_SEQ_ON,
            GATED_SEQ_DESTINATION,
            TEMPO,
            CLOCK_DIVIDE,
        ];
        let mut is_sequencer_byte = vec![false; PATCH_SIZE];
        for field in &sequencer_fields {
            for layer in Layer::ALL {
                assert_eq!(copied.field(field, layer), source.field(field, layer));
                for offset in field.range(layer) {
                    is_sequencer_byte[offset] = true;
                }
            }
        }
        for offset in 0..PATCH_SIZE {
            if !is_sequencer_byte[offset] {
                assert_eq!(copied.as_bytes()[offset], target.as_bytes()[offset], "offset {}", offset);
            }
        }
    }

    #[test]
    fn test_clear_poly_sequencer() {
        let patch = random_patch(20);
        let cleared = clear_poly_sequencer(&patch, true, false);
        for track in 0..POLY_TRACKS {
            for step in 0..POLY_STEPS {
                assert_eq!(cleared.poly_note(Layer::A, track, step), DEFAULT_NOTE);
                assert_eq!(cleared.poly_velocity(Layer::A, track, step), 0);
            }
        }
        assert_eq!(cleared.layer(Layer::B), patch.layer(Layer::B));
        assert_eq!(&cleared.as_bytes()[..256], &patch.as_bytes()[..256]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let patch = random_patch(21);
        let once = clear_poly_sequencer(&patch, true, true);
        let twice = clear_poly_sequencer(&once, true, true);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clear_nothing_selected() {
        let patch = random_patch(22);
        assert_eq!(clear_poly_sequencer(&patch, false, false), patch);
    }

    #[test]
    fn test_copy_layer() {
        let patch = random_patch(30);
        let copied = copy_layer(&patch, Layer::B);
        assert_eq!(copied.layer(Layer::A), patch.layer(Layer::B));
        assert_eq!(copied.layer(Layer::B), patch.layer(Layer::B));
        assert_eq!(copied.as_bytes().len(), 2 * LAYER_SIZE);
    }
}
