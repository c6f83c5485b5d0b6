//! Subcommand implementations
//!
//! Every edit reads the first program dump from a `.syx` file, applies one of
//! the engine's transformations and writes the result as a new `.syx` file.

use anyhow::{bail, Context, Result};
use rev2_core::fingerprint::differing_offsets;
use rev2_core::sequencer;
use rev2_core::{split_stream, DumpKind, FrameFormat, Layer, ProgramNumber, RawPatch, Rev2, Sysex};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Summary of one message in a `.syx` file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchSummary {
    pub index: usize,
    pub kind: String,
    pub program: Option<String>,
    pub name: String,
    pub layer_b_name: String,
    pub layer_mode: String,
    pub tempo: u8,
    pub clock_divide: u8,
    pub sequencer: String,
    pub gated_destination: u8,
}

impl PatchSummary {
    fn new(index: usize, kind: DumpKind, patch: &RawPatch) -> Self {
        Self {
            index,
            kind: match kind {
                DumpKind::EditBuffer => "edit buffer".to_string(),
                DumpKind::Program(_) => "program dump".to_string(),
            },
            program: patch.program().map(|p| p.friendly_name()),
            name: patch.name(),
            layer_b_name: patch.layer_name(Layer::B),
            layer_mode: format!("{:?}", patch.layer_mode()),
            tempo: patch.tempo(Layer::A),
            clock_divide: patch.clock_divide(Layer::A),
            sequencer: if patch.gated_seq_active(Layer::A) {
                "gated".to_string()
            } else {
                "poly".to_string()
            },
            gated_destination: patch.gated_destination(Layer::A),
        }
    }
}

/// Read every SysEx message from a file
pub fn load_messages(path: &Path) -> Result<Vec<Sysex>> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let messages =
        split_stream(&bytes).with_context(|| format!("Malformed SysEx in {}", path.display()))?;
    log::debug!("Read {} messages from {}", messages.len(), path.display());
    Ok(messages)
}

/// Decode the first program found in a file
pub fn load_patch(synth: &Rev2, path: &Path) -> Result<RawPatch> {
    for message in load_messages(path)? {
        match synth.classify(&message) {
            Ok(_) => {
                return synth
                    .patch_from_sysex(&message)
                    .with_context(|| format!("Failed to decode program in {}", path.display()));
            }
            Err(e) => log::warn!("Skipping message in {}: {}", path.display(), e),
        }
    }
    bail!("No Rev2 program found in {}", path.display())
}

/// Write messages to a file
pub fn save_messages(path: &Path, messages: &[Sysex], overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!("{} already exists (use --force to replace it)", path.display());
    }
    let bytes: Vec<u8> = messages.iter().flat_map(|m| m.to_bytes()).collect();
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} messages to {}", messages.len(), path.display());
    Ok(())
}

/// Options shared by all commands that write a program
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: FrameFormat,
    pub program: Option<ProgramNumber>,
    pub overwrite: bool,
}

/// Encode a program and write it
pub fn save_patch(synth: &Rev2, path: &Path, patch: &RawPatch, options: OutputOptions) -> Result<()> {
    let message = match (options.format, options.program) {
        (FrameFormat::ProgramDump, Some(program)) => synth.patch_to_program_dump_at(patch, program),
        (format, _) => synth.build(patch, format),
    }
    .context("Failed to encode program")?;
    save_messages(path, &[message], options.overwrite)
}

/// Summarise every program in a file
pub fn info(synth: &Rev2, path: &Path) -> Result<Vec<PatchSummary>> {
    let mut summaries = Vec::new();
    for (index, message) in load_messages(path)?.iter().enumerate() {
        match synth.classify(message) {
            Ok(kind) => {
                let patch = synth.patch_from_sysex(message)?;
                summaries.push(PatchSummary::new(index, kind, &patch));
            }
            Err(e) => log::warn!("Message {}: {}", index, e),
        }
    }
    Ok(summaries)
}

/// Print summaries as text
pub fn print_summaries(summaries: &[PatchSummary]) {
    for s in summaries {
        println!(
            "#{} {}{}: '{}' / '{}'",
            s.index,
            s.kind,
            s.program.as_ref().map(|p| format!(" {}", p)).unwrap_or_default(),
            s.name,
            s.layer_b_name
        );
        println!(
            "    layers: {}, tempo: {}, clock divide: {}, sequencer: {}, gated destination: {}",
            s.layer_mode, s.tempo, s.clock_divide, s.sequencer, s.gated_destination
        );
    }
}

/// Convert a poly sequencer track into gated tracks
pub fn to_gated(
    synth: &Rev2,
    input: &Path,
    output: &Path,
    poly_track: usize,
    gated_track: usize,
    options: OutputOptions,
) -> Result<()> {
    let patch = load_patch(synth, input)?;
    let converted = sequencer::poly_track_to_gated(&patch, poly_track, gated_track)?;
    save_patch(synth, output, &converted, options)
}

/// Take over the sequences of a locked program
pub fn copy_sequences(
    synth: &Rev2,
    input: &Path,
    locked: &Path,
    output: &Path,
    options: OutputOptions,
) -> Result<()> {
    let target = load_patch(synth, input)?;
    let source = load_patch(synth, locked)?;
    save_patch(synth, output, &sequencer::copy_sequencers(&target, &source), options)
}

/// Clear the poly sequencer of the selected layers
pub fn clear_poly(
    synth: &Rev2,
    input: &Path,
    output: &Path,
    layers: (bool, bool),
    options: OutputOptions,
) -> Result<()> {
    let patch = load_patch(synth, input)?;
    let (layer_a, layer_b) = layers;
    save_patch(synth, output, &sequencer::clear_poly_sequencer(&patch, layer_a, layer_b), options)
}

/// Copy one layer over the other
pub fn copy_layer(synth: &Rev2, input: &Path, output: &Path, from: Layer, options: OutputOptions) -> Result<()> {
    let patch = load_patch(synth, input)?;
    save_patch(synth, output, &sequencer::copy_layer(&patch, from), options)
}

/// Re-encode a program in another message format
pub fn reframe(synth: &Rev2, input: &Path, output: &Path, options: OutputOptions) -> Result<()> {
    let patch = load_patch(synth, input)?;
    save_patch(synth, output, &patch, options)
}

/// Offsets at which two programs differ in sound
pub fn compare(synth: &Rev2, a: &Path, b: &Path) -> Result<Vec<usize>> {
    let a = load_patch(synth, a)?;
    let b = load_patch(synth, b)?;
    Ok(differing_offsets(&a, &b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rev2_core::layout::{AB_MODE, GATED_REST};
    use tempfile::TempDir;

    fn edit_buffer_options() -> OutputOptions {
        OutputOptions {
            format: FrameFormat::EditBuffer,
            program: None,
            overwrite: false,
        }
    }

    fn write_patch(dir: &TempDir, name: &str, patch: &RawPatch) -> std::path::PathBuf {
        let synth = Rev2::new();
        let path = dir.path().join(name);
        let mut bytes = vec![0xF0, 0x7E, 0x00, 0x06, 0x01, 0xF7];
        bytes.extend(synth.patch_to_sysex(patch).unwrap().to_bytes());
        fs::write(&path, bytes).unwrap();
        path
    }

    fn sample_patch() -> RawPatch {
        let mut patch = RawPatch::new();
        patch.set_layer_name(Layer::A, "Seq Lead").unwrap();
        for step in 0..16 {
            patch.set_poly_note(Layer::A, 0, step, 60 + step as u8);
            patch.set_poly_velocity(Layer::A, 0, step, 100);
        }
        patch.set_poly_velocity(Layer::A, 0, 3, 0);
        patch
    }

    #[test]
    fn test_load_patch_skips_foreign_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_patch(&dir, "in.syx", &sample_patch());
        let patch = load_patch(&Rev2::new(), &path).unwrap();
        assert_eq!(patch.name(), "Seq Lead");
    }

    #[test]
    fn test_load_patch_without_program() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.syx");
        fs::write(&path, [0xF0, 0x7E, 0x00, 0x06, 0x01, 0xF7]).unwrap();
        assert!(load_patch(&Rev2::new(), &path).is_err());
    }

    #[test]
    fn test_to_gated_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_patch(&dir, "in.syx", &sample_patch());
        let output = dir.path().join("out.syx");
        let synth = Rev2::new();

        to_gated(&synth, &input, &output, 0, 1, edit_buffer_options()).unwrap();
        let converted = load_patch(&synth, &output).unwrap();
        assert!(converted.gated_seq_active(Layer::A));
        assert_eq!(converted.gated_step(Layer::A, 1, 0), 0);
        assert_eq!(converted.gated_step(Layer::A, 1, 2), 4);
        assert_eq!(converted.gated_step(Layer::A, 1, 3), GATED_REST);
        assert_eq!(converted.gated_step(Layer::A, 2, 0), 50);

        // Existing outputs are kept unless overwriting is allowed.
        assert!(to_gated(&synth, &input, &output, 0, 1, edit_buffer_options()).is_err());
        let options = OutputOptions {
            overwrite: true,
            ..edit_buffer_options()
        };
        assert!(to_gated(&synth, &input, &output, 0, 1, options).is_ok());
    }

    #[test]
    fn test_reframe_as_program_dump() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_patch(&dir, "in.syx", &sample_patch());
        let output = dir.path().join("out.syx");
        let synth = Rev2::new();

        let without_slot = OutputOptions {
            format: FrameFormat::ProgramDump,
            ..edit_buffer_options()
        };
        assert!(reframe(&synth, &input, &output, without_slot).is_err());
        assert!(!output.exists());

        let program = ProgramNumber::new(513).unwrap();
        let with_slot = OutputOptions {
            program: Some(program),
            ..without_slot
        };
        reframe(&synth, &input, &output, with_slot).unwrap();
        let summaries = info(&synth, &output).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].kind, "program dump");
        assert_eq!(summaries[0].program.as_deref(), Some("F1P2"));
    }

    #[test]
    fn test_copy_and_compare() {
        let dir = tempfile::tempdir().unwrap();
        let mut locked = sample_patch();
        locked.set_poly_note(Layer::B, 5, 63, 72);
        let mut current = RawPatch::new();
        current.set_byte(&AB_MODE, Layer::A, 1);
        let locked_path = write_patch(&dir, "locked.syx", &locked);
        let current_path = write_patch(&dir, "current.syx", &current);
        let output = dir.path().join("out.syx");
        let synth = Rev2::new();

        copy_sequences(&synth, &current_path, &locked_path, &output, edit_buffer_options()).unwrap();
        let offsets = compare(&synth, &output, &current_path).unwrap();
        assert!(!offsets.is_empty());
        // Only the stacking switch differs from the locked program.
        assert_eq!(compare(&synth, &output, &locked_path).unwrap(), vec![231]);
    }

    #[test]
    fn test_clear_poly_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_patch(&dir, "in.syx", &sample_patch());
        let output = dir.path().join("out.syx");
        let synth = Rev2::new();

        clear_poly(&synth, &input, &output, (true, false), edit_buffer_options()).unwrap();
        let cleared = load_patch(&synth, &output).unwrap();
        assert_eq!(cleared.poly_note(Layer::A, 0, 0), 0x3C);
        assert_eq!(cleared.poly_velocity(Layer::A, 0, 0), 0);
        assert_eq!(cleared.poly_note(Layer::B, 0, 0), 0);
    }

    #[test]
    fn test_copy_layer_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_patch(&dir, "in.syx", &sample_patch());
        let output = dir.path().join("out.syx");
        let synth = Rev2::new();

        copy_layer(&synth, &input, &output, Layer::A, edit_buffer_options()).unwrap();
        let copied = load_patch(&synth, &output).unwrap();
        assert_eq!(copied.layer_name(Layer::B), "Seq Lead");
    }
}
