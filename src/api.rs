//! # Render Operations
//!
//! The entry points a lesson player calls: each operation resolves its
//! musical content, drives the part generators, and returns a complete
//! Standard MIDI File as bytes.
//!
//! ## Operations
//! - [`metronome()`] - a continuous 4/4 click
//! - [`tuning()`] - one repeated tuning reference note
//! - [`pitches()`] - an ear-training pitch collection, optionally introduced
//!   by a C cadence
//! - [`chord()`] / [`chord_pitches()`] - a strummed chord from the catalog or
//!   from an explicit pitch list
//! - [`chord_arp_pitches()`] - an arpeggiated chord phrase
//! - [`scale()`] / [`scale_pitches()`] - an up-and-down scale run
//! - [`arpeggio()`] - catalog arpeggio tones rendered as a run
//! - [`render()`] - dispatch a [`RenderRequest`] onto the above
//!
//! ## Output Contract
//! Every operation returns the full byte stream (header, tempo meta-track,
//! part chunks). Content that cannot be resolved (an unknown catalog id, an
//! empty pitch list) yields an **empty buffer**, not an error; a pitch list
//! whose entries are all invalid still renders, as a silent but structurally
//! valid file.
//!
//! ## Example
//! ```rust
//! use fretmidi::{chord_pitches, SoundParams};
//!
//! // An open C shape as string/fret offsets, high string first.
//! let params = SoundParams::default();
//! let bytes = chord_pitches("0:1:0:2:3:-1", false, &params);
//! assert_eq!(&bytes[..4], b"MThd");
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use crate::content::ContentSource;
use crate::error::RenderError;
use crate::params::{Countoff, SoundParams};
use crate::render::parts::{
    arpeggiate_chord, click_part, pitch_collection, run_scale, strum_chord, tuning_note,
};
use crate::render::{MidiFile, PartBuilder};

/// Ticks held back before a strum so the attack lands on the beat.
const STRUM_ROOM_TICKS: u32 = 32;

/// Render a standalone metronome click at the given tempo.
///
/// The click is continuous in 4/4; `beats` defaults to 512, enough to
/// practice against for a while at any reasonable tempo.
pub fn metronome(tempo: u32, beats: Option<u32>) -> Vec<u8> {
    let mut params = SoundParams::default();
    if tempo > 0 {
        params.tempo = tempo;
    }
    params.countoff = Countoff::Continuous;
    params.time_sig = 4;
    params.beats_total = beats.unwrap_or(512);

    let mut file = MidiFile::new(params.ticks_per_beat as u16, params.tempo);
    for track in click_part(&params) {
        file.add_track(track);
    }
    file.into_bytes()
}

/// Render one repeated tuning note. Countoff and looping are forced off;
/// neither makes sense while tuning.
pub fn tuning(pitch: u8, params: &SoundParams) -> Vec<u8> {
    let mut params = params.clone();
    params.countoff = Countoff::None;
    params.loop_count = 0;
    render_part(params, |part| tuning_note(part, pitch))
}

/// Render an ear-training pitch collection, three cycles, with an optional
/// C cadence intro. Countoff is forced off.
pub fn pitches(list: &[i32], intro: bool, params: &SoundParams) -> Vec<u8> {
    if list.is_empty() {
        return Vec::new();
    }
    let mut params = params.clone();
    params.countoff = Countoff::None;
    params.beats_total = if intro { 5 } else { 3 };
    let list = list.to_vec();
    render_part(params, move |part| pitch_collection(part, &list, intro))
}

/// Render a catalog chord as a strum. An unknown id, or one with no note
/// data, produces an empty buffer.
pub fn chord(id: u32, source: &dyn ContentSource, params: &SoundParams) -> Vec<u8> {
    let notes = match source.chord(id) {
        Some(notes) if !notes.is_empty() => notes,
        _ => return Vec::new(),
    };

    // Lay the fretted positions onto the six string slots.
    let mut frets = [-1i32; 6];
    for note in notes {
        if (1..=6).contains(&note.string) {
            frets[note.string as usize - 1] = note.fret;
        }
    }

    strum(&frets, false, params)
}

/// Render a strummed chord from pitch-list text.
///
/// With `absolute` false the entries are fret offsets against the
/// open-string tuning, high string first; with it true they are MIDI note
/// numbers. Entries below zero mark unplayed strings.
pub fn chord_pitches(text: &str, absolute: bool, params: &SoundParams) -> Vec<u8> {
    let pitches = parse_pitch_list(text);
    if pitches.is_empty() {
        return Vec::new();
    }
    strum(&pitches, absolute, params)
}

/// Render an arpeggiated chord phrase from pitch-list text.
pub fn chord_arp_pitches(text: &str, absolute: bool, params: &SoundParams) -> Vec<u8> {
    let pitches = parse_pitch_list(text);
    if pitches.is_empty() {
        return Vec::new();
    }
    let mut params = params.clone();
    params.beats_total = params.time_sig;
    params.leave_room_ticks = STRUM_ROOM_TICKS;
    render_part(params, move |part| arpeggiate_chord(part, &pitches, absolute))
}

/// Render a catalog scale as an up-and-down run.
pub fn scale(id: u32, source: &dyn ContentSource, params: &SoundParams) -> Vec<u8> {
    let notes = match source.scale(id) {
        Some(notes) if !notes.is_empty() => notes,
        _ => return Vec::new(),
    };
    let seq: Vec<i32> = notes.iter().map(|n| n.midi_number).collect();
    run(add_descent(seq), params)
}

/// Render a scale run from pitch-list text of absolute MIDI numbers.
pub fn scale_pitches(text: &str, params: &SoundParams) -> Vec<u8> {
    let pitches = parse_pitch_list(text);
    if pitches.is_empty() {
        return Vec::new();
    }
    run(pitches, params)
}

/// Render a catalog arpeggio: its chord tones played up and down as a run.
pub fn arpeggio(id: u32, source: &dyn ContentSource, params: &SoundParams) -> Vec<u8> {
    let notes = match source.arpeggio(id) {
        Some(notes) if !notes.is_empty() => notes,
        _ => return Vec::new(),
    };
    let seq: Vec<i32> = notes.iter().map(|n| n.midi_number).collect();
    run(add_descent(seq), params)
}

/// A render request as it arrives from the outside world, e.g. the CLI's
/// YAML document.
///
/// `params` carries raw query-style pairs for [`SoundParams::resolve`]; the
/// values stay strings there, exactly as a query string would deliver them.
///
/// ```yaml
/// kind: scale-pitches
/// pitches: "52:54:55:57:59"
/// params:
///   t: "96"
///   co: "1"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderRequest {
    /// Which operation to run: `metronome`, `tuning`, `pitches`, `chord`,
    /// `chord-pitches`, `chord-arp`, `scale`, `scale-pitches`, `arpeggio`.
    pub kind: String,
    /// Catalog id for lookup-based kinds. Falls back to the resolved `id`
    /// parameter.
    pub id: Option<u32>,
    /// Pitch-list text for pitch-based kinds. Falls back to the resolved
    /// `data` parameter.
    pub pitches: Option<String>,
    /// The reference note for `tuning`.
    pub pitch: Option<u8>,
    /// Whether pitch-list entries are absolute MIDI numbers rather than
    /// fret offsets.
    pub absolute: bool,
    /// Whether `pitches` opens with the C cadence intro.
    pub intro: bool,
    /// Beat count for `metronome`.
    pub beats: Option<u32>,
    /// Raw parameter writes, resolved under the alias/editability rules.
    pub params: HashMap<String, String>,
}

/// Dispatch a request onto the matching operation.
///
/// # Errors
/// [`RenderError::UnsupportedKind`] for a kind the library does not know,
/// [`RenderError::MissingField`] when a kind lacks its required input.
///
/// # Example
/// ```rust
/// use fretmidi::{render, NoContent, RenderRequest};
///
/// let request: RenderRequest = serde_yaml::from_str(
///     r#"
/// kind: chord-pitches
/// pitches: "0:1:0:2:3:-1"
/// params:
///   t: "100"
/// "#,
/// )
/// .unwrap();
/// let bytes = render(&request, &NoContent).unwrap();
/// assert_eq!(&bytes[..4], b"MThd");
/// ```
pub fn render(request: &RenderRequest, source: &dyn ContentSource) -> Result<Vec<u8>, RenderError> {
    let params = SoundParams::resolve(
        request
            .params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    );

    match request.kind.as_str() {
        "metronome" => Ok(metronome(params.tempo, request.beats)),
        "tuning" => {
            let pitch = request.pitch.ok_or(RenderError::MissingField {
                kind: "tuning",
                field: "pitch",
            })?;
            Ok(tuning(pitch, &params))
        }
        "pitches" => {
            let text = pitch_text(request, &params, "pitches")?;
            Ok(pitches(&parse_pitch_list(text), request.intro, &params))
        }
        "chord" => Ok(chord(request.id.unwrap_or(params.id), source, &params)),
        "chord-pitches" => {
            let text = pitch_text(request, &params, "chord-pitches")?;
            Ok(chord_pitches(text, request.absolute, &params))
        }
        "chord-arp" => {
            let text = pitch_text(request, &params, "chord-arp")?;
            Ok(chord_arp_pitches(text, request.absolute, &params))
        }
        "scale" => Ok(scale(request.id.unwrap_or(params.id), source, &params)),
        "scale-pitches" => {
            let text = pitch_text(request, &params, "scale-pitches")?;
            Ok(scale_pitches(text, &params))
        }
        "arpeggio" => Ok(arpeggio(request.id.unwrap_or(params.id), source, &params)),
        other => Err(RenderError::UnsupportedKind(other.to_string())),
    }
}

/// Run one part through the init/generate/finish pipeline and assemble the
/// file around it, click track first when the countoff asks for one.
fn render_part<F>(params: SoundParams, generate: F) -> Vec<u8>
where
    F: FnOnce(&mut PartBuilder),
{
    let mut file = MidiFile::new(params.ticks_per_beat as u16, params.tempo);
    for track in click_part(&params) {
        file.add_track(track);
    }

    let mut part = PartBuilder::new(&params);
    part.init();
    generate(&mut part);
    part.finish();
    for track in part.into_tracks() {
        file.add_track(track);
    }

    file.into_bytes()
}

fn strum(pitches: &[i32], absolute: bool, params: &SoundParams) -> Vec<u8> {
    let mut params = params.clone();
    params.beats_total = params.time_sig;
    params.leave_room_ticks = STRUM_ROOM_TICKS;
    let pitches = pitches.to_vec();
    render_part(params, move |part| strum_chord(part, &pitches, absolute))
}

fn run(pitches: Vec<i32>, params: &SoundParams) -> Vec<u8> {
    // Pad an odd run out to a whole beat with trailing rests.
    let count = pitches.len() as u32;
    let padded = count + count % 2;
    let mut params = params.clone();
    params.beats_total = padded / 2;
    render_part(params, move |part| {
        run_scale(part, &pitches, padded - count)
    })
}

/// Extend an ascending sequence with its descent, without repeating the top
/// note.
fn add_descent(mut seq: Vec<i32>) -> Vec<i32> {
    let len = seq.len();
    for i in (0..len.saturating_sub(1)).rev() {
        seq.push(seq[i]);
    }
    seq
}

/// Split pitch-list text on `:` (or `~` when no colon is present); entries
/// that fail to parse become invalid pitches and render as silence.
fn parse_pitch_list(text: &str) -> Vec<i32> {
    let delim = if text.contains(':') { ':' } else { '~' };
    text.split(delim)
        .map(|entry| entry.trim().parse().unwrap_or(-1))
        .collect()
}

fn pitch_text<'a>(
    request: &'a RenderRequest,
    params: &'a SoundParams,
    kind: &'static str,
) -> Result<&'a str, RenderError> {
    if let Some(text) = request.pitches.as_deref() {
        return Ok(text);
    }
    if !params.data.is_empty() {
        return Ok(&params.data);
    }
    Err(RenderError::MissingField {
        kind,
        field: "pitches",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pitch_list_delimiters() {
        assert_eq!(parse_pitch_list("0:1:0"), vec![0, 1, 0]);
        assert_eq!(parse_pitch_list("64~59~55"), vec![64, 59, 55]);
        assert_eq!(parse_pitch_list("3:x:2"), vec![3, -1, 2]);
        assert_eq!(parse_pitch_list(""), vec![-1]);
    }

    #[test]
    fn test_add_descent_skips_the_top() {
        assert_eq!(add_descent(vec![1, 2, 3]), vec![1, 2, 3, 2, 1]);
        assert_eq!(add_descent(vec![5]), vec![5]);
        assert_eq!(add_descent(Vec::new()), Vec::<i32>::new());
    }
}
