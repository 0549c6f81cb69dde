//! # Playback Parameters
//!
//! Typed playback settings plus the resolver that merges raw caller input
//! (query-style string pairs) into them.
//!
//! ## Purpose
//! Every render operation is driven by a [`SoundParams`] value: timing
//! resolution, tempo, patch, countoff/loop preferences, open-string tuning,
//! and the engine offsets that position a part against the beat. The value is
//! built once per request from caller input and read-only from then on.
//!
//! ## Resolution Rules
//! - Raw names are remapped through a fixed alias table (`t` → `tempo`,
//!   `co`/`click` → `countoff`, `ms` → `measure_start`, ...); canonical names
//!   are accepted as-is.
//! - Numeric-only fields drop non-numeric raw values and keep the prior
//!   default. Only `data` accepts arbitrary text.
//! - Non-editable fields (`ticks_per_beat`, `beats_total`, `base_note`, and
//!   the internal loop markers) ignore caller writes unconditionally.
//! - Unknown names are ignored.
//!
//! ## Example
//! ```rust
//! use fretmidi::SoundParams;
//!
//! let params = SoundParams::resolve([
//!     ("t", "96"),            // alias for tempo
//!     ("co", "1"),            // alias for countoff
//!     ("tempo", "banana"),    // non-numeric: dropped
//!     ("ticks_per_beat", "9999"), // non-editable: ignored
//! ]);
//! assert_eq!(params.tempo, 96);
//! assert_eq!(params.ticks_per_beat, 192);
//! ```

use serde::{Deserialize, Serialize};

/// Countoff preference: how much click pre-roll (and click continuation) the
/// caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Countoff {
    /// No countoff; the click part emits nothing at all.
    None,
    /// A single countoff measure before playback, then silence.
    LeadIn,
    /// A countoff measure followed by a click on every beat of the part.
    Continuous,
}

impl Countoff {
    /// Map the wire encoding (0 = none, 1 = beginning, 2 = always) onto the
    /// enum. Values above 2 saturate to `Continuous`.
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Countoff::None,
            1 => Countoff::LeadIn,
            _ => Countoff::Continuous,
        }
    }

    /// True for any mode that produces countoff beats.
    pub fn is_active(self) -> bool {
        self != Countoff::None
    }
}

/// Resolved playback settings for one render call.
///
/// Constructed via [`SoundParams::default`] or [`SoundParams::resolve`] and
/// treated as immutable afterwards; operations that need an adjusted copy
/// (e.g. a forced `beats_total`) clone first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundParams {
    /// Content id for lookup-based operations.
    pub id: u32,
    /// Numerator of the time signature (3/4, 4/4, 5/4, ...).
    pub time_sig: u32,
    /// MIDI ticks per beat. Non-editable.
    pub ticks_per_beat: u32,
    /// How many beats of content the part covers. Computed per operation,
    /// non-editable from raw input.
    pub beats_total: u32,
    /// Countoff preference.
    pub countoff: Countoff,
    /// How many times to repeat the loop region of each track.
    pub loop_count: u32,
    /// Tempo in beats per minute.
    pub tempo: u32,
    /// Program number for melodic channels.
    pub patch: u8,
    /// Master channel volume (controller 7).
    pub master_volume: u8,
    /// Open-string MIDI numbers, string 1 (high) to string 6 (low).
    /// Non-editable.
    pub base_note: [i32; 6],
    /// Channel numbers per output track; the first entry of each list is the
    /// track's lead channel.
    pub channels: Vec<Vec<u8>>,
    /// The percussion channel; program changes are skipped on it.
    pub drum_channel: u8,
    /// First measure of interest for sequence-style parts.
    pub measure_start: u32,
    /// Last measure to fill out to when `fill_out` is set; negative disables.
    pub measure_end: i32,
    /// Steps per measure for sequence-style parts.
    pub resolution: u32,
    /// Raw content payload (pitch list text). Accepts non-numeric input.
    pub data: String,
    /// Ticks to shift the whole part ahead of or behind the groove.
    pub base_offset_ticks: u32,
    /// Ticks held back from the lead-in so an attack lands on the beat.
    pub leave_room_ticks: u32,
    /// Length of the silence-then-unmute preamble at track start.
    pub init_rest_ticks: u32,
    /// Swing percentage; 50 is straight time.
    pub swing: u32,
    /// Pad the part out to `measure_end` measures during finish.
    pub fill_out: bool,
}

impl Default for SoundParams {
    fn default() -> Self {
        SoundParams {
            id: 0,
            time_sig: 4,
            ticks_per_beat: 192,
            beats_total: 4,
            countoff: Countoff::None,
            loop_count: 0,
            tempo: 120,
            patch: 24,
            master_volume: 120,
            base_note: [64, 59, 55, 50, 45, 40],
            channels: vec![vec![0]],
            drum_channel: 9,
            measure_start: 1,
            measure_end: -1,
            resolution: 1,
            data: String::new(),
            base_offset_ticks: 0,
            leave_room_ticks: 0,
            init_rest_ticks: 64,
            swing: 50,
            fill_out: false,
        }
    }
}

impl SoundParams {
    /// Resolve raw caller input into a parameter set.
    ///
    /// Starts from the defaults and applies each `(name, value)` pair under
    /// the rules described in the module docs. Later pairs win for repeated
    /// names.
    pub fn resolve<'a, I>(input: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut params = SoundParams::default();
        for (name, value) in input {
            params.apply(name, value);
        }
        params
    }

    /// Apply a single raw field write. Explicit, field-by-field: each
    /// canonical name has its own parse-and-assign arm, so a bad value for
    /// one field can never bleed into another.
    fn apply(&mut self, name: &str, value: &str) {
        match canonical_name(name) {
            "id" => {
                if let Ok(v) = value.parse() {
                    self.id = v;
                }
            }
            "tempo" => {
                if let Ok(v) = value.parse::<u32>() {
                    if v > 0 {
                        self.tempo = v;
                    }
                }
            }
            "time_sig" => {
                if let Ok(v) = value.parse::<u32>() {
                    if v > 0 {
                        self.time_sig = v;
                    }
                }
            }
            "patch" => {
                if let Ok(v) = value.parse::<u8>() {
                    if v < 128 {
                        self.patch = v;
                    }
                }
            }
            "countoff" => {
                if let Ok(v) = value.parse::<u8>() {
                    self.countoff = Countoff::from_index(v);
                }
            }
            "loop" => {
                if let Ok(v) = value.parse() {
                    self.loop_count = v;
                }
            }
            "master_volume" => {
                if let Ok(v) = value.parse::<u8>() {
                    if v < 128 {
                        self.master_volume = v;
                    }
                }
            }
            "swing" => {
                if let Ok(v) = value.parse::<u32>() {
                    if v <= 100 {
                        self.swing = v;
                    }
                }
            }
            "measure_start" => {
                if let Ok(v) = value.parse() {
                    self.measure_start = v;
                }
            }
            "measure_end" => {
                if let Ok(v) = value.parse() {
                    self.measure_end = v;
                }
            }
            "resolution" => {
                if let Ok(v) = value.parse::<u32>() {
                    if v > 0 {
                        self.resolution = v;
                    }
                }
            }
            "data" => {
                self.data = value.to_string();
            }
            // Non-editable fields: caller writes are always ignored.
            "ticks_per_beat" | "beats_total" | "ntracks" | "loop_start" | "loop_end"
            | "base_note" | "channels" => {}
            _ => {}
        }
    }
}

/// Remap a raw query-style name onto its canonical field name.
fn canonical_name(name: &str) -> &str {
    match name {
        "i" => "id",
        "t" => "tempo",
        "co" | "click" => "countoff",
        "ms" => "measure_start",
        "me" => "measure_end",
        "r" | "res" => "resolution",
        "d" => "data",
        other => other,
    }
}

/// The guitar- and bass-centric patches the lesson player exposes, with
/// display names.
pub fn patch_map() -> &'static [(u8, &'static str)] {
    &[
        (24, "Ac Nylon"),
        (25, "Ac Steel"),
        (26, "Elec Jazz"),
        (27, "Elec Clean"),
        (29, "Overdriven"),
        (30, "Distortion"),
        (32, "Ac Bass"),
        (33, "Bass Fing"),
        (34, "Bass Pick"),
        (35, "Fretless"),
        (36, "Slap 1"),
        (37, "Slap 2"),
        (104, "Sitar"),
        (105, "Banjo"),
    ]
}

/// Look up the display name for a patch number.
pub fn patch_name(patch: u8) -> Option<&'static str> {
    patch_map()
        .iter()
        .find(|&&(number, _)| number == patch)
        .map(|&(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = SoundParams::default();
        assert_eq!(params.time_sig, 4);
        assert_eq!(params.ticks_per_beat, 192);
        assert_eq!(params.tempo, 120);
        assert_eq!(params.patch, 24);
        assert_eq!(params.master_volume, 120);
        assert_eq!(params.base_note, [64, 59, 55, 50, 45, 40]);
        assert_eq!(params.countoff, Countoff::None);
    }

    #[test]
    fn test_aliases_resolve_to_canonical_fields() {
        let params = SoundParams::resolve([("t", "88"), ("co", "2"), ("i", "42"), ("r", "4")]);
        assert_eq!(params.tempo, 88);
        assert_eq!(params.countoff, Countoff::Continuous);
        assert_eq!(params.id, 42);
        assert_eq!(params.resolution, 4);
    }

    #[test]
    fn test_non_numeric_values_are_dropped() {
        let params = SoundParams::resolve([("tempo", "fast"), ("loop", "twice"), ("patch", "-3")]);
        assert_eq!(params.tempo, 120);
        assert_eq!(params.loop_count, 0);
        assert_eq!(params.patch, 24);
    }

    #[test]
    fn test_data_accepts_text() {
        let params = SoundParams::resolve([("d", "0:1:0:2:3:x")]);
        assert_eq!(params.data, "0:1:0:2:3:x");
    }

    #[test]
    fn test_non_editable_fields_are_ignored() {
        let params = SoundParams::resolve([
            ("ticks_per_beat", "960"),
            ("beats_total", "99"),
            ("base_note", "1"),
            ("ntracks", "7"),
        ]);
        assert_eq!(params.ticks_per_beat, 192);
        assert_eq!(params.beats_total, 4);
        assert_eq!(params.base_note, [64, 59, 55, 50, 45, 40]);
    }

    #[test]
    fn test_later_writes_win() {
        let params = SoundParams::resolve([("tempo", "90"), ("t", "140")]);
        assert_eq!(params.tempo, 140);
    }

    #[test]
    fn test_patch_map_lookup() {
        assert_eq!(patch_name(24), Some("Ac Nylon"));
        assert_eq!(patch_name(105), Some("Banjo"));
        assert_eq!(patch_name(0), None);
    }
}
