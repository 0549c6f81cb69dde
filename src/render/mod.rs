//! # Render Module
//!
//! Builds the MIDI byte stream for a lesson snippet: symbolic events are
//! accumulated per track, timed against the tick grid, looped, and packed
//! into a Type-1 Standard MIDI File.
//!
//! ## Sub-modules
//! - `delta` - delta-time byte encoding
//! - `builder` - the per-part event accumulator and its init/finish lifecycle
//! - `parts` - content algorithms (strum, arpeggio, scale run, click, ...)
//! - `smf` - track chunk and file assembly
//!
//! ## Pipeline
//! ```text
//! SoundParams -> PartBuilder::init() -> generator -> PartBuilder::finish()
//!             -> MidiFile::add_track() per track -> MidiFile::into_bytes()
//! ```
//!
//! ## Key Types
//! - [`PartBuilder`] - append-only event accumulator with loop-region support
//! - [`MidiFile`] - header + tempo meta-track + part chunk assembly
//!
//! ## Example
//! ```rust
//! use fretmidi::{MidiFile, PartBuilder, SoundParams};
//! use fretmidi::render::parts::strum_chord;
//!
//! let params = SoundParams::default();
//! let mut part = PartBuilder::new(&params);
//! part.init();
//! strum_chord(&mut part, &[0, 1, 0, 2, 3, -1], false); // open C shape
//! part.finish();
//!
//! let mut file = MidiFile::new(params.ticks_per_beat as u16, params.tempo);
//! for track in part.into_tracks() {
//!     file.add_track(track);
//! }
//! let bytes = file.into_bytes();
//! assert_eq!(&bytes[..4], b"MThd");
//! ```

pub mod builder;
pub mod delta;
pub mod parts;
pub mod smf;


pub use builder::PartBuilder;
pub use smf::MidiFile;
