pub mod api;
pub mod content;
pub mod error;
pub mod params;
pub mod render;

pub use api::{
    arpeggio, chord, chord_arp_pitches, chord_pitches, metronome, pitches, render, scale,
    scale_pitches, tuning, RenderRequest,
};
pub use content::{ContentLibrary, ContentSource, FrettedNote, NoContent, ScaleNote};
pub use error::RenderError;
pub use params::{patch_map, patch_name, Countoff, SoundParams};
pub use render::{MidiFile, PartBuilder};
