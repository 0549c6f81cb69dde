//! # Musical Content Lookup
//!
//! The collaborator that resolves numeric content ids (a chord, scale, or
//! arpeggio from the lesson catalog) into playable note records.
//!
//! Lookup failure is not an error: an id with no data renders as an empty
//! output buffer, so a [`ContentSource`] only ever answers with `Some` data
//! or `None`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A fretted position: which string (1 = high E through 6 = low E) and which
/// fret to sound. Fret 0 is the open string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrettedNote {
    pub string: u8,
    pub fret: i32,
}

/// One note of a scale or arpeggio, as an absolute MIDI number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleNote {
    pub midi_number: i32,
}

/// Resolves content ids into note records.
///
/// Implementations may be backed by anything (a database, an HTTP service, a
/// fixture file); the render operations only require this interface.
pub trait ContentSource {
    /// Fretted positions for a chord id, or `None` when the id is unknown.
    fn chord(&self, id: u32) -> Option<Vec<FrettedNote>>;

    /// Ascending scale tones for a scale id.
    fn scale(&self, id: u32) -> Option<Vec<ScaleNote>>;

    /// Ascending chord tones for an arpeggio id.
    fn arpeggio(&self, id: u32) -> Option<Vec<ScaleNote>>;
}

/// A source with no content at all; every lookup misses.
///
/// Useful for pitch-list operations that never consult the catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContent;

impl ContentSource for NoContent {
    fn chord(&self, _id: u32) -> Option<Vec<FrettedNote>> {
        None
    }

    fn scale(&self, _id: u32) -> Option<Vec<ScaleNote>> {
        None
    }

    fn arpeggio(&self, _id: u32) -> Option<Vec<ScaleNote>> {
        None
    }
}

/// An in-memory content catalog, deserializable from a YAML document:
///
/// ```yaml
/// chords:
///   1:
///     - { string: 1, fret: 0 }
///     - { string: 2, fret: 1 }
/// scales:
///   7:
///     - { midi_number: 52 }
///     - { midi_number: 54 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentLibrary {
    #[serde(default)]
    pub chords: HashMap<u32, Vec<FrettedNote>>,
    #[serde(default)]
    pub scales: HashMap<u32, Vec<ScaleNote>>,
    #[serde(default)]
    pub arpeggios: HashMap<u32, Vec<ScaleNote>>,
}

impl ContentSource for ContentLibrary {
    fn chord(&self, id: u32) -> Option<Vec<FrettedNote>> {
        self.chords.get(&id).cloned()
    }

    fn scale(&self, id: u32) -> Option<Vec<ScaleNote>> {
        self.scales.get(&id).cloned()
    }

    fn arpeggio(&self, id: u32) -> Option<Vec<ScaleNote>> {
        self.arpeggios.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_lookup() {
        let mut library = ContentLibrary::default();
        library.chords.insert(
            3,
            vec![
                FrettedNote { string: 1, fret: 0 },
                FrettedNote { string: 2, fret: 1 },
            ],
        );
        assert_eq!(library.chord(3).unwrap().len(), 2);
        assert!(library.chord(4).is_none());
        assert!(library.scale(3).is_none());
    }

    #[test]
    fn test_library_from_yaml() {
        let doc = r#"
chords:
  1:
    - { string: 1, fret: 0 }
    - { string: 6, fret: 3 }
scales:
  7:
    - { midi_number: 52 }
"#;
        let library: ContentLibrary = serde_yaml::from_str(doc).unwrap();
        assert_eq!(library.chord(1).unwrap()[1].fret, 3);
        assert_eq!(library.scale(7).unwrap()[0].midi_number, 52);
        assert!(library.arpeggio(1).is_none());
    }

    #[test]
    fn test_no_content_always_misses() {
        assert!(NoContent.chord(1).is_none());
        assert!(NoContent.scale(1).is_none());
        assert!(NoContent.arpeggio(1).is_none());
    }
}
