//! # Standard MIDI File Assembly
//!
//! Packs finalized event buffers into a Type-1 Standard MIDI File: the
//! `MThd` header, a tempo meta-track, then one `MTrk` chunk per part track.
//!
//! ## Binary Contract
//! The byte layout is the compatibility contract with downstream players:
//!
//! ```text
//! MThd 00 00 00 06 | 00 01 | track count | division
//! MTrk <len=20>    | time signature 4/4 | set tempo | end of track
//! MTrk <len>       | part events ...    | 00 FF 2F 00
//! ...
//! ```
//!
//! Every chunk length is computed from the actual payload at serialization
//! time (payload bytes + 4 for the end-of-track marker), and the header's
//! track count is derived from the chunk list itself, so neither can drift
//! from the content.

/// The fixed end-of-track marker closing every track chunk.
const END_OF_TRACK: [u8; 4] = [0x00, 0xFF, 0x2F, 0x00];

/// Collects part tracks and serializes the complete file.
///
/// # Example
/// ```rust
/// use fretmidi::MidiFile;
///
/// let mut file = MidiFile::new(192, 120);
/// file.add_track(vec![0x00, 0x90, 60, 100, 0x81, 0x40, 0x90, 60, 0]);
/// let bytes = file.into_bytes();
/// assert_eq!(&bytes[..4], b"MThd");
/// assert_eq!(bytes[11], 2); // tempo track plus one part track
/// ```
pub struct MidiFile {
    ticks_per_beat: u16,
    tempo: u32,
    tracks: Vec<Vec<u8>>,
}

impl MidiFile {
    /// Start a file at the given division and tempo (BPM).
    pub fn new(ticks_per_beat: u16, tempo: u32) -> Self {
        MidiFile {
            ticks_per_beat,
            tempo,
            tracks: Vec::new(),
        }
    }

    /// Append one part track's finalized event bytes. Tracks are emitted in
    /// insertion order, after the tempo meta-track.
    pub fn add_track(&mut self, events: Vec<u8>) {
        self.tracks.push(events);
    }

    /// Chunks the file will contain, counting the tempo meta-track.
    pub fn track_count(&self) -> u16 {
        self.tracks.len() as u16 + 1
    }

    /// Serialize the file, consuming the assembler. The buffer is produced
    /// exactly once; there is nothing left to mutate afterwards.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"MThd");
        out.extend_from_slice(&6u32.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&self.track_count().to_be_bytes());
        out.extend_from_slice(&self.ticks_per_beat.to_be_bytes());

        out.extend_from_slice(&tempo_track(self.tempo));

        for events in &self.tracks {
            out.extend_from_slice(&track_chunk(events));
        }

        out
    }
}

/// Wrap one track's event bytes in a length-prefixed `MTrk` chunk.
///
/// The declared length is always the payload byte count plus the four bytes
/// of the end-of-track marker.
pub fn track_chunk(events: &[u8]) -> Vec<u8> {
    let mut chunk = Vec::with_capacity(events.len() + 12);
    chunk.extend_from_slice(b"MTrk");
    chunk.extend_from_slice(&(events.len() as u32 + 4).to_be_bytes());
    chunk.extend_from_slice(events);
    chunk.extend_from_slice(&END_OF_TRACK);
    chunk
}

/// The tempo meta-track: a fixed 4/4 time-signature event and the tempo in
/// microseconds per beat as three big-endian bytes.
fn tempo_track(tempo: u32) -> Vec<u8> {
    let usec_per_beat = 60_000_000 / tempo.max(1);

    let mut chunk = Vec::with_capacity(28);
    chunk.extend_from_slice(b"MTrk");
    chunk.extend_from_slice(&20u32.to_be_bytes());
    // Time signature 4/4, 24 clocks per click, 8 thirty-seconds per beat.
    chunk.extend_from_slice(&[0x00, 0xFF, 0x58, 0x04, 0x04, 0x02, 0x18, 0x08]);
    chunk.extend_from_slice(&[0x00, 0xFF, 0x51, 0x03]);
    chunk.push((usec_per_beat >> 16) as u8);
    chunk.push((usec_per_beat >> 8) as u8);
    chunk.push(usec_per_beat as u8);
    // Two beats of tail before the end-of-track marker.
    chunk.extend_from_slice(&[0x84, 0x00, 0xFF, 0x2F, 0x00]);
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_chunk_length_is_payload_plus_marker() {
        let payload = vec![0u8; 300];
        let chunk = track_chunk(&payload);
        assert_eq!(&chunk[..4], b"MTrk");
        let declared = u32::from_be_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
        assert_eq!(declared, 304);
        assert_eq!(chunk.len(), 8 + 300 + 4);
        assert_eq!(&chunk[chunk.len() - 4..], &END_OF_TRACK);
    }

    #[test]
    fn test_tempo_track_bytes_at_120_bpm() {
        // 60,000,000 / 120 = 500,000 usec per beat = 0x07 0xA1 0x20.
        let chunk = tempo_track(120);
        assert_eq!(chunk.len(), 28);
        assert_eq!(&chunk[4..8], &[0x00, 0x00, 0x00, 0x14]);
        assert_eq!(&chunk[20..23], &[0x07, 0xA1, 0x20]);
    }

    #[test]
    fn test_tempo_is_floored() {
        // 60,000,000 / 90 = 666,666.67 floors to 666,666 = 0x0A 0x2C 0x2A.
        let chunk = tempo_track(90);
        assert_eq!(&chunk[20..23], &[0x0A, 0x2C, 0x2A]);
    }

    #[test]
    fn test_header_counts_tempo_track() {
        let mut file = MidiFile::new(192, 120);
        file.add_track(vec![0x00, 0x90, 60, 100]);
        file.add_track(vec![0x00, 0x90, 64, 100]);
        assert_eq!(file.track_count(), 3);
        let bytes = file.into_bytes();
        assert_eq!(&bytes[..4], b"MThd");
        assert_eq!(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 6);
        assert_eq!(u16::from_be_bytes([bytes[8], bytes[9]]), 1);
        assert_eq!(u16::from_be_bytes([bytes[10], bytes[11]]), 3);
        assert_eq!(u16::from_be_bytes([bytes[12], bytes[13]]), 192);
    }

    #[test]
    fn test_empty_file_is_header_plus_tempo_track() {
        let bytes = MidiFile::new(192, 120).into_bytes();
        assert_eq!(bytes.len(), 14 + 28);
        assert_eq!(u16::from_be_bytes([bytes[10], bytes[11]]), 1);
    }
}
