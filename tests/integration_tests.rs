//! Integration tests for the fretmidi renderer
//!
//! Exercises the public API end to end and checks the binary output against
//! the Standard MIDI File contract: header layout, chunk lengths, tempo
//! bytes, and track counts.

use fretmidi::{
    chord, chord_arp_pitches, chord_pitches, metronome, render, scale, scale_pitches, tuning,
    ContentLibrary, FrettedNote, NoContent, RenderError, RenderRequest, ScaleNote, SoundParams,
};

/// Split a rendered file into its chunks, validating the header on the way.
fn chunks(bytes: &[u8]) -> Vec<(&[u8], &[u8])> {
    assert!(bytes.len() >= 14, "file shorter than a header");
    assert_eq!(&bytes[..4], b"MThd");
    assert_eq!(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 6);
    assert_eq!(u16::from_be_bytes([bytes[8], bytes[9]]), 1, "format must be 1");

    let mut out = Vec::new();
    let mut i = 14;
    while i < bytes.len() {
        let id = &bytes[i..i + 4];
        let len = u32::from_be_bytes([bytes[i + 4], bytes[i + 5], bytes[i + 6], bytes[i + 7]])
            as usize;
        assert!(i + 8 + len <= bytes.len(), "chunk overruns the buffer");
        out.push((id, &bytes[i + 8..i + 8 + len]));
        i += 8 + len;
    }
    out
}

fn declared_track_count(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[10], bytes[11]])
}

#[test]
fn test_chord_pitches_produces_a_conformant_file() {
    let params = SoundParams::default();
    let bytes = chord_pitches("0:1:0:2:3:-1", false, &params);

    let parsed = chunks(&bytes);
    assert_eq!(parsed.len() as u16, declared_track_count(&bytes));
    for (id, payload) in &parsed {
        assert_eq!(*id, b"MTrk");
        // Every chunk closes with the end-of-track marker the length
        // accounts for.
        assert_eq!(&payload[payload.len() - 4..], &[0x00, 0xFF, 0x2F, 0x00]);
    }
}

#[test]
fn test_chord_with_countoff_adds_a_click_track() {
    let without = chord_pitches("0:1:0:2:3:-1", false, &SoundParams::default());
    assert_eq!(declared_track_count(&without), 2); // tempo + part

    let params = SoundParams::resolve([("co", "1")]);
    let with = chord_pitches("0:1:0:2:3:-1", false, &params);
    assert_eq!(declared_track_count(&with), 3); // tempo + click + part
}

#[test]
fn test_metronome_counts_and_tempo_bytes() {
    let bytes = metronome(120, Some(8));
    assert_eq!(declared_track_count(&bytes), 2);

    let parsed = chunks(&bytes);
    // The tempo meta-track carries 500,000 usec per beat for 120 BPM.
    let tempo_payload = parsed[0].1;
    let at = tempo_payload
        .windows(4)
        .position(|w| w == &[0x00, 0xFF, 0x51, 0x03])
        .expect("set-tempo event present");
    assert_eq!(&tempo_payload[at + 4..at + 7], &[0x07, 0xA1, 0x20]);

    // 4 countoff clicks plus 8 beats, note 37 on the percussion channel.
    let click_payload = parsed[1].1;
    let ons = click_payload
        .windows(3)
        .filter(|w| w[0] == 0x99 && w[1] == 37 && w[2] > 0)
        .count();
    assert_eq!(ons, 12);
}

#[test]
fn test_tempo_follows_resolved_params() {
    let params = SoundParams::resolve([("t", "90")]);
    let bytes = chord_pitches("0:1:0:2:3:-1", false, &params);
    let parsed = chunks(&bytes);
    let tempo_payload = parsed[0].1;
    let at = tempo_payload
        .windows(4)
        .position(|w| w == &[0x00, 0xFF, 0x51, 0x03])
        .unwrap();
    // 60,000,000 / 90 floors to 666,666.
    assert_eq!(&tempo_payload[at + 4..at + 7], &[0x0A, 0x2C, 0x2A]);
}

#[test]
fn test_catalog_miss_renders_nothing() {
    let params = SoundParams::default();
    assert!(chord(99, &NoContent, &params).is_empty());
    assert!(scale(99, &NoContent, &params).is_empty());
}

#[test]
fn test_catalog_chord_renders_its_notes() {
    let mut library = ContentLibrary::default();
    library.chords.insert(
        1,
        vec![
            FrettedNote { string: 1, fret: 0 },
            FrettedNote { string: 2, fret: 1 },
            FrettedNote { string: 3, fret: 0 },
        ],
    );

    let params = SoundParams::default();
    let bytes = chord(1, &library, &params);
    let parsed = chunks(&bytes);
    let part_payload = parsed.last().unwrap().1;
    // Three strings sound: three note-ons at strum velocity.
    let ons = part_payload
        .windows(3)
        .filter(|w| w[0] == 0x90 && (90..120).contains(&w[2]))
        .count();
    assert_eq!(ons, 3);
}

#[test]
fn test_catalog_scale_descends_after_ascending() {
    let mut library = ContentLibrary::default();
    library.scales.insert(
        7,
        vec![
            ScaleNote { midi_number: 52 },
            ScaleNote { midi_number: 54 },
            ScaleNote { midi_number: 56 },
        ],
    );

    let params = SoundParams::default();
    let bytes = scale(7, &library, &params);
    let parsed = chunks(&bytes);
    let part_payload = parsed.last().unwrap().1;
    // Up and down without repeating the top: 52 54 56 54 52.
    let sounded: Vec<u8> = part_payload
        .windows(3)
        .filter(|w| w[0] == 0x90 && w[2] > 0)
        .map(|w| w[1])
        .collect();
    assert_eq!(sounded, vec![52, 54, 56, 54, 52]);
}

#[test]
fn test_all_invalid_pitches_still_render_a_valid_file() {
    let params = SoundParams::default();
    let bytes = chord_pitches("x:y", false, &params);
    assert!(!bytes.is_empty());
    let parsed = chunks(&bytes);
    let part_payload = parsed.last().unwrap().1;
    let ons = part_payload
        .windows(3)
        .filter(|w| w[0] == 0x90 && (90..120).contains(&w[2]))
        .count();
    assert_eq!(ons, 0);
}

#[test]
fn test_arp_phrase_renders_every_string_twice() {
    let params = SoundParams::default();
    let bytes = chord_arp_pitches("0:1:0:2:3:0", false, &params);
    let parsed = chunks(&bytes);
    let part_payload = parsed.last().unwrap().1;
    let ons = part_payload
        .windows(3)
        .filter(|w| w[0] == 0x90 && (90..120).contains(&w[2]))
        .count();
    assert_eq!(ons, 12);
}

#[test]
fn test_loop_request_repeats_the_region() {
    let request = |loop_count: &str| -> Vec<u8> {
        let request: RenderRequest = serde_yaml::from_str(&format!(
            r#"
kind: scale-pitches
pitches: "52:54:55:57"
params:
  loop: "{}"
"#,
            loop_count
        ))
        .unwrap();
        render(&request, &NoContent).unwrap()
    };

    // The run's micro-timing is repaid within each half-beat slot, so the
    // serialized length is stable and the outputs differ exactly by the
    // duplicated loop regions.
    let plain = request("0");
    let once = request("1");
    let thrice = request("3");
    let region = once.len() - plain.len();
    assert!(region > 0);
    assert_eq!(thrice.len() - plain.len(), 3 * region);
}

#[test]
fn test_render_request_round_trip_from_yaml() {
    let request: RenderRequest = serde_yaml::from_str(
        r#"
kind: scale-pitches
pitches: "52:54:55:57:59:60:62:64"
params:
  t: "96"
  co: "2"
"#,
    )
    .unwrap();
    let bytes = render(&request, &NoContent).unwrap();
    let parsed = chunks(&bytes);
    // Tempo track, continuous click, and the run itself.
    assert_eq!(parsed.len(), 3);
    assert_eq!(declared_track_count(&bytes), 3);
}

#[test]
fn test_render_rejects_unknown_kind() {
    let request = RenderRequest {
        kind: "ocarina".to_string(),
        ..RenderRequest::default()
    };
    match render(&request, &NoContent) {
        Err(RenderError::UnsupportedKind(kind)) => assert_eq!(kind, "ocarina"),
        other => panic!("expected UnsupportedKind, got {:?}", other),
    }
}

#[test]
fn test_render_requires_the_tuning_pitch() {
    let request = RenderRequest {
        kind: "tuning".to_string(),
        ..RenderRequest::default()
    };
    match render(&request, &NoContent) {
        Err(RenderError::MissingField { kind, field }) => {
            assert_eq!(kind, "tuning");
            assert_eq!(field, "pitch");
        }
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn test_pitch_text_falls_back_to_the_data_param() {
    let request: RenderRequest = serde_yaml::from_str(
        r#"
kind: scale-pitches
params:
  d: "52:54:55"
"#,
    )
    .unwrap();
    let bytes = render(&request, &NoContent).unwrap();
    assert!(!bytes.is_empty());

    let sounded = chunks(&bytes)
        .last()
        .unwrap()
        .1
        .windows(3)
        .filter(|w| w[0] == 0x90 && w[2] > 0)
        .count();
    assert_eq!(sounded, 3);
}

#[test]
fn test_tuning_renders_without_click_regardless_of_countoff() {
    // Countoff is forced off while tuning, so no click track appears even
    // when the caller asks for one.
    let params = SoundParams::resolve([("co", "2")]);
    let bytes = tuning(64, &params);
    assert_eq!(declared_track_count(&bytes), 2);
}

#[test]
fn test_scale_pitches_pads_odd_runs() {
    // Seven notes pad to eight half-beat slots; the part still renders.
    let params = SoundParams::default();
    let bytes = scale_pitches("52:54:55:57:59:60:62", &params);
    let parsed = chunks(&bytes);
    let sounded = parsed
        .last()
        .unwrap()
        .1
        .windows(3)
        .filter(|w| w[0] == 0x90 && w[2] > 0)
        .count();
    assert_eq!(sounded, 7);
}
