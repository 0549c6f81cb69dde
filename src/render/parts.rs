//! # Part Generators
//!
//! The content-specific algorithms that drive a [`PartBuilder`]: chord
//! strums, arpeggiated chords, scale runs, the click track, tuning notes,
//! and ear-training pitch collections.
//!
//! Each generator is an independent function over (builder, content); none
//! of them keep state of their own. Attack timing and velocity are lightly
//! humanized with a thread-local random generator, so concurrent render
//! calls never contend.
//!
//! ## Edge Policy
//! Empty input, or input whose entries are all invalid (below zero, or
//! outside the MIDI note range), produces zero note events. The surrounding
//! holds are still emitted, so the result is a structurally valid but
//! musically silent track rather than an error.

use crate::params::{Countoff, SoundParams};
use crate::render::builder::{
    PartBuilder, CC_VOLUME, CONTROL_CHANGE, NOTE_ON,
};

/// Note-on status on the percussion channel.
const PERCUSSION_NOTE_ON: u8 = 0x99;
/// The side-stick note used for every click.
const CLICK_NOTE: u8 = 37;

/// A pitch the generators will actually sound.
fn playable(pitch: i32) -> bool {
    (0..=127).contains(&pitch)
}

/// Clamp a computed hold to the non-negative range the delta encoding needs.
fn hold(ticks: i64) -> u32 {
    ticks.max(0) as u32
}

/// Resolve string/fret offsets against the open-string tuning. Entries below
/// zero stay invalid; in relative mode anything past the sixth string is
/// ignored.
fn resolve_pitches(part: &PartBuilder, pitches: &[i32], absolute: bool) -> Vec<i32> {
    if absolute {
        return pitches.to_vec();
    }
    let base = part.base_note();
    pitches
        .iter()
        .take(base.len())
        .enumerate()
        .map(|(j, &fret)| if fret < 0 { fret } else { base[j] + fret })
        .collect()
}

/// Strum a chord across one measure.
///
/// Valid pitches attack from the highest string index down, each staggered
/// by a random 5 to 15 tick offset with velocity in 90..120. The chord
/// sustains to the three-beat boundary, releases with the same stagger, and
/// the remainder of the four-beat measure is padded with a hold.
pub fn strum_chord(part: &mut PartBuilder, pitches: &[i32], absolute: bool) {
    let abs = resolve_pitches(part, pitches, absolute);
    let tpb = part.ticks_per_beat() as i64;
    let master = part.master_volume();

    let mut elapsed: i64 = 0;
    for j in (0..abs.len()).rev() {
        if !playable(abs[j]) {
            continue;
        }
        let stagger = 5 + fastrand::u32(0..11);
        let velocity = 90 + fastrand::u8(0..30);
        part.add_event(stagger, NOTE_ON, abs[j] as u8, Some(velocity));
        part.mark_sustain(0, abs[j] as u8);
        elapsed += stagger as i64;
    }

    part.add_event(hold(3 * tpb - elapsed), CONTROL_CHANGE, CC_VOLUME, Some(master));

    let mut elapsed = 3 * tpb;
    for j in (0..abs.len()).rev() {
        if !playable(abs[j]) {
            continue;
        }
        let stagger = 5 + fastrand::u32(0..11);
        part.add_event(stagger, NOTE_ON, abs[j] as u8, Some(0));
        part.clear_sustain(0, abs[j] as u8);
        elapsed += stagger as i64;
    }

    part.add_event(hold(4 * tpb - elapsed), CONTROL_CHANGE, CC_VOLUME, Some(master));
}

/// Arpeggiate a chord over a fixed sixteen-beat phrase.
///
/// Each valid pitch attacks one beat after the previous, the chord holds to
/// beat 7 and releases, silence runs to beat 8, then the whole chord
/// re-attacks together, holds to beat 15, releases, and the phrase pads out
/// to beat 16. The shape is the same no matter how many pitches are valid.
pub fn arpeggiate_chord(part: &mut PartBuilder, pitches: &[i32], absolute: bool) {
    let abs = resolve_pitches(part, pitches, absolute);
    let tpb = part.ticks_per_beat() as i64;
    let master = part.master_volume();

    // One attack per beat on the way up.
    let mut elapsed: i64 = 0;
    let mut played: i64 = 0;
    for j in (0..abs.len()).rev() {
        if !playable(abs[j]) {
            continue;
        }
        let stagger = 5 + fastrand::u32(0..11);
        let velocity = 90 + fastrand::u8(0..30);
        part.add_event(stagger, NOTE_ON, abs[j] as u8, Some(velocity));
        elapsed += stagger as i64;

        // Let a beat pass after this attack.
        played += 1;
        part.add_event(hold(played * tpb - elapsed), CONTROL_CHANGE, CC_VOLUME, Some(master));
        elapsed = played * tpb;
    }

    part.add_event(hold(7 * tpb - elapsed), CONTROL_CHANGE, CC_VOLUME, Some(master));

    let mut elapsed = 7 * tpb;
    for j in (0..abs.len()).rev() {
        if !playable(abs[j]) {
            continue;
        }
        let stagger = 5 + fastrand::u32(0..11);
        part.add_event(stagger, NOTE_ON, abs[j] as u8, Some(0));
        elapsed += stagger as i64;
    }

    // Silence to the end of beat 8.
    part.add_event(hold(8 * tpb - elapsed), CONTROL_CHANGE, CC_VOLUME, Some(master));

    let mut elapsed = 8 * tpb;
    for j in (0..abs.len()).rev() {
        if !playable(abs[j]) {
            continue;
        }
        let stagger = 5 + fastrand::u32(0..11);
        let velocity = 90 + fastrand::u8(0..30);
        part.add_event(stagger, NOTE_ON, abs[j] as u8, Some(velocity));
        elapsed += stagger as i64;
    }

    part.add_event(hold(15 * tpb - elapsed), CONTROL_CHANGE, CC_VOLUME, Some(master));

    let mut elapsed = 15 * tpb;
    for j in (0..abs.len()).rev() {
        if !playable(abs[j]) {
            continue;
        }
        let stagger = 5 + fastrand::u32(0..11);
        part.add_event(stagger, NOTE_ON, abs[j] as u8, Some(0));
        elapsed += stagger as i64;
    }

    part.add_event(hold(16 * tpb - elapsed), CONTROL_CHANGE, CC_VOLUME, Some(master));
}

/// Run a scale at one note per half-beat slot.
///
/// Even-indexed slots take the softer downstroke velocity in 70..85,
/// odd-indexed slots the harder upstroke in 100..120, simulating alternate
/// picking. Attack and release both get up to 10 ticks of micro-timing, with
/// the release landing 10 ticks before the slot edge; a per-slot remainder
/// hold keeps the grid exact. `rest_notes` trailing half-beat rests pad the
/// run to a whole beat count.
pub fn run_scale(part: &mut PartBuilder, pitches: &[i32], rest_notes: u32) {
    let half = part.ticks_per_beat() / 2;
    let master = part.master_volume();

    for (i, &pitch) in pitches.iter().enumerate() {
        if !playable(pitch) {
            part.add_event(half, CONTROL_CHANGE, CC_VOLUME, Some(master));
            continue;
        }

        let attack = fastrand::u32(0..11);
        let velocity = if i % 2 == 0 {
            70 + fastrand::u8(0..15)
        } else {
            100 + fastrand::u8(0..20)
        };
        part.add_event(attack, NOTE_ON, pitch as u8, Some(velocity));

        let release = fastrand::u32(0..11);
        part.add_event(
            hold(half as i64 - 10 - release as i64),
            NOTE_ON,
            pitch as u8,
            Some(0),
        );

        // Whatever the micro-timing stole comes back here.
        part.add_event(
            hold(10 + release as i64 - attack as i64),
            CONTROL_CHANGE,
            CC_VOLUME,
            Some(master),
        );
    }

    part.add_event(rest_notes * half, CONTROL_CHANGE, CC_VOLUME, Some(master));
}

/// Build the click/metronome part and return its finalized tracks.
///
/// The click runs its own init and finish: a countoff of `None` emits no
/// track at all, `LeadIn` emits exactly one countoff measure, and
/// `Continuous` follows the countoff with a click on every beat of
/// `beats_total`. Beat 1 of each measure lands at velocity 127, the rest at
/// 70, all on the fixed percussion note. The loop region covers only the
/// post-countoff portion.
pub fn click_part(params: &SoundParams) -> Vec<Vec<u8>> {
    if !params.countoff.is_active() {
        return Vec::new();
    }

    let mut part = PartBuilder::new(params);
    if params.init_rest_ticks > 0 {
        part.silence_preamble();
    }

    for i in 0..params.time_sig {
        let velocity = if i == 0 { 127 } else { 70 };
        part.add_event(0, PERCUSSION_NOTE_ON, CLICK_NOTE, Some(velocity));
        part.add_event(params.ticks_per_beat, PERCUSSION_NOTE_ON, CLICK_NOTE, Some(0));
    }
    part.mark_loop_start();

    if params.countoff == Countoff::Continuous {
        for i in 0..params.beats_total {
            let velocity = if i % params.time_sig == 0 { 127 } else { 70 };
            part.add_event(0, PERCUSSION_NOTE_ON, CLICK_NOTE, Some(velocity));
            part.add_event(params.ticks_per_beat, PERCUSSION_NOTE_ON, CLICK_NOTE, Some(0));
        }
    }

    part.apply_loop();
    part.into_tracks()
}

/// Repeat a single tuning reference note sixteen times, six beats held each.
pub fn tuning_note(part: &mut PartBuilder, pitch: u8) {
    let held = 6 * part.ticks_per_beat();
    for _ in 0..16 {
        part.add_event(0, NOTE_ON, pitch, Some(127));
        part.add_event(held, NOTE_ON, pitch, Some(0));
    }
}

/// Play a collection of pitches three times for ear training, each pitch on
/// its own channel, with an optional C cadence intro.
///
/// Each cycle attacks the valid pitches with a 5 to 15 tick stagger, holds
/// to beat 3, releases with the same stagger, and fills the measure to
/// beat 4.
pub fn pitch_collection(part: &mut PartBuilder, pitches: &[i32], intro: bool) {
    if intro {
        insert_intro(part);
    }

    let tpb = part.ticks_per_beat() as i64;
    let master = part.master_volume();

    for _ in 0..3 {
        let mut elapsed: i64 = 0;
        for (j, &pitch) in pitches.iter().enumerate() {
            if pitch <= 0 || pitch > 127 {
                continue;
            }
            let stagger = 5 + fastrand::u32(0..11);
            let velocity = 90 + fastrand::u8(0..30);
            part.add_event(stagger, NOTE_ON + j as u8, pitch as u8, Some(velocity));
            elapsed += stagger as i64;
        }

        part.add_event(hold(3 * tpb - elapsed), CONTROL_CHANGE, CC_VOLUME, Some(master));

        let mut elapsed = 3 * tpb;
        for (j, &pitch) in pitches.iter().enumerate() {
            if pitch <= 0 || pitch > 127 {
                continue;
            }
            let stagger = 5 + fastrand::u32(0..11);
            part.add_event(stagger, NOTE_ON + j as u8, pitch as u8, Some(0));
            elapsed += stagger as i64;
        }

        part.add_event(hold(4 * tpb - elapsed), CONTROL_CHANGE, CC_VOLUME, Some(master));
    }
}

/// A C cadence (C, F, G, C) to orient the ear before a test.
pub fn insert_intro(part: &mut PartBuilder) {
    insert_chord(part, 2, &[64, 60, 55, 52, 48, -1]);
    insert_chord(part, 1, &[65, 60, 57, 53, 48, 41]);
    insert_chord(part, 1, &[67, 62, 55, 50, 47, 43]);
    insert_chord(part, 3, &[64, 60, 55, 52, 48, -1]);
    part.add_event(
        part.ticks_per_beat(),
        CONTROL_CHANGE,
        CC_VOLUME,
        Some(part.master_volume()),
    );
}

/// One block chord over the given number of beats, loosely rolled on the
/// attack and released together just short of the boundary.
fn insert_chord(part: &mut PartBuilder, beats: u32, chord: &[i32]) {
    let total = (beats * part.ticks_per_beat()) as i64;
    let master = part.master_volume();

    let mut elapsed: i64 = 0;
    for &pitch in chord {
        if !playable(pitch) {
            continue;
        }
        let offset = fastrand::u32(0..11);
        let velocity = 90 + fastrand::u8(0..30);
        part.add_event(offset, NOTE_ON, pitch as u8, Some(velocity));
        elapsed += offset as i64;
    }

    for (i, &pitch) in chord.iter().enumerate() {
        if !playable(pitch) {
            continue;
        }
        let offset = if i == 0 { hold(total - elapsed - 5) } else { 0 };
        part.add_event(offset, NOTE_ON, pitch as u8, Some(0));
    }

    part.add_event(5, CONTROL_CHANGE, CC_VOLUME, Some(master));
}
