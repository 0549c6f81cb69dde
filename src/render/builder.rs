//! # Part Builder
//!
//! The append-only event accumulator behind every rendered part.
//!
//! ## Lifecycle
//! A [`PartBuilder`] is created fresh for each generation call, carried
//! through `init()` → generator functions → `finish()`, and then consumed
//! with [`PartBuilder::into_tracks`]. All timing state (current track,
//! accumulated absolute time, loop markers, ringing notes) lives on the
//! builder itself and dies with it; nothing persists across requests.
//!
//! ## Event Encoding
//! Events are serialized as they are appended: delta-time bytes (see
//! [`super::delta`]), the status byte, the first data byte, and the second
//! data byte when the message has one. A `None` second byte means a 2-byte
//! message such as a program change.

use crate::params::{Countoff, SoundParams};
use crate::render::delta;

/// Note-on status for channel 0; add the channel number for others.
pub const NOTE_ON: u8 = 0x90;
/// Control-change status for channel 0.
pub const CONTROL_CHANGE: u8 = 0xB0;
/// Program-change status for channel 0.
pub const PROGRAM_CHANGE: u8 = 0xC0;
/// Pitch-bend status for channel 0.
pub const PITCH_BEND: u8 = 0xE0;

/// Channel volume controller.
pub const CC_VOLUME: u8 = 7;
/// All-sound-off controller.
pub const CC_ALL_SOUND_OFF: u8 = 120;
/// All-notes-off controller.
pub const CC_ALL_NOTES_OFF: u8 = 123;

struct TrackBuf {
    bytes: Vec<u8>,
    loop_start: usize,
    loop_end: usize,
}

/// Accumulates serialized MIDI events for one part, across one or more
/// output tracks.
pub struct PartBuilder {
    tracks: Vec<TrackBuf>,
    track_ix: usize,
    channels: Vec<Vec<u8>>,
    time_sig: u32,
    ticks_per_beat: u32,
    beats_total: u32,
    countoff: Countoff,
    loop_count: u32,
    patch: u8,
    master_volume: u8,
    base_note: [i32; 6],
    drum_channel: u8,
    base_offset_ticks: u32,
    leave_room_ticks: u32,
    init_rest_ticks: u32,
    swing: u32,
    swing_adjust_ticks: i32,
    fill_out: bool,
    measure_end: i32,
    resolution: u32,
    current_step: u32,
    abs_time: u32,
    sustaining: Vec<(u8, u8)>,
}

impl PartBuilder {
    /// Create a builder for the given settings, with one empty track per
    /// channel list in `params.channels`.
    pub fn new(params: &SoundParams) -> Self {
        let tracks = params
            .channels
            .iter()
            .map(|_| TrackBuf {
                bytes: Vec::new(),
                loop_start: 0,
                loop_end: 0,
            })
            .collect();
        PartBuilder {
            tracks,
            track_ix: 0,
            channels: params.channels.clone(),
            time_sig: params.time_sig,
            ticks_per_beat: params.ticks_per_beat,
            beats_total: params.beats_total,
            countoff: params.countoff,
            loop_count: params.loop_count,
            patch: params.patch,
            master_volume: params.master_volume,
            base_note: params.base_note,
            drum_channel: params.drum_channel,
            base_offset_ticks: params.base_offset_ticks,
            leave_room_ticks: params.leave_room_ticks,
            init_rest_ticks: params.init_rest_ticks,
            swing: params.swing,
            swing_adjust_ticks: 0,
            fill_out: params.fill_out,
            measure_end: params.measure_end,
            resolution: params.resolution,
            current_step: 0,
            abs_time: 0,
            sustaining: Vec::new(),
        }
    }

    /// Append one event to the current track.
    ///
    /// `data2` of `None` emits a 2-byte message (status + one data byte);
    /// `Some` emits the full 3-byte form.
    pub fn add_event(&mut self, delta_ticks: u32, status: u8, data1: u8, data2: Option<u8>) {
        let bytes = &mut self.tracks[self.track_ix].bytes;
        delta::push_delta(bytes, delta_ticks);
        bytes.push(status);
        bytes.push(data1);
        if let Some(d2) = data2 {
            bytes.push(d2);
        }
    }

    /// Emit the opening events for every track: channel resets, the muted
    /// preamble, the lead-in offset, per-channel setup, and the loop-start
    /// markers.
    pub fn init(&mut self) {
        if self.init_rest_ticks > 0 {
            self.silence_preamble();
        }

        // Lead-in offset: a full countoff measure less the room we leave so
        // the first attack lands on the beat.
        let mut time_offset = self.base_offset_ticks;
        if self.countoff.is_active() {
            time_offset += (self.time_sig * self.ticks_per_beat).saturating_sub(self.leave_room_ticks);
        }

        self.swing_adjust_ticks =
            (((self.swing as f64 - 50.0) / 100.0) * self.ticks_per_beat as f64).floor() as i32;

        for ix in 0..self.tracks.len() {
            self.track_ix = ix;
            let lead = self.lead_channel(ix);
            self.add_event(time_offset, CONTROL_CHANGE + lead, CC_VOLUME, Some(self.master_volume));

            // Record where this track starts for looping purposes.
            self.tracks[ix].loop_start = self.tracks[ix].bytes.len();

            for ci in 0..self.channels[ix].len() {
                let chan = self.channels[ix][ci];
                self.add_event(0, CONTROL_CHANGE + chan, CC_VOLUME, Some(self.master_volume));
                self.add_event(0, PITCH_BEND + chan, 64, Some(64));
                if chan != self.drum_channel {
                    self.add_event(0, PROGRAM_CHANGE + chan, self.patch, None);
                }
            }
        }

        self.abs_time += time_offset;
    }

    /// Emit the muted rest that opens each track: every channel silenced and
    /// pulled to zero volume, a rest, then the lead channel restored to the
    /// master volume.
    pub fn silence_preamble(&mut self) {
        for ix in 0..self.tracks.len() {
            self.track_ix = ix;
            for ci in 0..self.channels[ix].len() {
                let chan = self.channels[ix][ci];
                self.add_event(0, CONTROL_CHANGE + chan, CC_ALL_NOTES_OFF, Some(0));
                self.add_event(0, CONTROL_CHANGE + chan, CC_VOLUME, Some(0));
            }
            let lead = self.lead_channel(ix);
            self.add_event(self.init_rest_ticks, CONTROL_CHANGE + lead, CC_VOLUME, Some(0));
            self.add_event(
                self.init_rest_ticks,
                CONTROL_CHANGE + lead,
                CC_VOLUME,
                Some(self.master_volume),
            );
        }
    }

    /// Emit the closing events for every track: the trailing hold, forced
    /// note-offs for anything still ringing, the fill-out pad, loop
    /// duplication, and the final channel shutdown.
    pub fn finish(&mut self) {
        // Without a countoff the room we left at the front is returned at
        // the end instead.
        let time_offset = if self.countoff.is_active() {
            0
        } else {
            self.leave_room_ticks
        };
        for ix in 0..self.tracks.len() {
            self.track_ix = ix;
            let lead = self.lead_channel(ix);
            self.add_event(time_offset, CONTROL_CHANGE + lead, CC_VOLUME, Some(self.master_volume));
        }

        // Anything still registered as ringing gets a note-off now, newest
        // first.
        while let Some((chan, note)) = self.sustaining.pop() {
            self.add_event(0, NOTE_ON + chan, note, Some(0));
        }

        if self.fill_out {
            let done = (self.current_step / self.resolution) as i64;
            let fill_measures = self.measure_end as i64 - done;
            if fill_measures > 0 {
                let hold = fill_measures as u32 * self.time_sig * self.ticks_per_beat;
                for ix in 0..self.tracks.len() {
                    self.track_ix = ix;
                    let lead = self.lead_channel(ix);
                    self.add_event(hold, CONTROL_CHANGE + lead, CC_VOLUME, Some(self.master_volume));
                }
            }
        }

        self.apply_loop();

        // A two-beat tail, then silence every channel for good.
        let lead = self.lead_channel(self.track_ix);
        self.add_event(
            2 * self.ticks_per_beat,
            CONTROL_CHANGE + lead,
            CC_VOLUME,
            Some(self.master_volume),
        );
        for ix in 0..self.tracks.len() {
            self.track_ix = ix;
            for ci in 0..self.channels[ix].len() {
                let chan = self.channels[ix][ci];
                self.add_event(0, CONTROL_CHANGE + chan, CC_ALL_NOTES_OFF, Some(0));
                self.add_event(0, CONTROL_CHANGE + chan, CC_ALL_SOUND_OFF, Some(0));
            }
        }
    }

    /// Record the loop-end markers and append `loop_count` copies of each
    /// track's loop region.
    pub fn apply_loop(&mut self) {
        for track in &mut self.tracks {
            track.loop_end = track.bytes.len();
            let region = track.bytes[track.loop_start..track.loop_end].to_vec();
            for _ in 0..self.loop_count {
                track.bytes.extend_from_slice(&region);
            }
        }
    }

    /// Mark the current length of the current track as its loop start.
    /// Parts that run their own init (the click) call this directly.
    pub fn mark_loop_start(&mut self) {
        let track = &mut self.tracks[self.track_ix];
        track.loop_start = track.bytes.len();
    }

    /// Loop region byte offsets `(start, end)` recorded for a track.
    pub fn loop_region(&self, track: usize) -> (usize, usize) {
        (self.tracks[track].loop_start, self.tracks[track].loop_end)
    }

    /// Switch subsequent events onto another track.
    pub fn select_track(&mut self, track: usize) {
        self.track_ix = track;
    }

    /// Register a sounding note so `finish()` can force it off if the
    /// generator never releases it.
    pub fn mark_sustain(&mut self, channel: u8, note: u8) {
        self.sustaining.push((channel, note));
    }

    /// Drop a previously registered note once its note-off is emitted.
    pub fn clear_sustain(&mut self, channel: u8, note: u8) {
        if let Some(pos) = self
            .sustaining
            .iter()
            .rposition(|&(c, n)| c == channel && n == note)
        {
            self.sustaining.remove(pos);
        }
    }

    /// Advance the step counter used by the fill-out policy. Sequence-style
    /// parts call this as they consume progression steps.
    pub fn advance_step(&mut self, steps: u32) {
        self.current_step += steps;
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn time_sig(&self) -> u32 {
        self.time_sig
    }

    pub fn ticks_per_beat(&self) -> u32 {
        self.ticks_per_beat
    }

    pub fn beats_total(&self) -> u32 {
        self.beats_total
    }

    pub fn countoff(&self) -> Countoff {
        self.countoff
    }

    pub fn master_volume(&self) -> u8 {
        self.master_volume
    }

    pub fn base_note(&self) -> [i32; 6] {
        self.base_note
    }

    pub fn init_rest_ticks(&self) -> u32 {
        self.init_rest_ticks
    }

    /// Tick adjustment derived from the swing percentage during `init()`;
    /// negative when the swing is laid back below straight time.
    pub fn swing_adjust_ticks(&self) -> i32 {
        self.swing_adjust_ticks
    }

    /// Absolute ticks accumulated by the lifecycle so far. Custom parts can
    /// use this to position their own events against the lead-in.
    pub fn elapsed_ticks(&self) -> u32 {
        self.abs_time
    }

    /// Finalized event bytes, one buffer per track, consuming the builder.
    pub fn into_tracks(self) -> Vec<Vec<u8>> {
        self.tracks.into_iter().map(|t| t.bytes).collect()
    }

    fn lead_channel(&self, track: usize) -> u8 {
        self.channels[track][0]
    }
}
