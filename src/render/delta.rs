//! Delta-time byte encoding for track events.
//!
//! The engine encodes a tick offset into at most two bytes: the low byte is
//! `ticks % 128`, and when `ticks / 128` is nonzero that quotient is emitted
//! first with the continuation marker (+128) applied. For offsets below
//! 16384 this coincides with the standard MIDI variable-length quantity; at
//! 16384 and above the marked quotient no longer fits in a byte and the
//! encoding wraps. That ceiling is part of the player compatibility contract
//! and is kept as-is — every offset the shipped generators produce at the
//! default resolution stays far below it. See `two_byte_ceiling` in the
//! render tests for the documented divergence from canonical VLQ.

/// Append the delta-time bytes for `ticks` to `out`.
pub fn push_delta(out: &mut Vec<u8>, ticks: u32) {
    let high = ticks / 128;
    if high > 0 {
        out.push((high + 128) as u8);
    }
    out.push((ticks % 128) as u8);
}

/// Read one delta-time value from the front of `bytes`.
///
/// Returns the decoded tick offset and how many bytes it occupied. The
/// counterpart of [`push_delta`] for offsets below the two-byte ceiling.
pub fn read_delta(bytes: &[u8]) -> (u32, usize) {
    if bytes[0] >= 128 {
        (((bytes[0] - 128) as u32) * 128 + bytes[1] as u32, 2)
    } else {
        (bytes[0] as u32, 1)
    }
}
