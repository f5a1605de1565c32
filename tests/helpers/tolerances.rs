//! Tolerance constants for spectrum testing.

/// Floating point rounding errors (exact gain, passthrough).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Allowed error of a measured bin level against theory, in dB.
/// Covers Hamming scalloping loss for tones between bin centres.
pub const LEVEL_TOLERANCE_DB: f32 = 2.0;

/// Allowed distance between the strongest bin and the tone's exact bin position.
pub const BIN_TOLERANCE: f32 = 1.0;
