/// Level reported for a silent buffer.
pub const SILENCE_DB: f32 = -90.0;

/// Peak level of a 16-bit PCM buffer in dB relative to full scale.
///
/// Returns `None` for an empty buffer.
pub fn decibels(samples: &[i16]) -> Option<f32> {
    let peak = *samples.iter().max()?;
    if peak > 0 {
        Some((20.0 * (f64::from(peak) / f64::from(i16::MAX)).log10()) as f32)
    } else {
        Some(SILENCE_DB)
    }
}
