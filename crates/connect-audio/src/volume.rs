//! Hardware volume to mixer percent mapping.

/// Map a 16-bit hardware volume to an integer mixer percent.
///
/// The curve boosts low volumes and compresses the top of the range: below
/// 40% the value is scaled by 1.375, at or above 40% it is shifted down 15
/// points and the remaining headroom halved. All arithmetic truncates; the
/// result is clamped to 0..=100.
pub fn map_volume(raw: u16) -> u8 {
    // Exactly floor(raw / 655.35), without the float hazard.
    let p = u32::from(raw) * 100 / 65_535;
    let mixed = if p >= 40 {
        p - 15 + (100 - p) / 2
    } else {
        // 1.375 == 11/8
        p * 11 / 8
    };
    mixed.min(100) as u8
}
