//! Clock name to hardware select value mapping.
//!
//! Master clock dividers on the audio block are named `mst_a` through `mst_f`.
//! Clock select fields take the divider's ordinal.

/// Divider name fragments, in select-value order.
pub const CLOCK_PATTERNS: [&str; 6] = ["mst_a", "mst_b", "mst_c", "mst_d", "mst_e", "mst_f"];

/// Returns the select value for a clock named `name`.
///
/// The first pattern of [`CLOCK_PATTERNS`] contained in `name` wins. Names
/// that match nothing resolve to `0`, which aliases the first divider; callers
/// that need to tell the two apart use [`try_resolve`].
///
/// ```rust
/// use tdmroute_core::clock;
///
/// assert_eq!(clock::resolve("mst_c_top"), 2);
/// assert_eq!(clock::resolve("unknown_clk"), 0);
/// ```
pub fn resolve(name: &str) -> u32 {
    try_resolve(name).unwrap_or(0)
}

/// Returns the select value for `name`, or `None` if no pattern matches.
pub fn try_resolve(name: &str) -> Option<u32> {
    CLOCK_PATTERNS
        .iter()
        .position(|pattern| name.contains(pattern))
        .map(|id| id as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_divider_resolves_to_its_ordinal() {
        for (id, pattern) in CLOCK_PATTERNS.iter().enumerate() {
            assert_eq!(resolve(pattern), id as u32);
        }
    }

    #[test]
    fn pattern_may_appear_anywhere() {
        assert_eq!(resolve("mst_c_top"), 2);
        assert_eq!(resolve("clkc_audio_mst_e_sclk"), 4);
    }

    #[test]
    fn unknown_name_falls_back_to_zero() {
        assert_eq!(resolve("unknown_clk"), 0);
        assert_eq!(try_resolve("unknown_clk"), None);
    }

    #[test]
    fn earlier_pattern_wins() {
        // Contrived name containing two fragments.
        assert_eq!(resolve("mst_f_from_mst_b"), 1);
    }
}
