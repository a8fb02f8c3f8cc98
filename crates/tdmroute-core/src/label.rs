//! Pin and lane index extraction from topology labels.
//!
//! Route labels such as `"TDM_D17"` or `"Lane3"` carry the hardware index the
//! path selects. [`parse_index`] pulls that number out of the label.

/// Extracts the decimal number embedded anywhere in `label`.
///
/// Digits are accumulated in order of appearance; every other character is
/// skipped rather than treated as a separator, so `"a1b2"` yields `12`. A label
/// without digits yields `0`.
///
/// No range checking is done. Labels come from a fixed vocabulary of at most
/// 32 entries per topology; arithmetic wraps on absurdly long digit runs.
///
/// # Example
///
/// ```rust
/// use tdmroute_core::label::parse_index;
///
/// assert_eq!(parse_index("TDM_D17"), 17);
/// assert_eq!(parse_index("Lane7"), 7);
/// assert_eq!(parse_index("Switch"), 0);
/// ```
pub fn parse_index(label: &str) -> u32 {
    label
        .bytes()
        .filter(u8::is_ascii_digit)
        .fold(0u32, |acc, digit| {
            acc.wrapping_mul(10).wrapping_add(u32::from(digit - b'0'))
        })
}
