//! TDM interface instance identification.
//!
//! The backend's DAI id is fixed for every TDM interface, so the instance
//! (A, B or C) is recovered from the name of the backend's playback widget.

use core::fmt;

/// One of the three TDM interface instances that can feed a pad or lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum TdmSource {
    /// TDM interface A (ordinal 0).
    #[default]
    A,
    /// TDM interface B (ordinal 1).
    B,
    /// TDM interface C (ordinal 2).
    C,
}

impl TdmSource {
    /// All instances in ordinal order.
    pub const ALL: [Self; 3] = [Self::A, Self::B, Self::C];

    /// Identifies the instance from a playback widget name.
    ///
    /// Matches the substrings `"TDM_A"`, `"TDM_B"`, `"TDM_C"` in that order.
    pub fn from_widget_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|source| name.contains(source.pattern()))
    }

    /// Identifies the instance, falling back to [`TdmSource::A`] when the name
    /// matches no known instance.
    pub fn from_widget_name_or_default(name: &str) -> Self {
        match Self::from_widget_name(name) {
            Some(source) => source,
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!("no TDM instance in backend widget '{name}', using TDM_A");
                Self::A
            }
        }
    }

    /// Returns the identifying substring.
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::A => "TDM_A",
            Self::B => "TDM_B",
            Self::C => "TDM_C",
        }
    }

    /// Returns the hardware ordinal written into select fields.
    pub const fn index(self) -> u32 {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
        }
    }
}

impl fmt::Display for TdmSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}
