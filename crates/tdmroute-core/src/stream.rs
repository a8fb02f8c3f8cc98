//! Backend endpoints and their playback stream geometry.
//!
//! A [`BackendEndpoint`] is the hardware TDM interface instance driving a
//! playback path. While it is powered for playback it carries a [`Stream`]
//! describing channel/slot geometry and the clocks of its [`Interface`].
//! Resolvers read the stream fresh on every event; geometry can change between
//! activations.

#[cfg(not(feature = "std"))]
use alloc::string::String;

/// Clocks of the TDM interface owning a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Master (frame reference) clock name, e.g. `"mst_a_mclk"`.
    pub mclk: String,
    /// Serial bit clock name, e.g. `"mst_a_sclk"`.
    pub sclk: String,
}

impl Interface {
    /// Creates an interface description from its two clock names.
    pub fn new(mclk: impl Into<String>, sclk: impl Into<String>) -> Self {
        Self {
            mclk: mclk.into(),
            sclk: sclk.into(),
        }
    }
}

/// Playback descriptor of an active backend endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    /// Number of audio channels in the stream.
    pub channels: u32,
    /// Number of time slots per TDM frame on one lane.
    pub slots: u32,
    /// Interface the stream runs on.
    pub iface: Interface,
}

impl Stream {
    /// Creates a stream descriptor.
    pub fn new(channels: u32, slots: u32, iface: Interface) -> Self {
        Self {
            channels,
            slots,
            iface,
        }
    }

    /// Number of data lanes needed to carry every channel.
    pub fn lane_count(&self) -> u32 {
        lane_count(self.channels, self.slots)
    }
}

/// Returns `ceil(channels / slots)` in integer arithmetic.
///
/// Both arguments are positive for a live stream; zero channels is treated as
/// one and zero slots as one rather than faulting.
///
/// ```rust
/// use tdmroute_core::lane_count;
///
/// assert_eq!(lane_count(8, 4), 2);
/// assert_eq!(lane_count(1, 8), 1);
/// assert_eq!(lane_count(9, 4), 3);
/// ```
pub const fn lane_count(channels: u32, slots: u32) -> u32 {
    let slots = if slots == 0 { 1 } else { slots };
    channels.saturating_sub(1) / slots + 1
}

/// The hardware interface behind a backend endpoint widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    name: String,
    id: u32,
    playback_widget: String,
    playback: Option<Stream>,
}

impl BackendEndpoint {
    /// Creates an idle endpoint.
    ///
    /// # Arguments
    ///
    /// * `name` - DAI name of the endpoint
    /// * `id` - DAI id; TDM interfaces use [`TDM_IFACE`](crate::TDM_IFACE)
    /// * `playback_widget` - Name of the widget representing its playback stream
    pub fn new(name: impl Into<String>, id: u32, playback_widget: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id,
            playback_widget: playback_widget.into(),
            playback: None,
        }
    }

    /// Attaches a playback stream.
    pub fn with_playback(mut self, stream: Stream) -> Self {
        self.playback = Some(stream);
        self
    }

    /// DAI name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// DAI id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Name of the playback stream widget.
    pub fn playback_widget(&self) -> &str {
        &self.playback_widget
    }

    /// The active playback stream, if the endpoint is powered for playback.
    pub fn playback(&self) -> Option<&Stream> {
        self.playback.as_ref()
    }

    pub(crate) fn set_playback(&mut self, stream: Option<Stream>) {
        self.playback = stream;
    }
}
