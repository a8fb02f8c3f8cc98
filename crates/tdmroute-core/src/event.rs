//! Power-sequencing events and the component handler seam.
//!
//! The power-sequencing engine powers widgets up and down and notifies the
//! owning component before each transition. Routing components only react to
//! [`PowerEvent::PrePowerUp`] and [`PowerEvent::PrePowerDown`]; any other event
//! reaching them is an integration bug and is reported as
//! [`RouteError::UnexpectedEvent`].

use core::fmt;
use core::str::FromStr;

use crate::error::RouteError;
use crate::graph::{AudioGraph, WidgetId};
use crate::regmap::RegisterMap;

/// A power transition notification for one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerEvent {
    /// The widget is about to be powered up.
    PrePowerUp,
    /// The widget has been powered up.
    PostPowerUp,
    /// The widget is about to be powered down.
    PrePowerDown,
    /// The widget has been powered down.
    PostPowerDown,
}

impl PowerEvent {
    /// All events in flag order.
    pub const ALL: [Self; 4] = [
        Self::PrePowerUp,
        Self::PostPowerUp,
        Self::PrePowerDown,
        Self::PostPowerDown,
    ];

    /// Returns the engine's flag value for this event.
    pub const fn raw(self) -> u32 {
        match self {
            Self::PrePowerUp => 0x1,
            Self::PostPowerUp => 0x2,
            Self::PrePowerDown => 0x4,
            Self::PostPowerDown => 0x8,
        }
    }

    /// Decodes an engine flag value. Returns `None` for values that are not
    /// exactly one known flag.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.raw() == raw)
    }

    /// Short name used in logs and scenario files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PrePowerUp => "pre-pmu",
            Self::PostPowerUp => "post-pmu",
            Self::PrePowerDown => "pre-pmd",
            Self::PostPowerDown => "post-pmd",
        }
    }

    /// Returns true for the two events routing components accept.
    pub const fn is_routing_event(self) -> bool {
        matches!(self, Self::PrePowerUp | Self::PrePowerDown)
    }
}

impl fmt::Display for PowerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseEventError;

impl fmt::Display for ParseEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected one of pre-pmu, post-pmu, pre-pmd, post-pmd")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseEventError {}

impl FromStr for PowerEvent {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.name().eq_ignore_ascii_case(s))
            .ok_or(ParseEventError)
    }
}

/// Resolution state of a routing component.
///
/// `Idle → Resolving` on pre-power-up, then `Applied` or `Failed`. A failure
/// only concerns that one event: the next event is handled as if from `Idle`.
/// Pre-power-down returns the component to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverState {
    /// No routing applied.
    #[default]
    Idle,
    /// A pre-power-up event is being handled.
    Resolving,
    /// The last pre-power-up event applied its routing.
    Applied,
    /// The last pre-power-up event could not determine the routing.
    Failed,
}

/// A routing component reacting to power events on the widgets it owns.
///
/// Handlers run synchronously to completion; the engine serializes events for
/// a path set, so implementations need no locking. The trait is object-safe so
/// a card can hold several components as `Box<dyn Component>`.
pub trait Component {
    /// Returns true if `widget` has an event handler in this component.
    fn handles(&self, widget: WidgetId) -> bool;

    /// Handles `event` delivered to `widget`.
    ///
    /// A returned error vetoes the power transition.
    fn handle_event(
        &mut self,
        graph: &dyn AudioGraph,
        regmap: &mut dyn RegisterMap,
        widget: WidgetId,
        event: PowerEvent,
    ) -> Result<(), RouteError>;

    /// Current resolution state.
    fn state(&self) -> ResolverState;
}
