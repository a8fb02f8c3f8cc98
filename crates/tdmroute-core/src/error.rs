//! Routing failure taxonomy.
//!
//! Every failure is reported to the power-sequencing engine as a single
//! failure signal (see [`RouteError::errno`]); the variants carry the widget
//! name so the log line is enough to diagnose the topology.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::event::PowerEvent;
use crate::graph::WidgetId;

/// `EINVAL`, the status every routing failure maps to.
pub const EINVAL: i32 = 22;

/// Errors returned by routing event handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No connected path from the widget reaches a backend endpoint.
    ///
    /// Recoverable: the engine may retry once the graph is further connected.
    BackendNotFound {
        /// Routing widget the search started from.
        widget: String,
    },
    /// A backend was found but has no active playback stream.
    StreamNotFound {
        /// Routing widget the search started from.
        widget: String,
        /// DAI name of the backend that was found.
        backend: String,
    },
    /// An event outside the pre-power-up / pre-power-down contract.
    UnexpectedEvent {
        /// Widget the event was delivered to.
        widget: String,
        /// The offending event.
        event: PowerEvent,
    },
    /// The widget id does not exist or is not handled by this component.
    UnknownWidget(WidgetId),
}

impl RouteError {
    /// Returns the negative errno reported to the engine.
    pub const fn errno(&self) -> i32 {
        -EINVAL
    }

    /// Returns true for failures caused by a graph that is not fully
    /// connected yet, which the engine may retry.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::BackendNotFound { .. } | Self::StreamNotFound { .. }
        )
    }
}

impl core::fmt::Display for RouteError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BackendNotFound { widget } => {
                write!(f, "{widget}: no connected backend endpoint")
            }
            Self::StreamNotFound { widget, backend } => {
                write!(f, "{widget}: backend '{backend}' has no playback stream")
            }
            Self::UnexpectedEvent { widget, event } => {
                write!(f, "{widget}: unexpected event {event}")
            }
            Self::UnknownWidget(id) => write!(f, "widget {id} is not handled here"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RouteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "std"))]
    use alloc::string::ToString;

    #[test]
    fn every_error_maps_to_einval() {
        let errors = [
            RouteError::BackendNotFound {
                widget: "TDMA_OUT SEL".into(),
            },
            RouteError::StreamNotFound {
                widget: "TDMA_OUT SEL".into(),
                backend: "TDM-A".into(),
            },
            RouteError::UnexpectedEvent {
                widget: "Lane SRC".into(),
                event: PowerEvent::PostPowerUp,
            },
            RouteError::UnknownWidget(WidgetId(7)),
        ];
        for err in &errors {
            assert_eq!(err.errno(), -22);
        }
    }

    #[test]
    fn recoverable_classification() {
        assert!(
            RouteError::BackendNotFound {
                widget: "w".into()
            }
            .is_recoverable()
        );
        assert!(
            !RouteError::UnexpectedEvent {
                widget: "w".into(),
                event: PowerEvent::PostPowerDown,
            }
            .is_recoverable()
        );
    }

    #[test]
    fn display_names_the_widget() {
        let msg = RouteError::StreamNotFound {
            widget: "Lane SRC".into(),
            backend: "TDM-B".into(),
        }
        .to_string();
        assert_eq!(msg, "Lane SRC: backend 'TDM-B' has no playback stream");

        let msg = RouteError::UnexpectedEvent {
            widget: "OUT EN".into(),
            event: PowerEvent::PostPowerUp,
        }
        .to_string();
        assert_eq!(msg, "OUT EN: unexpected event post-pmu");
    }
}
