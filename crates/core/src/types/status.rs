//! Order status and the three-milestone progress projection.

use serde::{Deserialize, Serialize};

/// Error parsing an [`OrderStatus`] from its wire representation.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown order status: {0}")]
pub struct StatusParseError(pub String);

/// Order lifecycle status.
///
/// Transitions are server-authoritative; the storefront only reads the
/// current value and may request a cancellation while the order is still
/// [`cancellable`](Self::is_cancellable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Placed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// One of the three canonical progress milestones shown for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Milestone {
    Placed,
    Shipped,
    Delivered,
}

impl Milestone {
    /// All milestones, in progress order.
    pub const ALL: [Self; 3] = [Self::Placed, Self::Shipped, Self::Delivered];

    /// Position of this milestone on the progress line.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Placed => 0,
            Self::Shipped => 1,
            Self::Delivered => 2,
        }
    }

    /// Display label for the milestone.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Placed => "Placed",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl OrderStatus {
    /// Map the status onto the progress line.
    ///
    /// Processing is a sub-state between acceptance and shipment, so it
    /// projects onto the Placed milestone. Cancelled orders have no position
    /// on the line and are rendered as a terminal state instead.
    #[must_use]
    pub const fn milestone_index(&self) -> Option<usize> {
        match self {
            Self::Placed | Self::Processing => Some(0),
            Self::Shipped => Some(1),
            Self::Delivered => Some(2),
            Self::Cancelled => None,
        }
    }

    /// Whether `milestone` should be rendered as reached for this status.
    ///
    /// A milestone is reached iff its index is at most the status's own
    /// milestone index. Cancelled orders reach no milestone.
    #[must_use]
    pub const fn reaches(&self, milestone: Milestone) -> bool {
        match self.milestone_index() {
            Some(index) => milestone.index() <= index,
            None => false,
        }
    }

    /// Whether the storefront may request a cancellation.
    ///
    /// Only orders that have not shipped yet can be cancelled; the backend
    /// enforces the same rule and rejects anything else with a 400.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Placed | Self::Processing)
    }

    /// Whether this is a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// The wire representation used by the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "PLACED",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Display label for the status.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Placed => "Placed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLACED" => Ok(Self::Placed),
            "PROCESSING" => Ok(Self::Processing),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(StatusParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_is_monotonic() {
        // For the three canonical statuses, milestone i is reached iff the
        // status index is >= i.
        let canonical = [
            (OrderStatus::Placed, 0),
            (OrderStatus::Shipped, 1),
            (OrderStatus::Delivered, 2),
        ];
        for (status, status_index) in canonical {
            for milestone in Milestone::ALL {
                assert_eq!(
                    status.reaches(milestone),
                    milestone.index() <= status_index,
                    "{status:?} vs {milestone:?}"
                );
            }
        }
    }

    #[test]
    fn test_processing_projects_as_placed() {
        assert!(OrderStatus::Processing.reaches(Milestone::Placed));
        assert!(!OrderStatus::Processing.reaches(Milestone::Shipped));
        assert_eq!(
            OrderStatus::Processing.milestone_index(),
            OrderStatus::Placed.milestone_index()
        );
    }

    #[test]
    fn test_cancelled_reaches_no_milestone() {
        for milestone in Milestone::ALL {
            assert!(!OrderStatus::Cancelled.reaches(milestone));
        }
        assert_eq!(OrderStatus::Cancelled.milestone_index(), None);
    }

    #[test]
    fn test_cancellable_states() {
        assert!(OrderStatus::Placed.is_cancellable());
        assert!(OrderStatus::Processing.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"SHIPPED\"");
        let parsed: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("PENDING".parse::<OrderStatus>().is_err());
        assert_eq!(
            "PROCESSING".parse::<OrderStatus>().unwrap(),
            OrderStatus::Processing
        );
    }
}
