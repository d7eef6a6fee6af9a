//! Order status and the single authoritative transition table.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use supplyflow_auth::Role;
use supplyflow_core::DomainError;

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Approved,
    Packed,
    Shipped,
    Delivered,
    Rejected,
    Cancelled,
}

/// Stock action that accompanies a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockEffect {
    None,
    /// Return every item's quantity to the ledger.
    ReleaseAll,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub actor: Role,
    pub effect: StockEffect,
}

const fn rule(from: OrderStatus, to: OrderStatus, actor: Role, effect: StockEffect) -> TransitionRule {
    TransitionRule {
        from,
        to,
        actor,
        effect,
    }
}

/// Every legal transition. Reservation is not listed: it happens once, when
/// the order is created.
///
/// Cancellation is admitted from every non-terminal status; narrowing that
/// further is the admin authorization layer's call.
pub const TRANSITIONS: &[TransitionRule] = &[
    rule(OrderStatus::Pending, OrderStatus::Approved, Role::Admin, StockEffect::None),
    rule(OrderStatus::Pending, OrderStatus::Rejected, Role::Admin, StockEffect::ReleaseAll),
    rule(OrderStatus::Approved, OrderStatus::Packed, Role::Warehouse, StockEffect::None),
    rule(OrderStatus::Packed, OrderStatus::Shipped, Role::Warehouse, StockEffect::None),
    rule(OrderStatus::Shipped, OrderStatus::Delivered, Role::Warehouse, StockEffect::None),
    rule(OrderStatus::Pending, OrderStatus::Cancelled, Role::Admin, StockEffect::ReleaseAll),
    rule(OrderStatus::Approved, OrderStatus::Cancelled, Role::Admin, StockEffect::ReleaseAll),
    rule(OrderStatus::Packed, OrderStatus::Cancelled, Role::Admin, StockEffect::ReleaseAll),
    rule(OrderStatus::Shipped, OrderStatus::Cancelled, Role::Admin, StockEffect::ReleaseAll),
];

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Approved,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Rejected,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Packed => "packed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Rejected | OrderStatus::Cancelled
        )
    }

    /// Look up the table row for `self -> to`, if any.
    pub fn rule_to(self, to: OrderStatus) -> Option<&'static TransitionRule> {
        TRANSITIONS.iter().find(|r| r.from == self && r.to == to)
    }

    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        self.rule_to(to).is_some()
    }

    /// Statuses `role` may move an order to from here.
    pub fn next_statuses_for(self, role: Role) -> Vec<OrderStatus> {
        TRANSITIONS
            .iter()
            .filter(|r| r.from == self && r.actor == role)
            .map(|r| r.to)
            .collect()
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown order status '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_have_no_outgoing_rows() {
        for st in OrderStatus::ALL.into_iter().filter(OrderStatus::is_terminal) {
            assert!(TRANSITIONS.iter().all(|r| r.from != st), "{st} has an outgoing row");
        }
    }

    #[test]
    fn every_non_terminal_status_can_be_cancelled_by_admin() {
        for st in OrderStatus::ALL.into_iter().filter(|s| !s.is_terminal()) {
            let r = st.rule_to(OrderStatus::Cancelled).unwrap();
            assert_eq!(r.actor, Role::Admin);
            assert_eq!(r.effect, StockEffect::ReleaseAll);
        }
    }

    #[test]
    fn only_negative_terminals_release_stock() {
        for r in TRANSITIONS {
            let releases = r.effect == StockEffect::ReleaseAll;
            let negative = matches!(r.to, OrderStatus::Rejected | OrderStatus::Cancelled);
            assert_eq!(releases, negative);
        }
    }

    #[test]
    fn warehouse_has_nothing_to_do_on_pending() {
        assert!(OrderStatus::Pending.next_statuses_for(Role::Warehouse).is_empty());
    }

    #[test]
    fn admin_choices_on_pending() {
        let next = OrderStatus::Pending.next_statuses_for(Role::Admin);
        assert_eq!(
            next,
            vec![OrderStatus::Approved, OrderStatus::Rejected, OrderStatus::Cancelled]
        );
    }

    #[test]
    fn parses_from_str() {
        assert_eq!(" Shipped ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn no_transition_skips_a_step() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Packed));
        assert!(!OrderStatus::Approved.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Packed.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Approved.can_transition_to(OrderStatus::Rejected));
    }
}
