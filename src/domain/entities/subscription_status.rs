use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Lifecycle state of a user's subscription.
///
/// Used as a state machine: a trial converts to a paid period or lapses,
/// a paid period lapses when billing is overdue, and an expired
/// subscription can be reactivated by paying.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[derive(Default)]
pub enum SubscriptionStatus {
    /// Time-boxed free period, started at registration
    #[default]
    Trial,
    /// Paid and within the current billing period
    Active,
    /// Trial or billing period lapsed
    Expired,
}

impl SubscriptionStatus {
    pub fn is_expired(&self) -> bool {
        matches!(self, SubscriptionStatus::Expired)
    }

    /// Valid transitions from this state
    pub fn valid_transitions(&self) -> &'static [SubscriptionStatus] {
        match self {
            SubscriptionStatus::Trial => &[SubscriptionStatus::Active, SubscriptionStatus::Expired],
            // Active -> Active covers plan changes and renewals inside a period
            SubscriptionStatus::Active => &[SubscriptionStatus::Active, SubscriptionStatus::Expired],
            SubscriptionStatus::Expired => &[SubscriptionStatus::Active],
        }
    }

    /// Check if transition to the given state is valid
    pub fn can_transition_to(&self, new_state: SubscriptionStatus) -> bool {
        self.valid_transitions().contains(&new_state)
    }
}
