use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Identifier of a plan in the static catalog.
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
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PlanId {
    Basic,
    Professional,
    Enterprise,
}

impl PlanId {
    /// Catalog entry for this plan.
    pub fn plan(&self) -> &'static SubscriptionPlan {
        match self {
            PlanId::Basic => &PLANS[0],
            PlanId::Professional => &PLANS[1],
            PlanId::Enterprise => &PLANS[2],
        }
    }

    /// Numeric rank used to tell upgrades from downgrades.
    pub fn rank(&self) -> u8 {
        match self {
            PlanId::Basic => 0,
            PlanId::Professional => 1,
            PlanId::Enterprise => 2,
        }
    }

    pub fn is_upgrade_from(&self, current: PlanId) -> bool {
        self.rank() > current.rank()
    }
}

impl Default for PlanId {
    fn default() -> Self {
        PlanId::Basic
    }
}

/// Maximum number of non-archived clients a plan permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "limit", rename_all = "snake_case")]
pub enum ClientQuota {
    Limited(u32),
    Unlimited,
}

impl ClientQuota {
    pub fn limit(&self) -> Option<u32> {
        match self {
            ClientQuota::Limited(limit) => Some(*limit),
            ClientQuota::Unlimited => None,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, ClientQuota::Unlimited)
    }

    /// Whether one more client fits when `current` non-archived clients exist.
    pub fn allows_another(&self, current: usize) -> bool {
        match self {
            ClientQuota::Limited(limit) => current < *limit as usize,
            ClientQuota::Unlimited => true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: PlanId,
    pub name: &'static str,
    pub price_label: &'static str,
    /// Monthly price in kuruş.
    pub price_cents: i64,
    pub currency: &'static str,
    pub client_quota: ClientQuota,
    pub features: &'static [&'static str],
}

const PLANS: [SubscriptionPlan; 3] = [
    SubscriptionPlan {
        id: PlanId::Basic,
        name: "Temel",
        price_label: "₺299/ay",
        price_cents: 29_900,
        currency: "TRY",
        client_quota: ClientQuota::Limited(25),
        features: &[
            "25 danışana kadar",
            "Randevu takvimi",
            "Diyet planı şablonları",
            "E-posta desteği",
        ],
    },
    SubscriptionPlan {
        id: PlanId::Professional,
        name: "Profesyonel",
        price_label: "₺599/ay",
        price_cents: 59_900,
        currency: "TRY",
        client_quota: ClientQuota::Limited(100),
        features: &[
            "100 danışana kadar",
            "Randevu takvimi",
            "Sınırsız diyet planı",
            "Tarif kütüphanesi",
            "Blog yayınlama",
            "Öncelikli destek",
        ],
    },
    SubscriptionPlan {
        id: PlanId::Enterprise,
        name: "Kurumsal",
        price_label: "₺1.299/ay",
        price_cents: 129_900,
        currency: "TRY",
        client_quota: ClientQuota::Unlimited,
        features: &[
            "Sınırsız danışan",
            "Çoklu diyetisyen hesabı",
            "Gelişmiş raporlama",
            "Özel alan adı",
            "7/24 destek",
        ],
    },
];

/// The full plan catalog in display order.
pub fn catalog() -> Vec<&'static SubscriptionPlan> {
    PlanId::iter().map(|id| id.plan()).collect()
}
