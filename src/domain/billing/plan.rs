//! Static plan catalog.
//!
//! The three plans are immutable reference data compiled into the
//! binary. Prices are in paise (INR smallest unit); a limit of `-1`
//! means unlimited.

use crate::domain::foundation::ValidationError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel limit value meaning "no limit".
pub const UNLIMITED: i64 = -1;

/// Subscription tier written to the user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
    Enterprise,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            "enterprise" => Ok(PlanTier::Enterprise),
            other => Err(ValidationError::invalid_format(
                "plan_tier",
                format!("unknown tier '{}'", other),
            )),
        }
    }
}

/// Billing cycle chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(BillingCycle::Monthly),
            "yearly" => Ok(BillingCycle::Yearly),
            other => Err(ValidationError::invalid_format(
                "billing_cycle",
                format!("expected 'monthly' or 'yearly', got '{}'", other),
            )),
        }
    }
}

/// A metered resource that plans put a ceiling on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageResource {
    TranscriptionHours,
    MaxFileSizeMb,
    MaxProjects,
}

impl UsageResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageResource::TranscriptionHours => "transcription_hours",
            UsageResource::MaxFileSizeMb => "max_file_size_mb",
            UsageResource::MaxProjects => "max_projects",
        }
    }
}

impl FromStr for UsageResource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transcription_hours" => Ok(UsageResource::TranscriptionHours),
            "max_file_size_mb" => Ok(UsageResource::MaxFileSizeMb),
            "max_projects" => Ok(UsageResource::MaxProjects),
            other => Err(ValidationError::invalid_format(
                "resource",
                format!("unknown usage resource '{}'", other),
            )),
        }
    }
}

/// Per-plan resource ceilings. `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub transcription_hours: i64,
    pub max_file_size_mb: i64,
    pub max_projects: i64,
}

impl PlanLimits {
    /// Returns the ceiling for a resource.
    pub fn limit_for(&self, resource: UsageResource) -> i64 {
        match resource {
            UsageResource::TranscriptionHours => self.transcription_hours,
            UsageResource::MaxFileSizeMb => self.max_file_size_mb,
            UsageResource::MaxProjects => self.max_projects,
        }
    }

    /// Returns true if the resource has no ceiling on this plan.
    pub fn is_unlimited(&self, resource: UsageResource) -> bool {
        self.limit_for(resource) == UNLIMITED
    }
}

/// One entry in the plan catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// Stable slug used as the plan id ("free", "pro", "enterprise").
    pub id: &'static str,
    pub name: &'static str,
    pub tier: PlanTier,
    /// Price per month in paise. Zero for the free plan.
    pub price_monthly: i64,
    /// Price per year in paise.
    pub price_yearly: i64,
    pub currency: &'static str,
    pub features: &'static [&'static str],
    pub limits: PlanLimits,
}

impl Plan {
    /// Returns the price for the given billing cycle.
    pub fn price_for(&self, cycle: BillingCycle) -> i64 {
        match cycle {
            BillingCycle::Monthly => self.price_monthly,
            BillingCycle::Yearly => self.price_yearly,
        }
    }

    /// Returns true for the zero-price plan.
    pub fn is_free(&self) -> bool {
        self.price_monthly == 0 && self.price_yearly == 0
    }
}

/// The full catalog, ordered free to enterprise.
pub static PLAN_CATALOG: Lazy<Vec<Plan>> = Lazy::new(|| {
    vec![
        Plan {
            id: "free",
            name: "Free",
            tier: PlanTier::Free,
            price_monthly: 0,
            price_yearly: 0,
            currency: "INR",
            features: &[
                "3 hours of transcription per month",
                "Files up to 25 MB",
                "Up to 3 projects",
            ],
            limits: PlanLimits {
                transcription_hours: 3,
                max_file_size_mb: 25,
                max_projects: 3,
            },
        },
        Plan {
            id: "pro",
            name: "Pro",
            tier: PlanTier::Pro,
            price_monthly: 999_00,
            price_yearly: 9990_00,
            currency: "INR",
            features: &[
                "30 hours of transcription per month",
                "Files up to 200 MB",
                "Up to 25 projects",
                "Priority processing",
            ],
            limits: PlanLimits {
                transcription_hours: 30,
                max_file_size_mb: 200,
                max_projects: 25,
            },
        },
        Plan {
            id: "enterprise",
            name: "Enterprise",
            tier: PlanTier::Enterprise,
            price_monthly: 4999_00,
            price_yearly: 49990_00,
            currency: "INR",
            features: &[
                "Unlimited transcription",
                "No file size limit",
                "Unlimited projects",
                "Priority processing",
                "Dedicated support",
            ],
            limits: PlanLimits {
                transcription_hours: UNLIMITED,
                max_file_size_mb: UNLIMITED,
                max_projects: UNLIMITED,
            },
        },
    ]
});

/// Looks up a plan by its slug.
pub fn find_plan(id: &str) -> Option<&'static Plan> {
    PLAN_CATALOG.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_contains_three_plans() {
        assert_eq!(PLAN_CATALOG.len(), 3);
        assert!(find_plan("free").is_some());
        assert!(find_plan("pro").is_some());
        assert!(find_plan("enterprise").is_some());
        assert!(find_plan("platinum").is_none());
    }

    #[test]
    fn free_plan_has_zero_price() {
        let free = find_plan("free").unwrap();
        assert!(free.is_free());
        assert_eq!(free.tier, PlanTier::Free);
    }

    #[test]
    fn enterprise_limits_are_all_unlimited() {
        let ent = find_plan("enterprise").unwrap();
        assert!(ent.limits.is_unlimited(UsageResource::TranscriptionHours));
        assert!(ent.limits.is_unlimited(UsageResource::MaxFileSizeMb));
        assert!(ent.limits.is_unlimited(UsageResource::MaxProjects));
    }

    #[test]
    fn pro_plan_price_differs_by_cycle() {
        let pro = find_plan("pro").unwrap();
        assert_eq!(pro.price_for(BillingCycle::Monthly), 999_00);
        assert_eq!(pro.price_for(BillingCycle::Yearly), 9990_00);
    }

    #[test]
    fn limit_for_maps_each_resource() {
        let pro = find_plan("pro").unwrap();
        assert_eq!(pro.limits.limit_for(UsageResource::TranscriptionHours), 30);
        assert_eq!(pro.limits.limit_for(UsageResource::MaxFileSizeMb), 200);
        assert_eq!(pro.limits.limit_for(UsageResource::MaxProjects), 25);
    }

    #[test]
    fn usage_resource_parses_from_path_segment() {
        assert_eq!(
            "transcription_hours".parse::<UsageResource>().unwrap(),
            UsageResource::TranscriptionHours
        );
        assert!("gpu_minutes".parse::<UsageResource>().is_err());
    }

    #[test]
    fn billing_cycle_rejects_unknown_value() {
        assert!("weekly".parse::<BillingCycle>().is_err());
        assert_eq!(
            "yearly".parse::<BillingCycle>().unwrap(),
            BillingCycle::Yearly
        );
    }

    #[test]
    fn plan_tier_roundtrips_through_str() {
        for tier in [PlanTier::Free, PlanTier::Pro, PlanTier::Enterprise] {
            assert_eq!(tier.as_str().parse::<PlanTier>().unwrap(), tier);
        }
    }
}
