use serde::{Deserialize, Serialize};

/// All orders are created in Indian rupees, amounts in paisa.
pub const CURRENCY: &str = "INR";

/// Static subscription plan catalog, compiled into the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Monthly,
    Quarterly,
    Yearly,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Monthly, Plan::Quarterly, Plan::Yearly];

    /// Looks a plan up by its wire name. Unknown names return `None`; both
    /// order creation and payment verification reject them.
    pub fn parse(name: &str) -> Option<Plan> {
        match name {
            "monthly" => Some(Plan::Monthly),
            "quarterly" => Some(Plan::Quarterly),
            "yearly" => Some(Plan::Yearly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Monthly => "monthly",
            Plan::Quarterly => "quarterly",
            Plan::Yearly => "yearly",
        }
    }

    /// Price in currency minor units (paisa).
    pub fn price_minor_units(&self) -> i64 {
        match self {
            Plan::Monthly => 19900,
            Plan::Quarterly => 39900,
            Plan::Yearly => 69900,
        }
    }

    /// Length of the granted premium window.
    pub fn duration_days(&self) -> i64 {
        match self {
            Plan::Monthly => 30,
            Plan::Quarterly => 90,
            Plan::Yearly => 180,
        }
    }

    pub fn names() -> Vec<&'static str> {
        Plan::ALL.iter().map(Plan::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_plans() {
        assert_eq!(Plan::parse("monthly"), Some(Plan::Monthly));
        assert_eq!(Plan::parse("quarterly"), Some(Plan::Quarterly));
        assert_eq!(Plan::parse("yearly"), Some(Plan::Yearly));
    }

    #[test]
    fn parse_rejects_unknown_plan() {
        assert_eq!(Plan::parse("weekly"), None);
        assert_eq!(Plan::parse("Monthly"), None);
        assert_eq!(Plan::parse(""), None);
    }

    #[test]
    fn catalog_prices() {
        assert_eq!(Plan::Monthly.price_minor_units(), 19900);
        assert_eq!(Plan::Quarterly.price_minor_units(), 39900);
        assert_eq!(Plan::Yearly.price_minor_units(), 69900);
    }

    #[test]
    fn catalog_durations() {
        assert_eq!(Plan::Monthly.duration_days(), 30);
        assert_eq!(Plan::Quarterly.duration_days(), 90);
        assert_eq!(Plan::Yearly.duration_days(), 180);
    }

    #[test]
    fn names_cover_the_whole_catalog() {
        assert_eq!(Plan::names(), vec!["monthly", "quarterly", "yearly"]);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Plan::Quarterly).unwrap(), "\"quarterly\"");
        let plan: Plan = serde_json::from_str("\"yearly\"").unwrap();
        assert_eq!(plan, Plan::Yearly);
    }
}
