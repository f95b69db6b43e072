use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Priority of an action item, as extracted by the summarizer.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "action_priority")]
pub enum ActionPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    #[default]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

impl ActionPriority {
    /// Lenient parse for vendor-supplied priority strings; anything
    /// unrecognized falls back to Medium.
    pub fn parse_lenient(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "low" => ActionPriority::Low,
            "high" => ActionPriority::High,
            _ => ActionPriority::Medium,
        }
    }
}

impl std::fmt::Display for ActionPriority {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionPriority::Low => write!(fmt, "low"),
            ActionPriority::Medium => write!(fmt, "medium"),
            ActionPriority::High => write!(fmt, "high"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lenient_accepts_known_values_case_insensitively() {
        assert_eq!(ActionPriority::parse_lenient("HIGH"), ActionPriority::High);
        assert_eq!(ActionPriority::parse_lenient("low"), ActionPriority::Low);
    }

    #[test]
    fn parse_lenient_defaults_to_medium() {
        assert_eq!(
            ActionPriority::parse_lenient("urgent-ish"),
            ActionPriority::Medium
        );
        assert_eq!(ActionPriority::parse_lenient(""), ActionPriority::Medium);
    }
}
