use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Insurance line a lead was captured for.
///
/// Serialized with the kebab-case names below. The aliases are the labels
/// the first version of the site wrote into its stored blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeadCategory {
    Auto,
    #[serde(alias = "habitation")]
    Home,
    #[serde(alias = "sante")]
    Health,
    #[serde(alias = "animaux")]
    Pet,
    #[serde(alias = "rc-pro")]
    ProfessionalLiability,
}

impl LeadCategory {
    pub const ALL: [LeadCategory; 5] = [
        LeadCategory::Auto,
        LeadCategory::Home,
        LeadCategory::Health,
        LeadCategory::Pet,
        LeadCategory::ProfessionalLiability,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadCategory::Auto => "auto",
            LeadCategory::Home => "home",
            LeadCategory::Health => "health",
            LeadCategory::Pet => "pet",
            LeadCategory::ProfessionalLiability => "professional-liability",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LeadCategory::Auto => "Auto insurance",
            LeadCategory::Home => "Home insurance",
            LeadCategory::Health => "Health insurance",
            LeadCategory::Pet => "Pet insurance",
            LeadCategory::ProfessionalLiability => "Professional liability",
        }
    }
}

impl fmt::Display for LeadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "auto" => Ok(LeadCategory::Auto),
            "home" | "habitation" => Ok(LeadCategory::Home),
            "health" | "sante" => Ok(LeadCategory::Health),
            "pet" | "animaux" => Ok(LeadCategory::Pet),
            "professional-liability" | "rc-pro" => Ok(LeadCategory::ProfessionalLiability),
            _ => Err(CoreError::UnknownCategory(s.trim().to_string())),
        }
    }
}
