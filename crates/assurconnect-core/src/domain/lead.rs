use crate::domain::{LeadCategory, LeadId, LeadStatus, Payload};
use crate::time::iso_millis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One captured quote request, as persisted locally and as sent to the
/// category webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    #[serde(alias = "type")]
    pub category: LeadCategory,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "data")]
    pub payload: Payload,
    #[serde(default)]
    pub status: LeadStatus,
}

impl Lead {
    pub fn new(category: LeadCategory, payload: Payload, created_at: DateTime<Utc>) -> Self {
        Self {
            id: LeadId::new(),
            category,
            created_at,
            payload,
            status: LeadStatus::New,
        }
    }

    pub fn first_name(&self) -> Option<&str> {
        self.payload.get_str("firstName")
    }
}

#[cfg(test)]
mod tests {
    use super::Lead;
    use crate::domain::{LeadCategory, LeadStatus, Payload};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    #[test]
    fn serializes_with_wire_field_names() {
        let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let lead = Lead::new(
            LeadCategory::Auto,
            Payload::new().with("firstName", "Jean"),
            created_at,
        );
        let value: Value = serde_json::to_value(&lead).expect("serialize");
        assert_eq!(value["id"], json!(lead.id.to_string()));
        assert_eq!(value["category"], json!("auto"));
        assert_eq!(value["createdAt"], json!("2026-03-01T09:30:00.000Z"));
        assert_eq!(value["payload"]["firstName"], json!("Jean"));
        assert_eq!(value["status"], json!("new"));
    }

    #[test]
    fn reads_legacy_field_names() {
        let raw = r#"{
            "id": "6f1c2a3e-1d4b-4c8e-9a51-2b7e0c9d1f00",
            "type": "rc-pro",
            "createdAt": "2025-11-02T17:04:12.345Z",
            "data": {"companyName": "Atelier Martin"},
            "status": "contacted"
        }"#;
        let lead: Lead = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(lead.category, LeadCategory::ProfessionalLiability);
        assert_eq!(lead.payload.get_str("companyName"), Some("Atelier Martin"));
        assert_eq!(lead.status, LeadStatus::Contacted);
        assert_eq!(lead.created_at.timestamp_subsec_millis(), 345);
    }

    #[test]
    fn first_name_reads_payload_field() {
        let lead = Lead::new(
            LeadCategory::Home,
            Payload::new().with("firstName", "Marie"),
            Utc::now(),
        );
        assert_eq!(lead.first_name(), Some("Marie"));
    }
}
