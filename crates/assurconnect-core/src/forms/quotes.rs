use super::fields::{
    require, require_consent, require_min_len, validate_email, validate_phone, MIN_NAME_LEN,
    MIN_ZIP_LEN,
};
use super::QuoteForm;
use crate::domain::LeadCategory;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Who to call back. Shared by every quote form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone: String,
}

impl ContactDetails {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_min_len("lastName", &self.last_name, MIN_NAME_LEN)?;
        require_min_len("firstName", &self.first_name, MIN_NAME_LEN)?;
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        Ok(())
    }
}

fn validate_zip(zip_code: &str) -> Result<(), CoreError> {
    require_min_len("zipCode", zip_code, MIN_ZIP_LEN)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoQuote {
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub zip_code: String,
    pub birth_date: String,
    pub vehicle_type: String,
    pub license_date: String,
    pub bonus_malus: String,
    pub situation: String,
    pub consent: bool,
}

impl QuoteForm for AutoQuote {
    const CATEGORY: LeadCategory = LeadCategory::Auto;

    fn validate(&self) -> Result<(), CoreError> {
        self.contact.validate()?;
        validate_zip(&self.zip_code)?;
        require("birthDate", &self.birth_date)?;
        require("vehicleType", &self.vehicle_type)?;
        require("licenseDate", &self.license_date)?;
        require("bonusMalus", &self.bonus_malus)?;
        require("situation", &self.situation)?;
        require_consent(self.consent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeQuote {
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub zip_code: String,
    pub housing_type: String,
    pub surface: String,
    /// Tenant or owner.
    pub status: String,
    pub consent: bool,
}

impl QuoteForm for HomeQuote {
    const CATEGORY: LeadCategory = LeadCategory::Home;

    fn validate(&self) -> Result<(), CoreError> {
        self.contact.validate()?;
        validate_zip(&self.zip_code)?;
        require("housingType", &self.housing_type)?;
        require("surface", &self.surface)?;
        require("status", &self.status)?;
        require_consent(self.consent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthQuote {
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub zip_code: String,
    pub birth_date: String,
    pub regime: String,
    pub coverage_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiaries: Option<String>,
    pub consent: bool,
}

impl QuoteForm for HealthQuote {
    const CATEGORY: LeadCategory = LeadCategory::Health;

    fn validate(&self) -> Result<(), CoreError> {
        self.contact.validate()?;
        validate_zip(&self.zip_code)?;
        require("birthDate", &self.birth_date)?;
        require("regime", &self.regime)?;
        require("coverageLevel", &self.coverage_level)?;
        require_consent(self.consent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetQuote {
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub zip_code: String,
    pub animal_type: String,
    pub breed: String,
    pub age: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    pub consent: bool,
}

impl QuoteForm for PetQuote {
    const CATEGORY: LeadCategory = LeadCategory::Pet;

    fn validate(&self) -> Result<(), CoreError> {
        self.contact.validate()?;
        validate_zip(&self.zip_code)?;
        require("animalType", &self.animal_type)?;
        require_min_len("breed", &self.breed, 2)?;
        require("age", &self.age)?;
        require_consent(self.consent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProLiabilityQuote {
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub company_name: String,
    pub activity: String,
    pub turnover: String,
    pub workforce: String,
    pub consent: bool,
}

impl QuoteForm for ProLiabilityQuote {
    const CATEGORY: LeadCategory = LeadCategory::ProfessionalLiability;

    fn validate(&self) -> Result<(), CoreError> {
        self.contact.validate()?;
        require_min_len("companyName", &self.company_name, 2)?;
        require_min_len("activity", &self.activity, 2)?;
        require("turnover", &self.turnover)?;
        require("workforce", &self.workforce)?;
        require_consent(self.consent)
    }
}

#[cfg(test)]
mod tests {
    use super::{AutoQuote, ContactDetails, PetQuote, ProLiabilityQuote};
    use crate::error::CoreError;
    use crate::forms::QuoteForm;
    use serde_json::json;

    fn contact() -> ContactDetails {
        ContactDetails {
            last_name: "Dupont".to_string(),
            first_name: "Jean".to_string(),
            email: "jean.dupont@example.fr".to_string(),
            phone: "06 12 34 56 78".to_string(),
        }
    }

    fn auto_quote() -> AutoQuote {
        AutoQuote {
            contact: contact(),
            zip_code: "69003".to_string(),
            birth_date: "1984-05-12".to_string(),
            vehicle_type: "citadine".to_string(),
            license_date: "2003-09-01".to_string(),
            bonus_malus: "0.50".to_string(),
            situation: "marie".to_string(),
            consent: true,
        }
    }

    #[test]
    fn auto_quote_flattens_contact_into_payload() {
        let payload = auto_quote().to_payload().expect("payload");
        assert_eq!(payload.get_str("firstName"), Some("Jean"));
        assert_eq!(payload.get_str("zipCode"), Some("69003"));
        assert_eq!(payload.get_str("bonusMalus"), Some("0.50"));
        assert_eq!(payload.get("consent"), Some(&json!(true)));
        assert!(payload.get("contact").is_none());
    }

    #[test]
    fn missing_consent_is_rejected() {
        let mut quote = auto_quote();
        quote.consent = false;
        assert_eq!(quote.to_payload().unwrap_err(), CoreError::ConsentRequired);
    }

    #[test]
    fn short_zip_code_is_rejected() {
        let mut quote = auto_quote();
        quote.zip_code = "690".to_string();
        assert_eq!(
            quote.validate(),
            Err(CoreError::FieldTooShort {
                field: "zipCode",
                min: 5
            })
        );
    }

    #[test]
    fn pet_quote_omits_absent_medical_history() {
        let quote = PetQuote {
            contact: contact(),
            zip_code: "33000".to_string(),
            animal_type: "chien".to_string(),
            breed: "Beagle".to_string(),
            age: "3".to_string(),
            medical_history: None,
            consent: true,
        };
        let payload = quote.to_payload().expect("payload");
        assert!(payload.get("medicalHistory").is_none());
        assert_eq!(payload.get_str("breed"), Some("Beagle"));
    }

    #[test]
    fn pro_liability_requires_company_name() {
        let quote = ProLiabilityQuote {
            contact: contact(),
            company_name: " ".to_string(),
            activity: "menuiserie".to_string(),
            turnover: "250000".to_string(),
            workforce: "4".to_string(),
            consent: true,
        };
        assert_eq!(
            quote.validate(),
            Err(CoreError::MissingField {
                field: "companyName"
            })
        );
    }
}
