use serde::{Deserialize, Deserializer, Serialize};

/// Closed education domain. The serde vocabulary ("bachelors", "high-school",
/// …) is the profile-side wording; per-platform option values come from the
/// mapping registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    HighSchool,
    Associate,
    Bachelors,
    Masters,
    Doctorate,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 5] = [
        EducationLevel::HighSchool,
        EducationLevel::Associate,
        EducationLevel::Bachelors,
        EducationLevel::Masters,
        EducationLevel::Doctorate,
    ];
}

/// Closed experience-band domain, named by years of experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceBand {
    #[serde(rename = "0-1")]
    UpToOne,
    #[serde(rename = "1-3")]
    OneToThree,
    #[serde(rename = "3-5")]
    ThreeToFive,
    #[serde(rename = "5-10")]
    FiveToTen,
    #[serde(rename = "10+")]
    TenPlus,
}

impl ExperienceBand {
    pub const ALL: [ExperienceBand; 5] = [
        ExperienceBand::UpToOne,
        ExperienceBand::OneToThree,
        ExperienceBand::ThreeToFive,
        ExperienceBand::FiveToTen,
        ExperienceBand::TenPlus,
    ];
}

/// The candidate data record: the single source of truth a run fills forms
/// from. Owned by the orchestrator, lent read-only to handlers.
///
/// Required fields are always present. Optional fields are either a
/// non-empty string or `None`; an empty string in the fixture deserializes
/// to `None`, never to "present but empty".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub school: String,
    pub cover_letter: String,
    pub education: EducationLevel,
    pub experience: ExperienceBand,
    pub skills: Vec<String>,
    /// Free text; mapped per platform with an "other" fallback.
    pub referral_source: String,
    pub work_authorized: bool,
    pub requires_visa: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub portfolio_url: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub salary_expectation: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(salary: &str) -> String {
        format!(
            r#"{{
                "full_name": "Dana Veld",
                "email": "dana@example.com",
                "phone": "5550100",
                "location": "Rotterdam",
                "school": "Erasmus University",
                "cover_letter": "Hello.",
                "education": "bachelors",
                "experience": "0-1",
                "skills": ["javascript"],
                "referral_source": "linkedin",
                "work_authorized": true,
                "requires_visa": false,
                "linkedin_url": "",
                "salary_expectation": {}
            }}"#,
            salary
        )
    }

    #[test]
    fn closed_domains_round_trip_their_vocabulary() {
        let profile: CandidateProfile = serde_json::from_str(&fixture("\"85000\"")).unwrap();
        assert_eq!(profile.education, EducationLevel::Bachelors);
        assert_eq!(profile.experience, ExperienceBand::UpToOne);

        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"bachelors\""));
        assert!(json.contains("\"0-1\""));
    }

    #[test]
    fn empty_optional_becomes_absent() {
        let profile: CandidateProfile = serde_json::from_str(&fixture("\"85000\"")).unwrap();
        assert_eq!(profile.linkedin_url, None);
        assert_eq!(profile.portfolio_url, None);
        assert_eq!(profile.salary_expectation.as_deref(), Some("85000"));
    }

    #[test]
    fn null_and_missing_optionals_are_absent() {
        let profile: CandidateProfile = serde_json::from_str(&fixture("null")).unwrap();
        assert_eq!(profile.salary_expectation, None);
    }
}
