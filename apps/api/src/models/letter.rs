use serde::{Deserialize, Serialize};

/// Incoming letter request as the client sends it.
///
/// Every field is optional at the wire level so that validation can report
/// all missing fields at once instead of failing on the first one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInputBundle {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    #[serde(alias = "company_alignment_points")]
    pub company_url: Option<String>,
    pub intro_points: Option<String>,
    #[serde(alias = "experience_points")]
    pub tailored_experience_points: Option<String>,
    #[serde(default, alias = "agreePromo")]
    pub agree_promo: bool,
}

/// Fields that must be present before any backend call is made.
pub const REQUIRED_FIELDS: &[&str] = &[
    "name",
    "role",
    "company",
    "intro_points",
    "tailored_experience_points",
];

/// A request that passed validation. Immutable for the rest of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterInputs {
    pub name: String,
    pub role: String,
    pub company: String,
    pub company_url: Option<String>,
    pub intro_points: String,
    pub experience_points: String,
}

impl RawInputBundle {
    /// Names of required fields that are absent or blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<String> {
        REQUIRED_FIELDS
            .iter()
            .filter(|field| self.field(field).is_none())
            .map(|field| field.to_string())
            .collect()
    }

    /// Checks required fields and produces the validated inputs.
    pub fn validate(&self) -> Result<LetterInputs, Vec<String>> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(missing);
        }

        let take = |field: &str| self.field(field).unwrap_or_default().to_string();

        Ok(LetterInputs {
            name: take("name"),
            role: take("role"),
            company: take("company"),
            company_url: present(&self.company_url).map(str::to_string),
            intro_points: take("intro_points"),
            experience_points: take("tailored_experience_points"),
        })
    }

    fn field(&self, field: &str) -> Option<&str> {
        let value = match field {
            "name" => &self.name,
            "role" => &self.role,
            "company" => &self.company,
            "intro_points" => &self.intro_points,
            "tailored_experience_points" => &self.tailored_experience_points,
            _ => return None,
        };
        present(value)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The three paragraphs of a letter, in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Intro,
    Experience,
    Alignment,
}

/// One call to the text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub section_kind: SectionKind,
}

/// Terminal output of the pipeline, handed to document assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSections {
    pub intro: String,
    pub tailored_experience: String,
    pub company_alignment: String,
}
