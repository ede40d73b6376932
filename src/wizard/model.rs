//! Question catalog and answer data models.

use serde::{Deserialize, Serialize};

/// The preference field a question populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    BusinessType,
    Colors,
    Layout,
    Sections,
    Style,
    AdditionalFeatures,
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::BusinessType => "businessType",
            Self::Colors => "colors",
            Self::Layout => "layout",
            Self::Sections => "sections",
            Self::Style => "style",
            Self::AdditionalFeatures => "additionalFeatures",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for FieldKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "businessType" => Ok(Self::BusinessType),
            "colors" => Ok(Self::Colors),
            "layout" => Ok(Self::Layout),
            "sections" => Ok(Self::Sections),
            "style" => Ok(Self::Style),
            "additionalFeatures" => Ok(Self::AdditionalFeatures),
            _ => Err(format!("Unknown field: {}", s)),
        }
    }
}

/// Interaction shape of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    SingleChoice,
    MultiChoice,
    FreeText,
}

impl AnswerMode {
    /// Whether answers are picked from a fixed choice set.
    pub fn has_choices(&self) -> bool {
        !matches!(self, Self::FreeText)
    }
}

impl std::fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SingleChoice => "single_choice",
            Self::MultiChoice => "multi_choice",
            Self::FreeText => "free_text",
        };
        write!(f, "{s}")
    }
}

/// A static wizard question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub key: FieldKey,
    pub prompt: String,
    pub mode: AnswerMode,
    /// Ordered selectable labels. Empty for free-text questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl Question {
    fn new(id: u32, key: FieldKey, prompt: &str, mode: AnswerMode, choices: &[&str]) -> Self {
        Self {
            id,
            key,
            prompt: prompt.to_string(),
            mode,
            choices: choices.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Whether `choice` is one of this question's labels.
    pub fn offers(&self, choice: &str) -> bool {
        self.choices.iter().any(|c| c == choice)
    }
}

/// The fixed question list for a website generation session.
pub fn website_questions() -> Vec<Question> {
    use AnswerMode::*;
    vec![
        Question::new(
            1,
            FieldKey::BusinessType,
            "What type of business or website is this for?",
            SingleChoice,
            &[
                "Restaurant",
                "Tech Startup",
                "Portfolio",
                "E-commerce",
                "Blog",
                "Agency",
                "Other",
            ],
        ),
        Question::new(
            2,
            FieldKey::Colors,
            "What color scheme would you prefer?",
            SingleChoice,
            &[
                "Blue & White",
                "Dark & Modern",
                "Warm & Earthy",
                "Bright & Colorful",
                "Minimalist Gray",
                "Custom",
            ],
        ),
        Question::new(
            3,
            FieldKey::Layout,
            "What layout style do you prefer?",
            SingleChoice,
            &[
                "Single Page",
                "Multi-section Landing",
                "Grid-based",
                "Sidebar Navigation",
                "Full-width Hero",
            ],
        ),
        Question::new(
            4,
            FieldKey::Sections,
            "Which sections should your website include?",
            MultiChoice,
            &[
                "Header/Navigation",
                "Hero Section",
                "About Us",
                "Services/Products",
                "Testimonials",
                "Contact Form",
                "Footer",
            ],
        ),
        Question::new(
            5,
            FieldKey::Style,
            "What overall style are you aiming for?",
            SingleChoice,
            &[
                "Professional",
                "Creative",
                "Modern",
                "Classic",
                "Playful",
                "Elegant",
            ],
        ),
        Question::new(
            6,
            FieldKey::AdditionalFeatures,
            "Any additional features or specific requirements?",
            FreeText,
            &[],
        ),
    ]
}

/// A collected answer value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Single-choice label or free text.
    Text(String),
    /// Multi-choice labels in selection order.
    Choices(Vec<String>),
}

impl AnswerValue {
    /// Transcript rendering: multi-choice values are comma-joined.
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Choices(choices) => choices.join(", "),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        Self::Choices(value)
    }
}

/// Preferences collected during a session.
///
/// Every field stays empty until its question is answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answers {
    pub business_type: String,
    pub colors: String,
    pub layout: String,
    pub sections: Vec<String>,
    pub style: String,
    pub additional_features: String,
}

impl Answers {
    /// Store a value that has already been validated against its question.
    pub(crate) fn set(&mut self, key: FieldKey, value: AnswerValue) {
        match key {
            FieldKey::Sections => {
                self.sections = match value {
                    AnswerValue::Choices(choices) => choices,
                    AnswerValue::Text(text) => vec![text],
                }
            }
            FieldKey::BusinessType => self.business_type = value.display_text(),
            FieldKey::Colors => self.colors = value.display_text(),
            FieldKey::Layout => self.layout = value.display_text(),
            FieldKey::Style => self.style = value.display_text(),
            FieldKey::AdditionalFeatures => self.additional_features = value.display_text(),
        }
    }

    /// True when no field has been filled in.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
