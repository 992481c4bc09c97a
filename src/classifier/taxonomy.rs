use serde::{Deserialize, Serialize};

pub const BODY_SYSTEMS: &str = "body-systems";
pub const CLINICAL_GROUPS: &str = "clinical-groups";
pub const OPEN_SET: &str = "open-set";

/// How a raw model reply is mapped back onto a label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchPolicy {
    /// First configured label found inside the reply wins.
    Contains {
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },
    /// The reply itself, cleaned down to a folder-safe token, becomes the label.
    FreeForm {
        #[serde(default = "default_max_words")]
        max_words: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sentinels {
    pub insufficient_input: String,
    pub no_match: String,
    pub service_error: String,
}

impl Sentinels {
    pub fn uniform(label: &str) -> Self {
        Self {
            insufficient_input: label.to_string(),
            no_match: label.to_string(),
            service_error: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Taxonomy {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(rename = "match")]
    pub match_policy: MatchPolicy,
    pub sentinels: Sentinels,
    #[serde(default = "default_min_description_chars")]
    pub min_description_chars: usize,
}

impl Taxonomy {
    pub fn is_closed_set(&self) -> bool {
        matches!(self.match_policy, MatchPolicy::Contains { .. })
    }

    /// Organ-system labels with case-sensitive matching; an unmatched reply
    /// becomes `Other` while missing input and service failures become
    /// `Unknown`.
    pub fn body_systems() -> Self {
        Self {
            labels: [
                "Infectious Disease",
                "Genetic Disorder",
                "Neurological Disorder",
                "Respiratory Disease",
                "Cardiovascular Disease",
                "Endocrine Disorder",
                "Autoimmune Disease",
                "Skin Disorder",
                "Gastrointestinal Disease",
                "Musculoskeletal Disorder",
                "Mental Health Disorder",
                "Hematologic Disorder",
                "Renal Disease",
                "Cancer",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            match_policy: MatchPolicy::Contains {
                case_sensitive: true,
            },
            sentinels: Sentinels {
                insufficient_input: "Unknown".to_string(),
                no_match: "Other".to_string(),
                service_error: "Unknown".to_string(),
            },
            min_description_chars: default_min_description_chars(),
        }
    }

    pub fn clinical_groups() -> Self {
        Self {
            labels: [
                "Sexually Transmitted Infections (STIs)",
                "Cardiovascular Diseases",
                "Respiratory Diseases",
                "Neurological Diseases",
                "Digestive Diseases",
                "Endocrine Diseases",
                "Musculoskeletal Diseases",
                "Skin Diseases",
                "Urinary & Reproductive System Diseases",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            match_policy: MatchPolicy::Contains {
                case_sensitive: false,
            },
            sentinels: Sentinels::uniform("Unknown"),
            min_description_chars: default_min_description_chars(),
        }
    }

    pub fn open_set() -> Self {
        Self {
            labels: Vec::new(),
            match_policy: MatchPolicy::FreeForm {
                max_words: default_max_words(),
            },
            sentinels: Sentinels::uniform("Unclassified"),
            min_description_chars: default_min_description_chars(),
        }
    }
}

fn default_case_sensitive() -> bool {
    true
}

fn default_max_words() -> usize {
    3
}

fn default_min_description_chars() -> usize {
    10
}
