use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::De];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
        }
    }

    /// Name shown in the language switch, always in the locale's own language.
    pub fn display_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::De => "Deutsch",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Locale::ALL.into_iter().find(|l| l.code() == code)
    }

    pub fn labels(self) -> &'static LabelSet {
        match self {
            Locale::En => &EN,
            Locale::De => &DE,
        }
    }
}

/// Flat label table for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    pub name: &'static str,
    pub status: &'static str,
    pub species: &'static str,
    pub gender: &'static str,
    pub origin: &'static str,
    pub filters: &'static str,
    pub sort_by: &'static str,
    pub language: &'static str,
}

static EN: LabelSet = LabelSet {
    name: "Name",
    status: "Status",
    species: "Species",
    gender: "Gender",
    origin: "Origin",
    filters: "Filters",
    sort_by: "Sort By",
    language: "Language",
};

static DE: LabelSet = LabelSet {
    name: "Name",
    status: "Status",
    species: "Spezies",
    gender: "Geschlecht",
    origin: "Herkunft",
    filters: "Filter",
    sort_by: "Sortieren nach",
    language: "Sprache",
};
