use serde::{Deserialize, Serialize};

use crate::core::i18n::Locale;
use crate::core::model::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Origin,
}

impl SortKey {
    pub const ALL: [SortKey; 2] = [SortKey::Name, SortKey::Origin];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Origin => "origin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        SortKey::ALL.into_iter().find(|k| k.as_str() == value)
    }
}

/// Everything the user can adjust.
///
/// `page`, `status_filter` and `species_filter` are fetch parameters; `sort_key`
/// and `locale` only change how the last envelope is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub page: u32,
    pub status_filter: Option<Status>,
    pub species_filter: String,
    pub sort_key: SortKey,
    pub locale: Locale,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: 1,
            status_filter: None,
            species_filter: String::new(),
            sort_key: SortKey::Name,
            locale: Locale::En,
        }
    }
}

impl ViewState {
    pub fn new(sort_key: SortKey, locale: Locale) -> Self {
        Self {
            sort_key,
            locale,
            ..Default::default()
        }
    }
}
