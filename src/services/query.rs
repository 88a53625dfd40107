use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::core::model::{CharacterRecord, PageEnvelope, Status};
use crate::core::state::ViewState;

pub const OPERATION_NAME: &str = "GetCharacters";

pub const GET_CHARACTERS: &str = r#"query GetCharacters($page: Int, $filter: FilterCharacter) {
  characters(page: $page, filter: $filter) {
    info {
      count
      pages
      next
      prev
    }
    results {
      id
      name
      status
      species
      gender
      origin {
        name
      }
    }
  }
}"#;

/// The API treats a missing filter key differently from an empty one, so unset
/// fields are left out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct CharacterFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryVariables {
    pub page: u32,
    pub filter: CharacterFilter,
}

impl QueryVariables {
    pub fn from_view(view: &ViewState) -> Self {
        let species = if view.species_filter.is_empty() {
            None
        } else {
            Some(view.species_filter.clone())
        };

        Self {
            page: view.page.max(1),
            filter: CharacterFilter {
                status: view.status_filter,
                species,
            },
        }
    }

    pub fn key(&self) -> QueryKey {
        QueryKey {
            page: self.page,
            status: self.filter.status,
            species: self.filter.species.clone(),
        }
    }
}

/// Identity of a request, used for memoisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub page: u32,
    pub status: Option<Status>,
    pub species: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest<'a> {
    pub query: &'static str,
    pub operation_name: &'static str,
    pub variables: &'a QueryVariables,
}

impl<'a> GraphqlRequest<'a> {
    pub fn characters(variables: &'a QueryVariables) -> Self {
        Self {
            query: GET_CHARACTERS,
            operation_name: OPERATION_NAME,
            variables,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    pub data: Option<CharactersData>,
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CharactersData {
    pub characters: Option<CharactersPayload>,
}

#[derive(Debug, Deserialize)]
pub struct CharactersPayload {
    pub info: Option<PageInfo>,
    #[serde(default)]
    pub results: Option<Vec<Option<CharacterRecord>>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PageInfo {
    pub count: Option<u32>,
    pub pages: Option<u32>,
    pub next: Option<u32>,
    pub prev: Option<u32>,
}

impl GraphqlResponse {
    pub fn into_envelope(self) -> Result<PageEnvelope> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(anyhow!("GraphQL error: {}", messages.join("; ")));
        }

        let data = self.data.ok_or_else(|| anyhow!("GraphQL response has no data"))?;

        // The API answers `characters: null` when a filter matches nothing.
        let Some(payload) = data.characters else {
            return Ok(PageEnvelope::empty());
        };

        let info = payload.info.unwrap_or_default();
        Ok(PageEnvelope {
            count: info.count.unwrap_or(0),
            pages: info.pages.unwrap_or(0),
            next: info.next,
            prev: info.prev,
            results: payload.results.unwrap_or_default().into_iter().flatten().collect(),
        })
    }
}
