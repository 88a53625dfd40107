use anyhow::Result;
use log::{debug, warn};

use crate::core::config::Config;
use crate::core::i18n::{LabelSet, Locale};
use crate::core::model::{PageEnvelope, Status};
use crate::core::state::{SortKey, ViewState};
use crate::services::client::CharacterSource;
use crate::services::query::QueryVariables;
use crate::services::sort::sort_records;
use crate::utils::format::format_status;

/// What the remote client currently reports for the latest request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Pending,
    Failed,
    Loaded(PageEnvelope),
}

/// Handle for one issued request. Only the ticket with the latest `seq` may
/// update the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub seq: u64,
    pub variables: QueryVariables,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub status: String,
    pub species: String,
    pub gender: String,
    pub origin: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedView {
    pub labels: &'static LabelSet,
    pub locale: Locale,
    pub sort_key: SortKey,
    pub status_filter: Option<Status>,
    pub species_filter: String,
    pub cards: Vec<CardView>,
    pub page: u32,
    pub pages: u32,
    pub count: u32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogView {
    Loading,
    Error,
    Loaded(LoadedView),
}

type Listener = Box<dyn FnMut(&CatalogView)>;

/// Owns the view state of one catalog instance and decides which changes need
/// a network round-trip.
pub struct CatalogController {
    state: ViewState,
    fetch: FetchState,
    seq: u64,
    listener: Option<Listener>,
}

impl CatalogController {
    pub fn new(state: ViewState) -> Self {
        Self {
            state,
            fetch: FetchState::Pending,
            seq: 0,
            listener: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ViewState::new(config.sort_by, config.locale))
    }

    /// Registers the render function. Replaces any previous one.
    pub fn on_change(&mut self, listener: impl FnMut(&CatalogView) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    /// Ticket for the initial load.
    pub fn start(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    pub fn set_page(&mut self, page: u32) -> Option<FetchTicket> {
        let page = page.max(1);
        if page == self.state.page {
            return None;
        }
        self.state.page = page;
        Some(self.begin_fetch())
    }

    pub fn next_page(&mut self) -> Option<FetchTicket> {
        if !self.can_go_next() {
            return None;
        }
        self.set_page(self.state.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Option<FetchTicket> {
        if !self.can_go_previous() {
            return None;
        }
        self.set_page(self.state.page.saturating_sub(1))
    }

    pub fn set_status_filter(&mut self, status: Option<Status>) -> Option<FetchTicket> {
        if status == self.state.status_filter {
            return None;
        }
        self.state.status_filter = status;
        Some(self.begin_fetch())
    }

    pub fn set_species_filter(&mut self, species: impl Into<String>) -> Option<FetchTicket> {
        let species = species.into();
        if species == self.state.species_filter {
            return None;
        }
        self.state.species_filter = species;
        Some(self.begin_fetch())
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        if key != self.state.sort_key {
            self.state.sort_key = key;
            self.notify();
        }
    }

    pub fn set_locale(&mut self, locale: Locale) {
        if locale != self.state.locale {
            self.state.locale = locale;
            self.notify();
        }
    }

    pub fn can_go_next(&self) -> bool {
        matches!(&self.fetch, FetchState::Loaded(envelope) if envelope.has_next())
    }

    pub fn can_go_previous(&self) -> bool {
        matches!(&self.fetch, FetchState::Loaded(envelope) if envelope.has_prev())
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.seq == self.seq
    }

    /// Applies a finished request. Returns `false` if the ticket was superseded
    /// and the result was dropped.
    pub fn resolve(&mut self, ticket: &FetchTicket, result: Result<PageEnvelope>) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "Dropping stale response for page {} (seq {} < {})",
                ticket.variables.page, ticket.seq, self.seq
            );
            return false;
        }

        self.fetch = match result {
            Ok(envelope) => {
                debug!("Loaded {} of {} characters", envelope.results.len(), envelope.count);
                FetchState::Loaded(envelope)
            }
            Err(e) => {
                warn!("Error fetching characters: {:#}", e);
                FetchState::Failed
            }
        };
        self.notify();
        true
    }

    /// Runs `ticket` against `source` and applies the result.
    pub async fn refresh(&mut self, source: &dyn CharacterSource, ticket: FetchTicket) -> bool {
        let result = source.fetch(&ticket.variables).await;
        self.resolve(&ticket, result)
    }

    pub fn view(&self) -> CatalogView {
        let envelope = match &self.fetch {
            FetchState::Pending => return CatalogView::Loading,
            FetchState::Failed => return CatalogView::Error,
            FetchState::Loaded(envelope) => envelope,
        };

        let cards = sort_records(&envelope.results, self.state.sort_key)
            .into_iter()
            .map(|record| CardView {
                status: format_status(Some(record.status.as_str())),
                id: record.id,
                name: record.name,
                species: record.species,
                gender: record.gender,
                origin: record.origin.name,
            })
            .collect();

        CatalogView::Loaded(LoadedView {
            labels: self.state.locale.labels(),
            locale: self.state.locale,
            sort_key: self.state.sort_key,
            status_filter: self.state.status_filter,
            species_filter: self.state.species_filter.clone(),
            cards,
            page: self.state.page,
            pages: envelope.pages,
            count: envelope.count,
            prev_enabled: envelope.has_prev(),
            next_enabled: envelope.has_next(),
        })
    }

    fn begin_fetch(&mut self) -> FetchTicket {
        self.seq += 1;
        self.fetch = FetchState::Pending;
        let ticket = FetchTicket {
            seq: self.seq,
            variables: QueryVariables::from_view(&self.state),
        };
        debug!("Issuing request #{}: {:?}", ticket.seq, ticket.variables);
        self.notify();
        ticket
    }

    fn notify(&mut self) {
        if self.listener.is_none() {
            return;
        }
        let view = self.view();
        if let Some(listener) = self.listener.as_mut() {
            listener(&view);
        }
    }
}
