use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::core::config::Config;
use crate::core::i18n::{LabelSet, Locale};
use crate::core::model::Status;
use crate::core::state::SortKey;
use crate::services::catalog::{CardView, CatalogController, CatalogView, FetchTicket, LoadedView};
use crate::services::client::{create_source, CharacterSource};
use crate::utils::format::format_status;

#[component]
pub fn App() -> impl IntoView {
    let config = Config::default();
    set_document_lang(config.locale);

    match create_source(&config) {
        Ok(source) => view! { <CharacterList config=config source=Rc::from(source)/> }.into_view(),
        Err(e) => {
            leptos::logging::error!("Failed to create catalog client: {:?}", e);
            view! { <p>"Error fetching data."</p> }.into_view()
        }
    }
}

/// Controller plus the source its tickets run against.
#[derive(Clone)]
struct Catalog {
    controller: Rc<RefCell<CatalogController>>,
    source: Rc<dyn CharacterSource>,
}

impl Catalog {
    fn update(&self, change: impl FnOnce(&mut CatalogController) -> Option<FetchTicket>) {
        let ticket = change(&mut *self.controller.borrow_mut());
        if let Some(ticket) = ticket {
            self.run(ticket);
        }
    }

    fn run(&self, ticket: FetchTicket) {
        let controller = self.controller.clone();
        let source = self.source.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = source.fetch(&ticket.variables).await;
            controller.borrow_mut().resolve(&ticket, result);
        });
    }
}

#[component]
pub fn CharacterList(config: Config, source: Rc<dyn CharacterSource>) -> impl IntoView {
    let (current, set_current) = create_signal(CatalogView::Loading);

    let controller = Rc::new(RefCell::new(CatalogController::from_config(&config)));
    controller.borrow_mut().on_change(move |view| {
        // Deferred so the DOM is not rebuilt underneath a running event handler.
        let view = view.clone();
        wasm_bindgen_futures::spawn_local(async move { set_current.set(view) });
    });

    let catalog = Catalog { controller, source };
    let ticket = catalog.controller.borrow_mut().start();
    catalog.run(ticket);

    move || match current.get() {
        CatalogView::Loading => view! { <p>"Loading..."</p> }.into_view(),
        CatalogView::Error => view! { <p>"Error fetching data."</p> }.into_view(),
        CatalogView::Loaded(loaded) => {
            view! { <LoadedCatalog catalog=catalog.clone() loaded=loaded/> }.into_view()
        }
    }
}

#[component]
fn LoadedCatalog(catalog: Catalog, loaded: LoadedView) -> impl IntoView {
    let t = loaded.labels;

    let on_status = {
        let catalog = catalog.clone();
        move |ev| {
            let status = Status::parse(&event_target_value(&ev));
            catalog.update(|c| c.set_status_filter(status));
        }
    };
    let on_species = {
        let catalog = catalog.clone();
        move |ev| {
            let species = event_target_value(&ev);
            catalog.update(|c| c.set_species_filter(species));
        }
    };
    let on_sort = {
        let catalog = catalog.clone();
        move |ev| {
            if let Some(key) = SortKey::parse(&event_target_value(&ev)) {
                catalog.update(|c| {
                    c.set_sort_key(key);
                    None
                });
            }
        }
    };
    let on_locale = {
        let catalog = catalog.clone();
        move |ev| {
            if let Some(locale) = Locale::parse(&event_target_value(&ev)) {
                set_document_lang(locale);
                catalog.update(|c| {
                    c.set_locale(locale);
                    None
                });
            }
        }
    };
    let on_prev = {
        let catalog = catalog.clone();
        move |_| catalog.update(|c| c.previous_page())
    };
    let on_next = {
        let catalog = catalog.clone();
        move |_| catalog.update(|c| c.next_page())
    };

    let status_options = std::iter::once(("", "All".to_string()))
        .chain(Status::ALL.iter().map(|s| (s.as_str(), format_status(Some(s.as_str())))))
        .map(|(value, label)| {
            let selected = loaded.status_filter.map(|s| s.as_str()).unwrap_or("") == value;
            view! { <option value=value selected=selected>{label}</option> }
        })
        .collect_view();

    let sort_options = SortKey::ALL
        .into_iter()
        .map(|key| {
            let label = match key {
                SortKey::Name => t.name,
                SortKey::Origin => t.origin,
            };
            view! { <option value={key.as_str()} selected={key == loaded.sort_key}>{label}</option> }
        })
        .collect_view();

    let locale_options = Locale::ALL
        .into_iter()
        .map(|locale| {
            view! {
                <option value={locale.code()} selected={locale == loaded.locale}>
                    {locale.display_name()}
                </option>
            }
        })
        .collect_view();

    let cards = loaded
        .cards
        .into_iter()
        .map(|card| view! { <CharacterCard card=card labels=t/> })
        .collect_view();

    view! {
        <div class="catalog">
            <fieldset class="filters">
                <legend>{t.filters}</legend>
                <label>
                    {t.status}
                    <select on:change=on_status>{status_options}</select>
                </label>
                <label>
                    {t.species}
                    <input type="text" prop:value=loaded.species_filter on:change=on_species/>
                </label>
                <label>
                    {t.sort_by}
                    <select on:change=on_sort>{sort_options}</select>
                </label>
            </fieldset>

            <div class="card-grid">{cards}</div>

            <div class="pagination">
                <button disabled={!loaded.prev_enabled} on:click=on_prev>"Previous"</button>
                <span>{loaded.page} " / " {loaded.pages}</span>
                <button disabled={!loaded.next_enabled} on:click=on_next>"Next"</button>
            </div>

            <div class="language">
                <label>
                    {t.language}
                    <select on:change=on_locale>{locale_options}</select>
                </label>
            </div>
        </div>
    }
}

#[component]
fn CharacterCard(card: CardView, labels: &'static LabelSet) -> impl IntoView {
    view! {
        <div class="card" data-id=card.id>
            <h3>{card.name}</h3>
            <p><strong>{labels.status} ":"</strong> " " {card.status}</p>
            <p><strong>{labels.species} ":"</strong> " " {card.species}</p>
            <p><strong>{labels.gender} ":"</strong> " " {card.gender}</p>
            <p><strong>{labels.origin} ":"</strong> " " {card.origin}</p>
        </div>
    }
}

fn set_document_lang(locale: Locale) {
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element());
    if let Some(root) = root {
        let _ = root.set_attribute("lang", locale.code());
    }
}
