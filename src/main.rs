use anyhow::Result;
use character_catalog::core::i18n::Locale;
use character_catalog::core::model::Status;
use character_catalog::core::state::SortKey;
use character_catalog::utils::format::format_status;
use character_catalog::utils::text::render_view;
use character_catalog::{create_source, CatalogController, Config};
use inquire::error::InquireError;
use inquire::{Select, Text};
use log::info;
use std::fmt;

const CONFIG_PATH: &str = "catalog.yml";

#[derive(Debug, Clone, Copy)]
enum Action {
    Next,
    Previous,
    Status,
    Species,
    SortBy,
    Language,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Next => "Next",
            Action::Previous => "Previous",
            Action::Status => "Status filter",
            Action::Species => "Species filter",
            Action::SortBy => "Sort by",
            Action::Language => "Language",
            Action::Quit => "Quit",
        };
        f.write_str(label)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match Config::load_or_default(CONFIG_PATH) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            return Err(e);
        }
    };

    let source = create_source(&config)?;
    let mut controller = CatalogController::from_config(&config);
    controller.on_change(|view| println!("\n{}\n", render_view(view)));

    info!("Loading first page");
    let ticket = controller.start();
    controller.refresh(source.as_ref(), ticket).await;

    loop {
        let action = match prompt_action(&controller) {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let ticket = match action {
            Action::Next => controller.next_page(),
            Action::Previous => controller.previous_page(),
            Action::Status => {
                let options = std::iter::once("All".to_string())
                    .chain(Status::ALL.iter().map(|s| format_status(Some(s.as_str()))))
                    .collect::<Vec<_>>();
                match keep_on_cancel(Select::new("Status:", options).raw_prompt())? {
                    Some(choice) => {
                        let status = choice.index.checked_sub(1).map(|i| Status::ALL[i]);
                        controller.set_status_filter(status)
                    }
                    None => None,
                }
            }
            Action::Species => {
                let species = Text::new("Species:")
                    .with_initial_value(&controller.state().species_filter)
                    .prompt();
                keep_on_cancel(species)?.and_then(|species| controller.set_species_filter(species))
            }
            Action::SortBy => {
                let key = Select::new("Sort by:", SortKey::ALL.iter().map(|k| k.as_str()).collect()).prompt();
                if let Some(key) = keep_on_cancel(key)?.and_then(SortKey::parse) {
                    controller.set_sort_key(key);
                }
                None
            }
            Action::Language => {
                let names = Locale::ALL.iter().map(|l| l.display_name()).collect();
                if let Some(choice) = keep_on_cancel(Select::new("Language:", names).raw_prompt())? {
                    controller.set_locale(Locale::ALL[choice.index]);
                }
                None
            }
            Action::Quit => break,
        };

        if let Some(ticket) = ticket {
            controller.refresh(source.as_ref(), ticket).await;
        }
    }

    Ok(())
}

/// Esc on a sub-prompt leaves the current value as it is.
fn keep_on_cancel<T>(answer: Result<T, InquireError>) -> Result<Option<T>, InquireError> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e),
    }
}

fn prompt_action(controller: &CatalogController) -> Result<Action, InquireError> {
    let mut actions = Vec::new();
    if controller.can_go_next() {
        actions.push(Action::Next);
    }
    if controller.can_go_previous() {
        actions.push(Action::Previous);
    }
    actions.extend([
        Action::Status,
        Action::Species,
        Action::SortBy,
        Action::Language,
        Action::Quit,
    ]);
    Select::new("Action:", actions).prompt()
}
