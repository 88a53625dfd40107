use std::fmt::Write;

use crate::core::state::SortKey;
use crate::services::catalog::CatalogView;

/// Plain-text rendering of a catalog view for the terminal front end.
pub fn render_view(view: &CatalogView) -> String {
    let loaded = match view {
        CatalogView::Loading => return "Loading...".to_string(),
        CatalogView::Error => return "Error fetching data.".to_string(),
        CatalogView::Loaded(loaded) => loaded,
    };
    let t = loaded.labels;

    let mut out = String::new();
    let status = loaded.status_filter.map(|s| s.as_str()).unwrap_or("All");
    let species = if loaded.species_filter.is_empty() { "-" } else { loaded.species_filter.as_str() };
    let sort = match loaded.sort_key {
        SortKey::Name => t.name,
        SortKey::Origin => t.origin,
    };
    let _ = writeln!(
        out,
        "{}: {} = {}, {} = {} | {}: {} | {}: {}",
        t.filters, t.status, status, t.species, species, t.sort_by, sort, t.language,
        loaded.locale.display_name()
    );

    for card in &loaded.cards {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", card.name);
        let _ = writeln!(out, "  {}: {}", t.status, card.status);
        let _ = writeln!(out, "  {}: {}", t.species, card.species);
        let _ = writeln!(out, "  {}: {}", t.gender, card.gender);
        let _ = writeln!(out, "  {}: {}", t.origin, card.origin);
    }

    let _ = writeln!(out);
    let _ = write!(
        out,
        "[{}] {} / {} ({}) [{}]",
        if loaded.prev_enabled { "Previous" } else { "--------" },
        loaded.page,
        loaded.pages,
        loaded.count,
        if loaded.next_enabled { "Next" } else { "----" },
    );
    out
}
