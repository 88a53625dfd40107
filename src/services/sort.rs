use std::cmp::Ordering;

use crate::core::model::CharacterRecord;
use crate::core::state::SortKey;

/// Returns a sorted copy; `records` is left in fetch order.
pub fn sort_records(records: &[CharacterRecord], key: SortKey) -> Vec<CharacterRecord> {
    let mut sorted = records.to_vec();
    match key {
        SortKey::Name => sorted.sort_by(|a, b| collate(&a.name, &b.name)),
        SortKey::Origin => sorted.sort_by(|a, b| collate(&a.origin.name, &b.origin.name)),
    }
    sorted
}

/// Like [`sort_records`] but for a raw key. Unknown keys keep fetch order.
pub fn sort_records_by(records: &[CharacterRecord], key: &str) -> Vec<CharacterRecord> {
    match SortKey::parse(key) {
        Some(key) => sort_records(records, key),
        None => records.to_vec(),
    }
}

/// Locale-style string comparison.
///
/// Letters compare by base letter first, ignoring case and common Latin
/// accents. Ties are broken lower-case first, then by the raw string.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = a.chars().flat_map(fold).cmp(b.chars().flat_map(fold));
    primary
        .then_with(|| case_order(a, b))
        .then_with(|| a.cmp(b))
}

fn case_order(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) if y.is_uppercase() => return Ordering::Less,
            (false, true) if x.is_uppercase() => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

fn fold(c: char) -> impl Iterator<Item = char> {
    let mut extra = None;
    let base = match c {
        'À'..='Å' | 'à'..='å' | 'Ā' | 'ā' => 'a',
        'Ç' | 'ç' | 'Č' | 'č' => 'c',
        'È'..='Ë' | 'è'..='ë' | 'Ē' | 'ē' => 'e',
        'Ì'..='Ï' | 'ì'..='ï' => 'i',
        'Ñ' | 'ñ' => 'n',
        'Ò'..='Ö' | 'Ø' | 'ò'..='ö' | 'ø' => 'o',
        'Ù'..='Ü' | 'ù'..='ü' => 'u',
        'Ý' | 'ý' | 'ÿ' => 'y',
        'ß' => {
            extra = Some('s');
            's'
        }
        _ => c,
    };
    base.to_lowercase().chain(extra)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Origin, Status};

    fn record(id: &str, name: &str, origin: &str) -> CharacterRecord {
        CharacterRecord {
            id: id.to_string(),
            name: name.to_string(),
            status: Status::Alive,
            species: "Human".to_string(),
            gender: "Male".to_string(),
            origin: Origin { name: origin.to_string() },
        }
    }

    fn names(records: &[CharacterRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_collate_ignores_case_and_accents() {
        assert_eq!(collate("abradolf", "Beth"), Ordering::Less);
        assert_eq!(collate("Éric", "Evil Morty"), Ordering::Less);
        assert_eq!(collate("rick", "Rick"), Ordering::Less);
        assert_eq!(collate("Rick", "Rick"), Ordering::Equal);
        assert_eq!(collate("Straße", "strasse"), Ordering::Greater);
        assert_eq!(collate("Straße", "strasst"), Ordering::Less);
    }

    #[test]
    fn test_sort_by_name_leaves_source_untouched() {
        let records = vec![
            record("1", "Rick Sanchez", "Earth (C-137)"),
            record("2", "morty Smith", "unknown"),
            record("3", "Beth Smith", "Earth (Replacement Dimension)"),
        ];

        let sorted = sort_records(&records, SortKey::Name);
        assert_eq!(names(&sorted), vec!["Beth Smith", "morty Smith", "Rick Sanchez"]);
        assert_eq!(names(&records), vec!["Rick Sanchez", "morty Smith", "Beth Smith"]);
    }

    #[test]
    fn test_sort_by_origin() {
        let records = vec![
            record("1", "Rick Sanchez", "Earth (C-137)"),
            record("2", "Morty Smith", "unknown"),
            record("3", "Abadango Cluster Princess", "Abadango"),
        ];

        let sorted = sort_records(&records, SortKey::Origin);
        assert_eq!(
            names(&sorted),
            vec!["Abadango Cluster Princess", "Rick Sanchez", "Morty Smith"]
        );
    }

    #[test]
    fn test_sort_is_idempotent() {
        let records = vec![
            record("1", "Summer Smith", "Earth"),
            record("2", "Jerry Smith", "Earth"),
            record("3", "jerry smith", "Earth"),
            record("4", "Birdperson", "Bird World"),
        ];

        for key in SortKey::ALL {
            let once = sort_records(&records, key);
            let twice = sort_records(&once, key);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_unknown_key_keeps_order() {
        let records = vec![record("1", "Zeep", "Microverse"), record("2", "Alan", "Earth")];
        assert_eq!(sort_records_by(&records, "species"), records);
        assert_eq!(names(&sort_records_by(&records, "name")), vec!["Alan", "Zeep"]);
    }
}
