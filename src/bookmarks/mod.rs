//! Bookmark catalog editing
//!
//! Keyed-record operations over a [`Catalog`]: add with duplicate
//! detection, field-level edit, delete, exact-match lookup and a
//! duplicate-title lint. Callers load and save the catalog themselves.

use std::collections::HashSet;
use std::fmt;

use crate::models::{CandidateEntry, Catalog};
use crate::utils::error::BookmarkError;

/// Which field collided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Title,
    Url,
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Url => write!(f, "url"),
        }
    }
}

/// An existing entry matching a title or URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkMatch {
    pub field: MatchField,
    pub id: String,
    pub entry: CandidateEntry,
}

impl fmt::Display for BookmarkMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} - {} ({}) [{}]",
            self.id, self.entry.title, self.entry.url, self.field
        )
    }
}

/// Requested field updates; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkEdit {
    pub category: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub kind: Option<u32>,
}

/// One applied field change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub from: String,
    pub to: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: \"{}\" -> \"{}\"", self.field, self.from, self.to)
    }
}

/// Ids in numeric order; non-numeric ids sort after, lexically
pub fn sorted_ids(catalog: &Catalog) -> Vec<&String> {
    let mut ids: Vec<&String> = catalog.keys().collect();
    ids.sort_by_key(|id| (id.parse::<u64>().map_err(|_| ()), id.to_string()));
    ids
}

/// One past the largest numeric id, or `0` for an empty catalog
pub fn next_id(catalog: &Catalog) -> String {
    catalog
        .keys()
        .filter_map(|k| k.parse::<u64>().ok())
        .max()
        .map_or(0, |max| max + 1)
        .to_string()
}

/// Entries whose title or URL equals the given values
pub fn find_matches(
    catalog: &Catalog,
    title: Option<&str>,
    url: Option<&str>,
) -> Vec<BookmarkMatch> {
    let mut matches = Vec::new();

    for id in sorted_ids(catalog) {
        let entry = &catalog[id];
        if title.is_some_and(|t| entry.title == t) {
            matches.push(BookmarkMatch {
                field: MatchField::Title,
                id: id.clone(),
                entry: entry.clone(),
            });
        }
        if url.is_some_and(|u| entry.url == u) {
            matches.push(BookmarkMatch {
                field: MatchField::Url,
                id: id.clone(),
                entry: entry.clone(),
            });
        }
    }

    matches
}

fn duplicate_error(matches: &[BookmarkMatch]) -> BookmarkError {
    BookmarkError::Duplicate(
        matches
            .iter()
            .map(|m| format!("{} \"{}\" (ID: {})", m.field, field_value(m), m.id))
            .collect(),
    )
}

fn field_value(m: &BookmarkMatch) -> &str {
    match m.field {
        MatchField::Title => &m.entry.title,
        MatchField::Url => &m.entry.url,
    }
}

/// Insert a new entry under the next free id
///
/// # Errors
///
/// - `BookmarkError::MissingField` if title or URL is empty
/// - `BookmarkError::Duplicate` if title or URL already exists and `force`
///   is not set
pub fn add(
    catalog: &mut Catalog,
    entry: CandidateEntry,
    force: bool,
) -> Result<String, BookmarkError> {
    if entry.title.is_empty() {
        return Err(BookmarkError::MissingField("title"));
    }
    if entry.url.is_empty() {
        return Err(BookmarkError::MissingField("url"));
    }

    if force {
        tracing::warn!("Duplicate check skipped (--force)");
    } else {
        let matches = find_matches(catalog, Some(&entry.title), Some(&entry.url));
        if !matches.is_empty() {
            return Err(duplicate_error(&matches));
        }
    }

    let id = next_id(catalog);
    catalog.insert(id.clone(), entry);
    Ok(id)
}

/// Apply field updates to an existing entry
///
/// # Errors
///
/// - `BookmarkError::NotFound` for an unknown id
/// - `BookmarkError::Unchanged` if every requested value equals the current one
/// - `BookmarkError::Duplicate` if a new title or URL collides with another entry
pub fn edit(
    catalog: &mut Catalog,
    id: &str,
    edit: BookmarkEdit,
) -> Result<Vec<FieldChange>, BookmarkError> {
    let current = catalog
        .get(id)
        .cloned()
        .ok_or_else(|| BookmarkError::NotFound(id.to_string()))?;
    let mut updated = current.clone();
    let mut changes = Vec::new();

    apply_text("category", edit.category, &mut updated.category, &mut changes);
    apply_text("title", edit.title.clone(), &mut updated.title, &mut changes);
    apply_text("url", edit.url.clone(), &mut updated.url, &mut changes);
    apply_text("description", edit.description, &mut updated.description, &mut changes);

    if let Some(kind) = edit.kind.filter(|k| Some(*k) != current.kind) {
        changes.push(FieldChange {
            field: "kind",
            from: current.kind.map(|k| k.to_string()).unwrap_or_default(),
            to: kind.to_string(),
        });
        updated.kind = Some(kind);
    }

    if changes.is_empty() {
        return Err(BookmarkError::Unchanged);
    }

    if edit.title.is_some() || edit.url.is_some() {
        let matches: Vec<BookmarkMatch> =
            find_matches(catalog, Some(&updated.title), Some(&updated.url))
                .into_iter()
                .filter(|m| m.id != id)
                .collect();
        if !matches.is_empty() {
            return Err(duplicate_error(&matches));
        }
    }

    catalog.insert(id.to_string(), updated);
    Ok(changes)
}

fn apply_text(
    field: &'static str,
    value: Option<String>,
    target: &mut String,
    changes: &mut Vec<FieldChange>,
) {
    if let Some(value) = value.filter(|v| v != &*target) {
        changes.push(FieldChange {
            field,
            from: std::mem::replace(target, value.clone()),
            to: value,
        });
    }
}

/// Remove an entry
///
/// # Errors
///
/// Returns `BookmarkError::NotFound` for an unknown id
pub fn delete(catalog: &mut Catalog, id: &str) -> Result<CandidateEntry, BookmarkError> {
    catalog
        .remove(id)
        .ok_or_else(|| BookmarkError::NotFound(id.to_string()))
}

/// First title that appears more than once, in id order
pub fn first_duplicate_title(catalog: &Catalog) -> Option<String> {
    let mut seen = HashSet::new();
    sorted_ids(catalog)
        .into_iter()
        .map(|id| &catalog[id].title)
        .find(|title| !seen.insert(title.as_str()))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert("0".into(), CandidateEntry::new("Rust", "https://www.rust-lang.org"));
        catalog.insert("2".into(), CandidateEntry::new("Docs", "https://docs.rs"));
        catalog.insert("10".into(), CandidateEntry::new("Crates", "https://crates.io"));
        catalog
    }

    #[test]
    fn test_sorted_ids_numeric() {
        let catalog = sample();
        assert_eq!(sorted_ids(&catalog), vec!["0", "2", "10"]);
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(&Catalog::new()), "0");
        assert_eq!(next_id(&sample()), "11");
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut catalog = sample();
        let err = add(
            &mut catalog,
            CandidateEntry::new("Docs", "https://other.example"),
            false,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BookmarkError::Duplicate(vec!["title \"Docs\" (ID: 2)".into()])
        );
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_add_with_force() {
        let mut catalog = sample();
        let id = add(&mut catalog, CandidateEntry::new("Docs", "https://docs.rs"), true).unwrap();
        assert_eq!(id, "11");
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_add_requires_title_and_url() {
        let mut catalog = Catalog::new();
        assert_eq!(
            add(&mut catalog, CandidateEntry::new("", "https://a.example"), false),
            Err(BookmarkError::MissingField("title"))
        );
        assert_eq!(
            add(&mut catalog, CandidateEntry::new("a", ""), false),
            Err(BookmarkError::MissingField("url"))
        );
    }

    #[test]
    fn test_edit_reports_changes() {
        let mut catalog = sample();
        let changes = edit(
            &mut catalog,
            "2",
            BookmarkEdit {
                title: Some("Docs.rs".into()),
                kind: Some(39701),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].to_string(), "title: \"Docs\" -> \"Docs.rs\"");
        assert_eq!(catalog["2"].title, "Docs.rs");
        assert_eq!(catalog["2"].kind, Some(39701));
    }

    #[test]
    fn test_edit_unchanged() {
        let mut catalog = sample();
        let result = edit(
            &mut catalog,
            "2",
            BookmarkEdit {
                title: Some("Docs".into()),
                ..Default::default()
            },
        );
        assert_eq!(result, Err(BookmarkError::Unchanged));
    }

    #[test]
    fn test_edit_duplicate_against_other_entry() {
        let mut catalog = sample();
        let result = edit(
            &mut catalog,
            "2",
            BookmarkEdit {
                url: Some("https://crates.io".into()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(BookmarkError::Duplicate(_))));
        assert_eq!(catalog["2"].url, "https://docs.rs");
    }

    #[test]
    fn test_edit_unknown_id() {
        let mut catalog = sample();
        assert_eq!(
            edit(&mut catalog, "99", BookmarkEdit::default()),
            Err(BookmarkError::NotFound("99".into()))
        );
    }

    #[test]
    fn test_delete() {
        let mut catalog = sample();
        let removed = delete(&mut catalog, "0").unwrap();
        assert_eq!(removed.title, "Rust");
        assert!(delete(&mut catalog, "0").is_err());
    }

    #[test]
    fn test_find_matches() {
        let catalog = sample();
        let matches = find_matches(&catalog, None, Some("https://crates.io"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "10");
        assert_eq!(matches[0].field, MatchField::Url);
        assert!(find_matches(&catalog, Some("Missing"), None).is_empty());
    }

    #[test]
    fn test_first_duplicate_title() {
        let mut catalog = sample();
        assert_eq!(first_duplicate_title(&catalog), None);

        catalog.insert("11".into(), CandidateEntry::new("Docs", "https://docs2.example"));
        assert_eq!(first_duplicate_title(&catalog), Some("Docs".into()));
    }
}
