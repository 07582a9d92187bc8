use anyhow::{Context, Result};

use iroiro::bookmarks::{self, BookmarkEdit};
use iroiro::config::Config;
use iroiro::error::{BookmarkError, Error};
use iroiro::models::{CandidateEntry, Catalog, DEFAULT_BOOKMARK_KIND};
use iroiro::rotation::StatusStore;
use iroiro::storage::DataStore;
use iroiro::utils::unescape_newlines;

/// Fields for `add`
pub struct AddParams {
    pub title: String,
    pub url: String,
    pub category: String,
    pub description: String,
    pub kind: Option<String>,
    pub force: bool,
}

/// Fields for `edit`; `None` leaves a field as is
pub struct EditParams {
    pub title: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
}

fn load(store: &DataStore) -> Result<Catalog> {
    store
        .load_catalog_or_default()
        .map_err(Error::from)
        .context("Failed to load bookmarks")
}

fn save(store: &DataStore, catalog: &Catalog) -> Result<()> {
    store
        .save_catalog(catalog)
        .map_err(Error::from)
        .context("Failed to save bookmarks")
}

fn parse_kind(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(
            kind = %raw,
            fallback = DEFAULT_BOOKMARK_KIND,
            "Invalid kind, using default"
        );
        DEFAULT_BOOKMARK_KIND
    })
}

/// A bad `--kind` on edit leaves the stored kind alone
fn parse_edit_kind(raw: Option<&str>) -> Option<u32> {
    let raw = raw?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        tracing::warn!(kind = %raw, "Invalid kind, leaving it unchanged");
    }
    parsed
}

fn print_entry(entry: &CandidateEntry) -> Result<()> {
    let json = serde_json::to_string_pretty(entry).context("Failed to serialize bookmark")?;
    println!("{json}");
    Ok(())
}

pub fn add(config: &Config, params: AddParams) -> Result<()> {
    let store = DataStore::from_config(&config.data);
    let mut catalog = load(&store)?;

    let mut entry = CandidateEntry::new(params.title, params.url)
        .with_category(params.category)
        .with_description(unescape_newlines(&params.description));
    if let Some(kind) = params.kind.as_deref() {
        entry = entry.with_kind(parse_kind(kind));
    }

    let id = match bookmarks::add(&mut catalog, entry, params.force) {
        Ok(id) => id,
        Err(BookmarkError::Duplicate(found)) => {
            eprintln!("Error: duplicate bookmark found:");
            for line in &found {
                eprintln!("  {line}");
            }
            println!("\nUse --force to add it anyway.");
            anyhow::bail!("Duplicate bookmark");
        }
        Err(e) => return Err(Error::from(e).into()),
    };

    save(&store, &catalog)?;
    tracing::info!(id = %id, "Bookmark added");

    println!("Added bookmark (ID: {id}):");
    print_entry(&catalog[&id])
}

pub fn edit(config: &Config, id: &str, params: EditParams) -> Result<()> {
    let store = DataStore::from_config(&config.data);
    let mut catalog = load(&store)?;

    let request = BookmarkEdit {
        category: params.category,
        title: params.title,
        url: params.url,
        description: params.description.as_deref().map(unescape_newlines),
        kind: parse_edit_kind(params.kind.as_deref()),
    };

    let changes = match bookmarks::edit(&mut catalog, id, request) {
        Ok(changes) => changes,
        Err(BookmarkError::Unchanged) => {
            println!("No changes.");
            return Ok(());
        }
        Err(e) => return Err(Error::from(e).into()),
    };

    save(&store, &catalog)?;
    tracing::info!(id = %id, fields = changes.len(), "Bookmark updated");

    println!("Updated bookmark ID {id}:");
    for change in &changes {
        println!("  {change}");
    }
    Ok(())
}

pub fn delete(config: &Config, id: &str) -> Result<()> {
    let store = DataStore::from_config(&config.data);
    let mut catalog = load(&store)?;

    let removed = bookmarks::delete(&mut catalog, id).map_err(Error::from)?;
    save(&store, &catalog)?;
    tracing::info!(id = %id, "Bookmark deleted");

    println!("Deleted bookmark ID {id}:");
    println!("  Title: {}", removed.title);
    println!("  URL: {}", removed.url);
    Ok(())
}

pub fn show(config: &Config, id: &str) -> Result<()> {
    let store = DataStore::from_config(&config.data);
    let catalog = load(&store)?;

    let entry = catalog
        .get(id)
        .ok_or_else(|| Error::from(BookmarkError::NotFound(id.to_string())))?;

    let statuses = StatusStore::from_records(
        store.load_statuses().map_err(Error::from)?,
        config.selection.max_failure_count,
    );
    let record = statuses.get(id);

    println!("Bookmark (ID: {id}):");
    print_entry(entry)?;
    println!(
        "Status: {} (failures: {})",
        record.status, record.failure_count
    );
    Ok(())
}

pub fn list(config: &Config) -> Result<()> {
    let store = DataStore::from_config(&config.data);
    let catalog = load(&store)?;

    if catalog.is_empty() {
        println!("No bookmarks.");
        return Ok(());
    }

    println!("Bookmarks:");
    for id in bookmarks::sorted_ids(&catalog) {
        let entry = &catalog[id];
        println!("ID: {id} - {} ({})", entry.title, entry.url);
    }
    Ok(())
}

pub fn check(config: &Config, title: Option<&str>, url: Option<&str>) -> Result<()> {
    if title.is_none() && url.is_none() {
        anyhow::bail!("Specify --title or --url");
    }

    let store = DataStore::from_config(&config.data);
    let catalog = load(&store)?;
    let found = bookmarks::find_matches(&catalog, title, url);

    if found.is_empty() {
        println!("No matching bookmarks.");
    } else {
        println!("Matching bookmarks:");
        for m in &found {
            println!("{m}");
        }
    }
    Ok(())
}

pub fn lint(config: &Config) -> Result<()> {
    let store = DataStore::from_config(&config.data);
    let catalog = load(&store)?;

    match bookmarks::first_duplicate_title(&catalog) {
        Some(title) => anyhow::bail!("Duplicate title [ {title} ]"),
        None => {
            println!("OK!");
            Ok(())
        }
    }
}
