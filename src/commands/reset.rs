use anyhow::{Context, Result};

use iroiro::config::Config;
use iroiro::error::Error;
use iroiro::rotation::StatusStore;
use iroiro::storage::DataStore;

fn load(store: &DataStore, config: &Config) -> Result<StatusStore> {
    let records = store
        .load_statuses()
        .map_err(Error::from)
        .context("Failed to load status file")?;
    Ok(StatusStore::from_records(
        records,
        config.selection.max_failure_count,
    ))
}

fn save(store: &DataStore, statuses: &StatusStore) -> Result<()> {
    store
        .save_statuses(statuses.records())
        .map_err(Error::from)
        .context("Failed to save status file")
}

pub fn reset_all(config: &Config) -> Result<()> {
    let store = DataStore::from_config(&config.data);
    let mut statuses = load(&store, config)?;

    let count = statuses.reset_all();
    save(&store, &statuses)?;

    tracing::info!(records = count, "All statuses reset");
    println!("Reset {count} status records to active.");
    Ok(())
}

pub fn reset_one(config: &Config, key: &str) -> Result<()> {
    let store = DataStore::from_config(&config.data);
    let mut statuses = load(&store, config)?;

    if !statuses.reset(key) {
        return Err(Error::NotFound(key.to_string()))
            .context("No status record to reset");
    }
    save(&store, &statuses)?;

    tracing::info!(key = %key, "Status reset");
    println!("Reset status of {key} to active.");
    Ok(())
}
