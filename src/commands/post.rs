use anyhow::{Context, Result};
use tracing::Instrument;
use uuid::Uuid;

use iroiro::config::Config;
use iroiro::error::Error;
use iroiro::liveness::{LivenessChecker, ProbePolicy};
use iroiro::publish::{self, NoteDraft};
use iroiro::rotation::{RandomIndex, RotationEngine, RunMode, Selection, Selector};
use iroiro::storage::DataStore;
use iroiro::utils::truncate_text;

pub async fn post(
    config: Config,
    id: Option<String>,
    seed: Option<u64>,
    dry_run: bool,
) -> Result<()> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("post", run_id = %run_id);

    run(config, id, seed, dry_run).instrument(span).await
}

async fn run(
    config: Config,
    id: Option<String>,
    seed: Option<u64>,
    dry_run: bool,
) -> Result<()> {
    let checker = LivenessChecker::from_config(&config.probe)
        .map_err(Error::from)
        .context("Failed to create HTTP client")?;
    let selector = Selector::new(checker, ProbePolicy::from_config(&config.probe))
        .with_max_attempts(config.selection.max_attempts);
    let store = DataStore::from_config(&config.data);
    let engine = RotationEngine::new(store, selector, config.selection.max_failure_count);

    let mode = id.map_or(RunMode::Automatic, RunMode::Manual);
    let mut draws = seed.map_or_else(RandomIndex::from_entropy, RandomIndex::seeded);

    let outcome = engine
        .run(&mode, &mut draws)
        .await
        .map_err(Error::from)
        .context("Rotation run failed")?;
    let report = &outcome.report;

    let (key, entry) = match (&report.selection, outcome.entry) {
        (Selection::Selected { key, probed }, Some(entry)) => {
            tracing::info!(
                key = %key,
                title = %truncate_text(&entry.title, 60),
                probed = %probed,
                attempts = report.attempts,
                "Bookmark selected"
            );
            (key.clone(), entry)
        }
        (Selection::NotFound(key), _) => return Err(Error::NotFound(key.clone()).into()),
        (Selection::Unreachable(key), entry) => {
            return Err(Error::Unreachable {
                key: key.clone(),
                url: entry.map(|e| e.url).unwrap_or_default(),
            }
            .into());
        }
        _ => {
            tracing::info!(attempts = report.attempts, "Nothing to post");
            return Ok(());
        }
    };

    let draft = NoteDraft::from_entry(&key, &entry, config.publish.kind);

    if dry_run {
        tracing::info!(key = %key, "Dry run, skipping publish");
        println!("{}", entry.content());
        return Ok(());
    }

    match publish::from_config(&config.publish).map_err(Error::from)? {
        Some(publisher) => {
            publisher
                .publish(&draft)
                .await
                .map_err(Error::from)
                .with_context(|| format!("Failed to publish bookmark {key}"))?;
            tracing::info!(
                key = %key,
                publisher = publisher.name(),
                draft_id = %draft.draft_id,
                "Draft handed off"
            );
        }
        None => tracing::info!(key = %key, "Publishing disabled"),
    }

    Ok(())
}
