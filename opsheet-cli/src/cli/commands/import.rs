//! `opsheet import`
//!
//! Walks an [`ImportSession`] through validate, reconcile, preview and
//! commit. Nothing is written unless every row is valid and the operator
//! confirms (or passes `--yes`).

use anyhow::{Context, Result};
use colored::*;
use dialoguer::Confirm;
use sqlx::SqlitePool;

use crate::cli::output::{print_json, print_preview, print_summary, print_validation};
use crate::cli::{ImportArgs, read_input, resolve_processor};
use crate::config::repository::{SqliteOperationStore, get_processor_id};
use crate::config::{Config, connect, connect_in_memory};
use crate::import::types::{CandidateKey, ImportMode, Snapshot};
use crate::import::{ImportSession, ImportStep, OperationStore};

/// Returns false when the input was rejected
pub async fn handle(config: &Config, args: ImportArgs) -> Result<bool> {
    let processor = resolve_processor(args.processor.clone(), config)?;
    let text = read_input(args.file.as_deref())?;

    let session = ImportSession::new().validate(&text);
    if session.step == ImportStep::Errors {
        if let Some(validation) = &session.validation {
            if args.json {
                print_json(validation)?;
            } else {
                print_validation(validation);
                eprintln!("{}", "Fix the rows above; nothing was imported.".bright_red());
            }
        }
        return Ok(false);
    }

    let pool = open_pool(config, args.dry_run).await?;
    let existing = match get_processor_id(&pool, &processor).await? {
        Some(id) => Some(SqliteOperationStore::new(pool.clone(), id)),
        None => {
            log::info!("Processor '{}' does not exist yet", processor);
            None
        }
    };
    let snapshot = match &existing {
        Some(store) => store.load_snapshot().await?,
        None => Snapshot::default(),
    };

    let session = apply_mode_flags(session.reconcile(&snapshot), &args);
    let preview = session.preview().context("Import was not reconciled")?;

    if args.json && args.dry_run {
        print_json(&preview)?;
        return Ok(true);
    }
    if !args.json {
        print_preview(&preview);
    }
    if args.dry_run {
        println!("{}", "Dry run: nothing was written.".dimmed());
        return Ok(true);
    }

    if preview.rows.is_empty() {
        println!("Nothing to import.");
        return Ok(true);
    }

    if !args.yes && !confirm(&processor)? {
        println!("Import cancelled.");
        return Ok(true);
    }

    let store = match existing {
        Some(store) => store,
        None => SqliteOperationStore::for_processor(pool, &processor).await?,
    };

    let (session, result) = session.commit(&store, config.commit_timeout()).await;
    let summary = result.with_context(|| format!("Import into '{}' failed", processor))?;
    log::debug!("Import finished in step {}", session.step.label());

    if args.json {
        print_json(&summary)?;
    } else {
        print_summary(&summary);
    }

    Ok(true)
}

/// Dry runs never create the database file
async fn open_pool(config: &Config, dry_run: bool) -> Result<SqlitePool> {
    if dry_run && !config.database_path.exists() {
        log::info!(
            "No database at {}; previewing against an empty one",
            config.database_path.display()
        );
        return connect_in_memory().await;
    }
    connect(&config.database_path).await
}

/// Apply `--create-all`/`--update-all`, then per-row overrides
fn apply_mode_flags(mut session: ImportSession, args: &ImportArgs) -> ImportSession {
    if args.create_all {
        session = session.set_all_modes(ImportMode::Create);
    } else if args.update_all {
        session = session.set_all_modes(ImportMode::Update);
    }

    let overrides = args
        .create
        .iter()
        .map(|key| (key, ImportMode::Create))
        .chain(args.update.iter().map(|key| (key, ImportMode::Update)));

    for (key, mode) in overrides {
        if !is_matched(&session, key) {
            log::warn!("'{}' does not match a stored operation; ignoring --{}", key, mode.label().to_lowercase());
            continue;
        }
        session = session.set_mode(key, mode);
    }

    session
}

fn is_matched(session: &ImportSession, key: &CandidateKey) -> bool {
    session
        .reconciliation
        .as_ref()
        .is_some_and(|r| r.find_match(key).is_some())
}

fn confirm(processor: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!("Apply this import to '{}'?", processor))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}
