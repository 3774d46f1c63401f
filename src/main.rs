//! Console demo of the intake workflow.
//!
//! Wires the in-process adapters and runs the conversation over
//! stdin/stdout, one chat per process. File-backed catalog and alias
//! sources are used when configured; otherwise a small built-in
//! catalog keeps the demo self-contained.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use labquote::adapters::catalog::{
    CachedCatalogProvider, FailoverCatalogSource, FileAliasSource, FileCatalogSource,
    InMemoryCatalogSource,
};
use labquote::adapters::directory::{sample_record, InMemoryPatientDirectory};
use labquote::adapters::messaging::ConsoleGateway;
use labquote::adapters::quotes::InMemoryQuoteStore;
use labquote::adapters::state::InMemoryStateStore;
use labquote::application::{IntakeService, SessionSweeper};
use labquote::config::AppConfig;
use labquote::domain::catalog::{AliasTable, CatalogEntry};
use labquote::domain::foundation::{CatalogEntryId, ConversationId, Price};
use labquote::domain::intake::IntakeWorkflow;
use labquote::ports::{load_alias_table, CatalogSource};

fn demo_catalog() -> Vec<CatalogEntry> {
    [
        ("HEM-01", "Hemograma Completo", 1500),
        ("GLI-01", "Glicemia en Ayunas", 900),
        ("LIP-01", "Perfil Lipídico", 2500),
        ("TIR-01", "Perfil Tiroideo", 3200),
        ("ORI-01", "Examen de Orina", 800),
        ("URE-01", "Urea y Creatinina", 1200),
    ]
    .into_iter()
    .map(|(code, name, cents)| {
        CatalogEntry::new(CatalogEntryId::new(code), name, code, Price::from_cents(cents))
    })
    .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    // Configured file sources first, built-in demo catalog as the last
    // resort so the demo runs without any configuration.
    let mut sources: Vec<Arc<dyn CatalogSource>> = config
        .catalog
        .source_list()
        .into_iter()
        .map(|path| Arc::new(FileCatalogSource::new(path)) as Arc<dyn CatalogSource>)
        .collect();
    sources.push(Arc::new(InMemoryCatalogSource::new(demo_catalog())));

    let catalog = Arc::new(CachedCatalogProvider::new(
        Arc::new(FailoverCatalogSource::new(sources)),
        Duration::from_secs(config.catalog.cache_ttl_secs),
    ));

    let aliases = match &config.catalog.alias_path {
        Some(path) => load_alias_table(&FileAliasSource::new(path)).await,
        None => AliasTable::empty(),
    };

    let store = Arc::new(InMemoryStateStore::new(config.intake.session_ttl_secs));
    let directory = Arc::new(InMemoryPatientDirectory::with_records(vec![
        sample_record("V-17371453", "María", "Gutiérrez", (1985, 2, 14)),
        sample_record("V-9988776", "Ana", "Pérez", (1992, 11, 3)),
    ]));
    let quotes = Arc::new(InMemoryQuoteStore::new());

    let workflow = Arc::new(IntakeWorkflow::new(
        store.clone(),
        directory,
        quotes,
        catalog,
        Arc::new(aliases),
        config.intake.settings(),
    ));
    let service = IntakeService::new(workflow, Arc::new(ConsoleGateway::new()));

    let sweeper = SessionSweeper::new(
        store,
        Duration::from_secs(config.intake.sweep_interval_secs),
    );
    let sweeper_handle = sweeper.spawn();

    let conversation = ConversationId::new("console", "demo");
    info!(conversation = %conversation, "console demo ready");

    service.start(&conversation).await?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        if service.is_active(&conversation).await? {
            service.handle_inbound(&conversation, text).await?;
        } else {
            // The prior conversation finished; any input opens a new one.
            service.start(&conversation).await?;
        }
        io::stdout().flush()?;
    }

    sweeper_handle.abort();
    Ok(())
}
