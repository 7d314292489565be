//! Spam Triage - Main Entry Point

mod cli;

use anyhow::Context;
use clap::Parser;

use cli::{Cli, Commands};
use spam_triage_core::constants;
use spam_triage_core::logic::config::TriageConfig;
use spam_triage_core::logic::crm::{CrmClient, CrmCredentials, NEW_CASES_QUERY};
use spam_triage_core::logic::dataset::augment;
use spam_triage_core::logic::dataset::corpus::{CorpusBuilder, CorpusConfig};
use spam_triage_core::logic::model::{ThresholdConfig, Trainer, TrainerConfig};
use spam_triage_core::logic::triage::TriageService;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = dotenvy::dotenv() {
        log::debug!("No .env file loaded: {}", e);
    }

    let cli = Cli::parse();
    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    let result = match cli.command {
        Commands::BuildCorpus {
            output,
            max_tickets,
            known_good_prefix,
        } => {
            build_corpus(CorpusConfig {
                max_tickets,
                known_good_prefix,
                output_path: output,
            })
            .await
        }
        Commands::Augment { data, bodies } => run_augment(&data, &bodies),
        Commands::Train {
            data,
            model,
            vectorizer,
            seed,
        } => {
            let mut config = TrainerConfig::from_env();
            config.data_path = data;
            if let Some(path) = model {
                config.model_path = path;
            }
            if let Some(path) = vectorizer {
                config.vectorizer_path = path;
            }
            if let Some(seed) = seed {
                config.seed = seed;
                config.logistic.random_state = seed;
            }
            train(config)
        }
        Commands::Triage {
            model,
            vectorizer,
            threshold,
            dry_run,
        } => {
            let mut config = TriageConfig::from_env();
            if let Some(path) = model {
                config.model_path = path;
            }
            if let Some(path) = vectorizer {
                config.vectorizer_path = path;
            }
            if let Some(t) = threshold {
                config.threshold = ThresholdConfig::new(t);
            }
            config.dry_run |= dry_run;
            triage(config).await;
            Ok(())
        }
        Commands::Check => check().await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
    }
}

async fn build_corpus(config: CorpusConfig) -> anyhow::Result<()> {
    let credentials = CrmCredentials::from_env();
    let count = CorpusBuilder::new(config).run(&credentials).await?;
    println!("Extracted {} records", count);
    Ok(())
}

fn run_augment(data: &std::path::Path, bodies: &std::path::Path) -> anyhow::Result<()> {
    let report = augment::augment_file(data, bodies, &mut rand::thread_rng())?;
    println!("Found {} spam rows", report.spam_rows);
    println!("Loaded {} email bodies", report.bodies_loaded);
    println!("Updated {} rows", report.rows_updated);
    Ok(())
}

fn train(config: TrainerConfig) -> anyhow::Result<()> {
    let outcome = Trainer::new(config).run().context("training failed")?;
    println!(
        "Trained on {} samples, evaluated on {} (run {})",
        outcome.train_indices.len(),
        outcome.test_indices.len(),
        outcome.classifier.run_id
    );
    Ok(())
}

async fn triage(config: TriageConfig) {
    let credentials = CrmCredentials::from_env();

    let service = match TriageService::initialize(&credentials, &config).await {
        Ok(service) => service,
        Err(e) => {
            println!("Failed to initialize: {}", e);
            return;
        }
    };

    println!("Service ready to run!");
    service.run().await;
}

async fn check() -> anyhow::Result<()> {
    let credentials = CrmCredentials::from_env();

    println!("Attempting CRM connection...");
    let client = CrmClient::connect(&credentials)
        .await
        .context("CRM connection failed")?;
    println!("Connected to CRM!");

    let result = client.query_raw(NEW_CASES_QUERY).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
