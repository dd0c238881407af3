//! Command handlers

use crate::cli::{
    AccountCommand, BillOfSaleArgs, Cli, Commands, DocumentsCommand, GenerateCommand, NvisArgs,
    VinCommand, VinLabelArgs, WebhookCommand,
};
use crate::output::{
    output_account, output_account_list, output_decoded, output_document, output_document_list,
    output_json,
};
use crate::server::{self, AppState};
use docuhaul_ai::CliAiBackend;
use docuhaul_app::app::{self, FlowDeps, WebhookOutcome};
use docuhaul_app::config::Config;
use docuhaul_app::export::export_documents_to_excel;
use docuhaul_app::repository::{load_manufacturer_profile, open_account_repo, open_document_repo};
use docuhaul_domain::model::{BillOfSaleRequest, ManufacturerProfile, NvisRequest, VinLabelRequest};
use docuhaul_domain::repository::{AccountRepository, DocumentRepository};
use docuhaul_domain::service::verify_webhook_signature;
use docuhaul_infra::persistence::{FileAccountRepository, FileDocumentRepository};
use docuhaul_infra::vin_csv::{load_vins_from_csv, VinRecord};
use docuhaul_types::{AccountClaims, ConfigError, Error, OutputFormat, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Repositories, backend and profile for one command invocation
struct Workspace {
    documents: FileDocumentRepository,
    accounts: FileAccountRepository,
    backend: CliAiBackend,
    profile: Option<ManufacturerProfile>,
}

impl Workspace {
    fn open(config: &Config) -> Result<Self> {
        Ok(Self {
            documents: open_document_repo(config)?,
            accounts: open_account_repo(config)?,
            backend: CliAiBackend::from_config(&config.ai_config())?,
            profile: load_manufacturer_profile(config)?,
        })
    }

    fn deps(&self, config: &Config) -> FlowDeps<'_> {
        FlowDeps::new(&self.documents, &self.accounts, &self.backend)
            .with_profile(self.profile.as_ref())
            .with_free_quota(config.free_document_quota)
    }
}

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(ref backend) = cli.backend {
        config.backend = backend.clone();
    }
    if cli.model.is_some() {
        config.model = cli.model.clone();
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Vin { action } => match action {
            VinCommand::Check { vin } => {
                output_decoded(output_format, &app::check_vin_input(&vin))
            }
            VinCommand::Decode {
                vin,
                user,
                describe,
            } => {
                let workspace = Workspace::open(&config)?;
                let decoded = app::decode_vin(&workspace.deps(&config), &user, &vin, describe)?;
                output_decoded(output_format, &decoded)
            }
            VinCommand::Batch { csv, jobs, output } => {
                // Use CLI jobs if specified, otherwise default 4. 0 = auto CPU count.
                let job_count = match jobs {
                    Some(0) => num_cpus::get(),
                    Some(n) => n,
                    None => 4,
                };
                cmd_vin_batch(cli.verbose, csv, job_count, output, output_format)
            }
        },

        Commands::Generate { document } => cmd_generate(&config, document, output_format),

        Commands::Documents { action } => cmd_documents(&config, action, output_format),

        Commands::Account { action } => cmd_account(&config, action, output_format),

        Commands::Webhook { action } => cmd_webhook(&config, action, output_format),

        Commands::Export { output, user } => cmd_export(&config, output, user),

        Commands::Serve { port } => cmd_serve(&config, port.unwrap_or(config.server_port)),

        Commands::Config {
            show,
            set_backend,
            set_model,
            set_ai_command,
            set_output,
            set_data_dir,
            set_webhook_secret,
            set_free_quota,
            set_port,
            set_manufacturer,
            reset,
        } => cmd_config(ConfigChanges {
            show,
            set_backend,
            set_model,
            set_ai_command,
            set_output,
            set_data_dir,
            set_webhook_secret,
            set_free_quota,
            set_port,
            set_manufacturer,
            reset,
        }),
    }
}

/// One row of a batch VIN check
#[derive(Debug, Clone, Serialize)]
struct BatchEntry {
    row: usize,
    vin: String,
    valid: bool,
    model_year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchReport {
    source: String,
    total: usize,
    valid: usize,
    invalid: usize,
    checked_at: chrono::DateTime<Utc>,
    entries: Vec<BatchEntry>,
}

/// Check records on `jobs` worker threads; entries come back in row order.
fn check_vins_parallel(
    records: Vec<VinRecord>,
    jobs: usize,
    pb: &ProgressBar,
    verbose: bool,
) -> Result<Vec<BatchEntry>> {
    let total = records.len();
    let jobs = jobs.clamp(1, total.max(1));
    let records: Arc<Vec<VinRecord>> = Arc::new(records);
    let next_index = Arc::new(AtomicUsize::new(0));

    // Spawn worker threads; each returns its own entries
    let mut handles = Vec::new();
    for worker_id in 0..jobs {
        let records = Arc::clone(&records);
        let next_index = Arc::clone(&next_index);
        let pb = pb.clone();

        handles.push(thread::spawn(move || {
            let mut entries = Vec::new();
            loop {
                // Get next VIN to check (lock-free)
                let idx = next_index.fetch_add(1, Ordering::SeqCst);
                if idx >= records.len() {
                    break;
                }

                let record = &records[idx];
                if verbose {
                    pb.set_message(format!("[W{}] {}", worker_id, record.vin));
                }

                let decoded = app::check_vin_input(&record.vin);
                entries.push(BatchEntry {
                    row: record.row,
                    vin: decoded.vin,
                    valid: decoded.valid,
                    model_year: decoded.model_year,
                    failure: decoded.failure,
                });
                pb.inc(1);
            }
            entries
        }));
    }

    let mut entries = Vec::with_capacity(total);
    for handle in handles {
        let worker_entries = handle
            .join()
            .map_err(|_| Error::Io(std::io::Error::other("batch worker panicked")))?;
        entries.extend(worker_entries);
    }

    // Sort by row for consistent output
    entries.sort_by_key(|e| e.row);
    Ok(entries)
}

fn cmd_vin_batch(
    verbose: bool,
    csv: PathBuf,
    jobs: usize,
    output: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let records = load_vins_from_csv(&csv)?;
    if records.is_empty() {
        return Err(Error::InvalidInput(format!("No VINs found in {}", csv.display())));
    }

    let total = records.len();
    tracing::info!(total, jobs, "Checking VINs");

    // Setup progress bar
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let entries = check_vins_parallel(records, jobs, &pb, verbose)?;
    pb.finish_with_message("Complete");

    let valid = entries.iter().filter(|e| e.valid).count();
    let report = BatchReport {
        source: csv.display().to_string(),
        total,
        valid,
        invalid: total - valid,
        checked_at: Utc::now(),
        entries,
    };

    if let Some(output_path) = output {
        let content = serde_json::to_string_pretty(&report)?;
        std::fs::write(&output_path, content)?;
        println!("Results saved to: {}", output_path.display());
        return Ok(());
    }

    if output_format == OutputFormat::Json {
        return output_json(&report);
    }

    println!("\nBatch VIN Check");
    println!("===============");
    println!("Total:   {}", report.total);
    println!("Valid:   {}", report.valid);
    println!("Invalid: {}", report.invalid);

    let invalid: Vec<_> = report.entries.iter().filter(|e| !e.valid).collect();
    if !invalid.is_empty() {
        println!("\n{:<6}  {:<20}  {}", "Row", "VIN", "Reason");
        println!("{}", "-".repeat(60));
        for entry in invalid {
            println!(
                "{:<6}  {:<20}  {}",
                entry.row,
                entry.vin,
                entry.failure.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

fn nvis_request(args: NvisArgs) -> NvisRequest {
    NvisRequest {
        vin: args.vin,
        make: args.make,
        model: args.vehicle_model,
        body_type: args.body_type,
        gvm_kg: args.gvm,
        atm_kg: args.atm,
        gtm_kg: args.gtm,
        axles: args.axles,
        tyre_size: args.tyre_size,
        date_of_manufacture: args.date,
    }
}

fn bill_of_sale_request(args: BillOfSaleArgs) -> BillOfSaleRequest {
    BillOfSaleRequest {
        vin: args.vin,
        make: args.make,
        model: args.vehicle_model,
        year: args.year,
        buyer_name: args.buyer,
        buyer_address: args.buyer_address,
        price_cents: args.price,
        sale_date: args.sale_date,
        odometer_km: args.odometer,
        notes: args.notes,
    }
}

fn vin_label_request(args: VinLabelArgs) -> VinLabelRequest {
    VinLabelRequest {
        vin: args.vin,
        vehicle_type: args.vehicle_type,
        date_of_manufacture: args.date,
        gvwr_kg: args.gvwr,
        gawr_front_kg: args.gawr_front,
        gawr_rear_kg: args.gawr_rear,
        tyre_size: args.tyre_size,
        rim_size: args.rim_size,
        cold_inflation_kpa: args.cold_inflation,
    }
}

fn cmd_generate(config: &Config, document: GenerateCommand, output_format: OutputFormat) -> Result<()> {
    let workspace = Workspace::open(config)?;
    let deps = workspace.deps(config);

    let generated = match document {
        GenerateCommand::Nvis(args) => {
            let user = args.user.clone();
            app::generate_nvis(&deps, &user, &nvis_request(args))?
        }
        GenerateCommand::BillOfSale(args) => {
            let user = args.user.clone();
            app::generate_bill_of_sale(&deps, &user, &bill_of_sale_request(args))?
        }
        GenerateCommand::VinLabel(args) => {
            let user = args.user.clone();
            app::generate_vin_label(&deps, &user, &vin_label_request(args))?
        }
    };

    output_document(output_format, &generated)
}

fn cmd_documents(config: &Config, action: DocumentsCommand, output_format: OutputFormat) -> Result<()> {
    let documents = open_document_repo(config)?;

    match action {
        DocumentsCommand::List { user, kind, limit } => {
            let mut found = match (user, kind) {
                (Some(ref user), kind) => {
                    let mut owned = documents.find_by_owner(user)?;
                    if let Some(kind) = kind {
                        owned.retain(|d| d.kind == kind);
                    }
                    owned
                }
                (None, Some(kind)) => documents.find_by_kind(kind)?,
                (None, None) => documents.find_all()?,
            };
            found.truncate(limit);
            output_document_list(output_format, &found)
        }
        DocumentsCommand::Show { id } => {
            let document = documents
                .find_by_id(&id)?
                .ok_or_else(|| Error::NotFound(format!("document '{}'", id)))?;
            output_document(output_format, &document)
        }
        DocumentsCommand::Delete { id } => {
            if !documents.remove(&id)? {
                return Err(Error::NotFound(format!("document '{}'", id)));
            }
            println!("Deleted document {}", id);
            Ok(())
        }
    }
}

fn cmd_account(config: &Config, action: AccountCommand, output_format: OutputFormat) -> Result<()> {
    let accounts = open_account_repo(config)?;
    let quota = config.free_document_quota;

    match action {
        AccountCommand::Create { id, email, admin } => {
            let account = app::create_account(&accounts, &id, &email, admin)?;
            output_account(output_format, &account, quota)
        }
        AccountCommand::Show { id } => {
            let account = app::get_account(&accounts, &id)?;
            output_account(output_format, &account, quota)
        }
        AccountCommand::List => output_account_list(output_format, &accounts.find_all()?),
        AccountCommand::SetClaims {
            target,
            actor,
            premium,
            admin,
        } => {
            let account = app::set_claims(&accounts, &actor, &target, AccountClaims { premium, admin })?;
            output_account(output_format, &account, quota)
        }
    }
}

fn require_webhook_secret(config: &Config) -> Result<String> {
    config.webhook_secret().ok_or_else(|| {
        ConfigError::Missing(
            "webhook secret (set DOCUHAUL_WEBHOOK_SECRET or run: docuhaul config --set-webhook-secret <secret>)"
                .to_string(),
        )
        .into()
    })
}

fn cmd_webhook(config: &Config, action: WebhookCommand, output_format: OutputFormat) -> Result<()> {
    let secret = require_webhook_secret(config)?;

    match action {
        WebhookCommand::Verify { body, signature } => {
            let raw = std::fs::read(&body)?;
            if !verify_webhook_signature(&raw, &secret, Some(signature.as_str())) {
                return Err(Error::Webhook(format!(
                    "signature does not match {}",
                    body.display()
                )));
            }
            println!("Signature valid");
            Ok(())
        }
        WebhookCommand::Replay { body, signature } => {
            let raw = std::fs::read(&body)?;
            let accounts = open_account_repo(config)?;
            let outcome = app::handle_webhook(&accounts, &secret, &raw, Some(signature.as_str()))?;

            if output_format == OutputFormat::Json {
                return output_json(&outcome);
            }
            match outcome {
                WebhookOutcome::Applied { account_id, premium } => {
                    println!("Applied to {} (premium: {})", account_id, premium)
                }
                WebhookOutcome::Recorded { account_id } => println!("Recorded for {}", account_id),
                WebhookOutcome::Ignored { event_name } => println!("Ignored event {}", event_name),
            }
            Ok(())
        }
    }
}

fn cmd_export(config: &Config, output: PathBuf, user: Option<String>) -> Result<()> {
    let documents = open_document_repo(config)?;
    let found = match user {
        Some(ref user) => documents.find_by_owner(user)?,
        None => documents.find_all()?,
    };

    export_documents_to_excel(&found, &output)?;
    println!("Exported {} documents to: {}", found.len(), output.display());
    Ok(())
}

fn cmd_serve(config: &Config, port: u16) -> Result<()> {
    let workspace = Workspace::open(config)?;
    tracing::info!(
        path = %workspace.documents.store_path().display(),
        documents = workspace.documents.count(),
        "Document store loaded"
    );
    if config.webhook_secret().is_none() {
        tracing::warn!("No webhook secret configured; webhook requests will fail");
    }

    let state = AppState {
        documents: Arc::new(Mutex::new(workspace.documents)),
        accounts: Arc::new(Mutex::new(workspace.accounts)),
        backend: Arc::new(workspace.backend),
        webhook_secret: config.webhook_secret(),
        free_quota: config.free_document_quota,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(state, port))
}

struct ConfigChanges {
    show: bool,
    set_backend: Option<String>,
    set_model: Option<String>,
    set_ai_command: Option<String>,
    set_output: Option<OutputFormat>,
    set_data_dir: Option<PathBuf>,
    set_webhook_secret: Option<String>,
    set_free_quota: Option<u32>,
    set_port: Option<u16>,
    set_manufacturer: Option<PathBuf>,
    reset: bool,
}

fn cmd_config(changes: ConfigChanges) -> Result<()> {
    if changes.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(backend) = changes.set_backend {
        config.backend = backend;
        modified = true;
    }

    if let Some(model) = changes.set_model {
        config.model = Some(model);
        modified = true;
    }

    if let Some(command) = changes.set_ai_command {
        config.ai_command = Some(command);
        modified = true;
    }

    if let Some(output_format) = changes.set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(dir) = changes.set_data_dir {
        config.data_dir = Some(dir);
        modified = true;
    }

    if let Some(secret) = changes.set_webhook_secret {
        config.webhook_secret = Some(secret);
        modified = true;
    }

    if let Some(quota) = changes.set_free_quota {
        config.free_document_quota = quota;
        modified = true;
    }

    if let Some(port) = changes.set_port {
        config.server_port = port;
        modified = true;
    }

    if let Some(path) = changes.set_manufacturer {
        // Fail early on a broken profile
        docuhaul_app::repository::load_manufacturer_profile_at(&path)?;
        config.manufacturer_profile = Some(path);
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if changes.show || !modified {
        println!("{}", config);
    }

    Ok(())
}
