//! CLI definition using clap

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use docuhaul_types::{DocumentKind, OutputFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docuhaul")]
#[command(version)]
#[command(about = "VIN checks and AI-drafted compliance documents for trailer manufacturers")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// AI backend to use (gemini, claude, codex)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Model name override
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate and decode VINs
    Vin {
        #[command(subcommand)]
        action: VinCommand,
    },

    /// Generate a compliance document
    Generate {
        #[command(subcommand)]
        document: GenerateCommand,
    },

    /// Browse generated documents
    Documents {
        #[command(subcommand)]
        action: DocumentsCommand,
    },

    /// Manage accounts and claims
    Account {
        #[command(subcommand)]
        action: AccountCommand,
    },

    /// Check or replay saved payment webhooks
    Webhook {
        #[command(subcommand)]
        action: WebhookCommand,
    },

    /// Export the document register to Excel
    Export {
        /// Output Excel file path
        #[arg(long, short = 'o', default_value = "docuhaul-documents.xlsx")]
        output: PathBuf,

        /// Only export documents owned by this account
        #[arg(long)]
        user: Option<String>,
    },

    /// Run the HTTP server (payment webhook and VIN decode API)
    Serve {
        /// Port to listen on. Uses config value if not specified.
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set AI backend (gemini, claude, codex)
        #[arg(long)]
        set_backend: Option<String>,

        /// Set model name
        #[arg(long)]
        set_model: Option<String>,

        /// Set a full AI command line (e.g. "ollama run llama3")
        #[arg(long)]
        set_ai_command: Option<String>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set data directory for documents.json and accounts.json
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// Set the payment webhook signing secret
        #[arg(long)]
        set_webhook_secret: Option<String>,

        /// Set the free document quota
        #[arg(long)]
        set_free_quota: Option<u32>,

        /// Set the server port
        #[arg(long)]
        set_port: Option<u16>,

        /// Set path to manufacturer.toml
        #[arg(long)]
        set_manufacturer: Option<PathBuf>,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
pub enum VinCommand {
    /// Validate a VIN and decode its model year (offline, no account)
    Check {
        vin: String,
    },

    /// Decode a VIN for an account, optionally with an AI description
    Decode {
        vin: String,

        /// Account id
        #[arg(long, short = 'u')]
        user: String,

        /// Ask the AI backend to describe the vehicle (counts toward quota)
        #[arg(long)]
        describe: bool,
    },

    /// Validate every VIN in a CSV file
    Batch {
        /// CSV with a `vin` column, or one VIN per line
        csv: PathBuf,

        /// Number of parallel workers. 0 = auto (CPU count). Uses 4 if not specified.
        #[arg(long, short = 'j')]
        jobs: Option<usize>,

        /// Write results as JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Clone)]
pub struct NvisArgs {
    /// Account id
    #[arg(long, short = 'u')]
    pub user: String,
    #[arg(long)]
    pub vin: String,
    #[arg(long)]
    pub make: String,
    /// Vehicle model (e.g. "Tipper 8x5")
    #[arg(long = "vehicle-model")]
    pub vehicle_model: String,
    /// Body type (e.g. "Box trailer")
    #[arg(long)]
    pub body_type: String,
    /// Gross vehicle mass (kg)
    #[arg(long)]
    pub gvm: u32,
    /// Aggregate trailer mass (kg)
    #[arg(long)]
    pub atm: Option<u32>,
    /// Gross trailer mass (kg)
    #[arg(long)]
    pub gtm: Option<u32>,
    #[arg(long, default_value_t = 1)]
    pub axles: u8,
    #[arg(long)]
    pub tyre_size: String,
    /// Date of manufacture (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
}

#[derive(Args, Clone)]
pub struct BillOfSaleArgs {
    /// Account id
    #[arg(long, short = 'u')]
    pub user: String,
    #[arg(long)]
    pub vin: String,
    #[arg(long)]
    pub make: String,
    /// Vehicle model
    #[arg(long = "vehicle-model")]
    pub vehicle_model: String,
    /// Model year; decoded from the VIN if omitted
    #[arg(long)]
    pub year: Option<u16>,
    /// Buyer's full name
    #[arg(long)]
    pub buyer: String,
    #[arg(long)]
    pub buyer_address: String,
    /// Sale price in dollars (e.g. 12500 or 12500.50)
    #[arg(long, value_parser = parse_price_cents)]
    pub price: u64,
    /// Sale date (YYYY-MM-DD)
    #[arg(long)]
    pub sale_date: NaiveDate,
    #[arg(long)]
    pub odometer: Option<u32>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Clone)]
pub struct VinLabelArgs {
    /// Account id
    #[arg(long, short = 'u')]
    pub user: String,
    #[arg(long)]
    pub vin: String,
    /// Vehicle type (e.g. "Trailer")
    #[arg(long)]
    pub vehicle_type: String,
    /// Date of manufacture (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,
    /// Gross vehicle weight rating (kg)
    #[arg(long)]
    pub gvwr: u32,
    /// Front axle rating (kg)
    #[arg(long)]
    pub gawr_front: Option<u32>,
    /// Rear axle rating (kg)
    #[arg(long)]
    pub gawr_rear: u32,
    #[arg(long)]
    pub tyre_size: String,
    #[arg(long)]
    pub rim_size: String,
    /// Cold tyre inflation pressure (kPa)
    #[arg(long)]
    pub cold_inflation: Option<u32>,
}

#[derive(Subcommand)]
pub enum GenerateCommand {
    /// NVIS compliance certificate
    Nvis(NvisArgs),
    /// Bill of sale
    BillOfSale(BillOfSaleArgs),
    /// VIN label (compliance plate)
    VinLabel(VinLabelArgs),
}

#[derive(Subcommand)]
pub enum DocumentsCommand {
    /// List stored documents, newest first
    List {
        /// Only documents owned by this account
        #[arg(long, short = 'u')]
        user: Option<String>,

        /// Only documents of this kind
        #[arg(long)]
        kind: Option<DocumentKind>,

        /// Maximum entries to show
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Show one document in full
    Show {
        id: String,
    },

    /// Delete a document
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Create an account
    Create {
        id: String,

        #[arg(long)]
        email: String,

        /// Make this the admin account (only allowed while no admin exists)
        #[arg(long)]
        admin: bool,
    },

    /// Show an account
    Show {
        id: String,
    },

    /// List all accounts
    List,

    /// Replace an account's claims (admin only)
    SetClaims {
        /// Account whose claims change
        target: String,

        /// Admin account making the change
        #[arg(long)]
        actor: String,

        #[arg(long)]
        premium: bool,

        #[arg(long)]
        admin: bool,
    },
}

#[derive(Subcommand)]
pub enum WebhookCommand {
    /// Check a saved webhook body against its signature
    Verify {
        /// File holding the raw request body
        #[arg(long)]
        body: PathBuf,

        /// Hex signature from the X-Signature header
        #[arg(long)]
        signature: String,
    },

    /// Verify a saved webhook and apply it to the account store
    Replay {
        #[arg(long)]
        body: PathBuf,

        #[arg(long)]
        signature: String,
    },
}

/// Parse a dollar amount into cents ("12500", "12500.5", "$12,500.50")
pub fn parse_price_cents(input: &str) -> Result<u64, String> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let (dollars, cents) = match cleaned.split_once('.') {
        Some((d, c)) => (d, c),
        None => (cleaned.as_str(), ""),
    };

    let invalid = || format!("invalid price '{}'", input);
    if dollars.is_empty() || !dollars.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if cents.len() > 2 || !cents.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let dollars: u64 = dollars.parse().map_err(|_| invalid())?;
    let cents: u64 = match cents.len() {
        0 => 0,
        1 => cents.parse::<u64>().map_err(|_| invalid())? * 10,
        _ => cents.parse().map_err(|_| invalid())?,
    };

    dollars
        .checked_mul(100)
        .and_then(|d| d.checked_add(cents))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_price_cents() {
        assert_eq!(parse_price_cents("12500"), Ok(1_250_000));
        assert_eq!(parse_price_cents("12500.5"), Ok(1_250_050));
        assert_eq!(parse_price_cents("$12,500.05"), Ok(1_250_005));
        assert!(parse_price_cents("-5").is_err());
        assert!(parse_price_cents("12.345").is_err());
        assert!(parse_price_cents("abc").is_err());
        assert!(parse_price_cents("").is_err());
    }

    #[test]
    fn test_parse_generate_bill_of_sale() {
        let cli = Cli::try_parse_from([
            "docuhaul",
            "generate",
            "bill-of-sale",
            "--user",
            "u1",
            "--vin",
            "1HGCM82633A004352",
            "--make",
            "Honda",
            "--vehicle-model",
            "Accord",
            "--buyer",
            "Sam",
            "--buyer-address",
            "3 High St",
            "--price",
            "4500",
            "--sale-date",
            "2024-01-10",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                document: GenerateCommand::BillOfSale(args),
            } => {
                assert_eq!(args.price, 450_000);
                assert_eq!(args.sale_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_global_format_flag() {
        let cli = Cli::try_parse_from(["docuhaul", "vin", "check", "11111111111111111", "-f", "json"])
            .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }
}
