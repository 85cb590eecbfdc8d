use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use grain_receipts::{Config, ReceiptService, init_logger_with_file};
use shared::{DateRange, SupplierCategory};

#[derive(Debug, Parser)]
#[command(name = "grain-receipts", version, about = "Grain receipt records from the ERP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reconciled weighing tickets and invoices for a date range
    Transactions {
        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: String,
        /// Last day, YYYY-MM-DD (inclusive)
        #[arg(long)]
        to: String,
        /// Partner number; numeric numbers are zero-padded
        #[arg(long)]
        partner: Option<String>,
    },
    /// Supplier directory filtered by category
    Suppliers {
        /// individual (CPF) or organization (CNPJ)
        #[arg(long)]
        category: SupplierCategory,
        /// Refetch the directory even when the cache is fresh
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::from_env().context("Invalid configuration")?;
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    tracing::debug!(config = ?config.erp, "Configuration loaded");
    let service = ReceiptService::from_config(&config).context("Failed to build ERP client")?;

    match cli.command {
        Command::Transactions { from, to, partner } => {
            let range = DateRange::parse(&from, &to)?;
            let set = service.fetch_transactions(range, partner.as_deref()).await;
            println!("{}", serde_json::to_string_pretty(&set)?);
            if set.is_empty() && set.is_degraded() {
                bail!("No transactions could be read for {}", set.range);
            }
        }
        Command::Suppliers { category, refresh } => {
            let suppliers = if refresh {
                service.refresh_suppliers(category).await
            } else {
                service.fetch_suppliers(category).await
            };
            tracing::info!(category = %category, suppliers = suppliers.len(), "Suppliers listed");
            println!("{}", serde_json::to_string_pretty(&suppliers)?);
        }
    }

    Ok(())
}
