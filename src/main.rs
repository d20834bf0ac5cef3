use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Use library instead of local modules
use swift_directory::{
    logging, parser, BankWithBranches, Config, DirectoryError, DirectoryService, KeyValueStore, SqliteStore,
};

#[derive(Parser)]
#[command(name = "swift-directory", about = "SWIFT code directory: import and inspect bank records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import the SWIFT code CSV into the database
    Import {
        /// CSV file (defaults to CSV_PATH)
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Drop everything already stored before importing
        #[arg(long)]
        replace: bool,
    },
    /// Show one record; a headquarters also lists its branches
    Show {
        /// 11-character SWIFT code
        code: String,
    },
    /// List every record of a country
    Country {
        /// 2-letter country code
        iso2: String,
    },
    /// Delete a record; a headquarters code removes its whole institution
    Delete {
        /// 11-character SWIFT code
        code: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    logging::init(config.log_format);

    let cli = Cli::parse();

    let store = Arc::new(
        SqliteStore::open(&config.database_path)
            .with_context(|| format!("Failed to open database: {}", config.database_path.display()))?,
    );
    let service = DirectoryService::new(store.clone());

    match cli.command {
        Command::Import { csv, replace } => {
            let csv_path = csv.unwrap_or_else(|| config.csv_path.clone());
            run_import(&service, store.as_ref(), &csv_path, replace)
        }
        Command::Show { code } => run_show(&service, &code),
        Command::Country { iso2 } => run_country(&service, &iso2),
        Command::Delete { code } => run_delete(&service, &code),
    }
}

fn run_import(service: &DirectoryService, store: &dyn KeyValueStore, csv_path: &Path, replace: bool) -> Result<()> {
    println!("🗄️  SWIFT Code Import - CSV → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Optionally start from an empty store
    if replace {
        println!("\n🧹 Clearing existing records...");
        store.flush().context("Failed to clear database")?;
        println!("✓ Database cleared");
    }

    // 2. Parse + write as one batch
    println!("\n📂 Importing {}...", csv_path.display());
    let imported = parser::import_csv(service, csv_path)?;

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Imported {} SWIFT codes", imported);
    Ok(())
}

fn run_show(service: &DirectoryService, code: &str) -> Result<()> {
    match service.get_with_branches(code) {
        Ok(BankWithBranches { record, branches }) => {
            println!("🏦 {} - {}", record.code, record.name);
            println!("   Country: {} {}", record.country_code, record.country_name.as_deref().unwrap_or(""));
            if let Some(address) = &record.address {
                println!("   Address: {}", address);
            }
            if let Some(town) = &record.town {
                println!("   Town:    {}", town);
            }
            if record.is_headquarters() {
                println!("   Headquarters with {} branch(es)", branches.len());
                for branch in &branches {
                    println!("     • {} - {}", branch.code, branch.name);
                }
            }
            Ok(())
        }
        Err(DirectoryError::NotFound(code)) => {
            eprintln!("❌ No record for {}", code);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn run_country(service: &DirectoryService, iso2: &str) -> Result<()> {
    let listing = service.list_by_country(iso2)?;

    println!("🌍 {} {}", listing.country_code, listing.country_name);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for record in &listing.records {
        let marker = if record.is_headquarters() { "HQ" } else { "  " };
        println!("{} {}  {}", marker, record.code, record.name);
    }
    println!("\n✓ {} record(s)", listing.records.len());
    Ok(())
}

fn run_delete(service: &DirectoryService, code: &str) -> Result<()> {
    service.remove(code)?;
    println!("✓ Deleted {}", code.trim().to_ascii_uppercase());
    Ok(())
}
