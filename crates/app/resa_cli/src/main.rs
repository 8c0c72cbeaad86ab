// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::io::{BufRead, Write};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use clap::Parser;
use cli::{Cli, Commands};
use resa_core::auth::password::PasswordHasher;
use resa_core::auth::service::overview;
use resa_core::bootstrap::{self, BootstrapOptions};
use resa_core::config::ResaConfig;
use resa_core::models::voucher::IdentityOverview;
use resa_core::{db, voucher};
use tracing::info;

mod cli;
mod logging;

/// Format accepted by `add-voucher --expires`.
const EXPIRES_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: Cli) -> Result<()> {
    if let Commands::Version = args.command {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = load_config(&args)?;
    let pool = db::connect(&config).await?;
    let hasher = PasswordHasher::new(config.bcrypt_cost);

    match args.command {
        Commands::Init {
            admin_login,
            admin_password,
            default_email,
            default_password,
        } => {
            let admin_password = match admin_password {
                Some(p) => p,
                None => prompt("Admin password: ")?,
            };
            let default_password = default_password.unwrap_or_else(|| admin_password.clone());
            let report = bootstrap::initialize(
                &pool,
                &hasher,
                &BootstrapOptions {
                    admin_login,
                    admin_password,
                    default_email,
                    default_password,
                },
            )
            .await?;
            println!("Admin created with id {}", report.admin_id);
            println!(
                "Default identity created with id {}. Add a voucher to it to admit the first members.",
                report.default_identity_id
            );
        }
        Commands::AddVoucher {
            code,
            owner,
            expires,
            hours,
        } => {
            let expiration = parse_expiration(expires.as_deref(), hours, Utc::now())?;
            let id = voucher::add_voucher(&pool, &code, expiration, Some(owner)).await?;
            println!("Voucher {id} added for identity {owner}, expires {expiration}");
        }
        Commands::DisableVoucher { owner } => {
            let disabled = voucher::disable_voucher(&pool, owner).await?;
            if disabled == 0 {
                println!("Identity {owner} has no voucher");
            } else {
                println!("Disabled {disabled} voucher(s) of identity {owner}");
            }
        }
        Commands::List { json } => {
            let rows = overview(&pool).await?;
            if json {
                let out = serde_json::to_string_pretty(&rows)
                    .map_err(|e| Error::Custom(format!("json: {e}")))?;
                println!("{out}");
            } else {
                print_table(&rows);
            }
        }
        Commands::Version => {}
    }

    pool.close().await;
    Ok(())
}

fn load_config(args: &Cli) -> Result<ResaConfig> {
    let config = config_from(args, |key| std::env::var(key).ok())?;
    info!(database_url = %config.database_url, "configuration loaded");
    Ok(config)
}

/// Command-line flags take precedence over `env`; validation runs once on the
/// merged values.
fn config_from<F>(args: &Cli, env: F) -> Result<ResaConfig>
where
    F: Fn(&'static str) -> Option<String>,
{
    let config = ResaConfig::from_vars(|key| match key {
        "DATABASE_URL" => args.database_url.clone().or_else(|| env(key)),
        "RESA_BCRYPT_COST" => args
            .bcrypt_cost
            .map(|cost| cost.to_string())
            .or_else(|| env(key)),
        _ => env(key),
    })?;
    Ok(config)
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = std::io::stdout();
    stdout.write_all(label.as_bytes())?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let value = line.trim_end_matches(['\r', '\n']).to_string();
    if value.is_empty() {
        return Err(Error::Custom("no password given".into()));
    }
    Ok(value)
}

fn parse_expiration(
    expires: Option<&str>,
    hours: Option<i64>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    match (expires, hours) {
        (Some(raw), _) => NaiveDateTime::parse_from_str(raw, EXPIRES_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| Error::Custom(format!("invalid --expires '{raw}': {e}"))),
        (None, Some(hours)) => Duration::try_hours(hours)
            .map(|d| now + d)
            .ok_or_else(|| Error::Custom(format!("invalid --hours {hours}"))),
        (None, None) => Err(Error::Custom("one of --expires or --hours is required".into())),
    }
}

fn print_table(rows: &[IdentityOverview]) {
    println!(
        "{:<5} {:<16} {:<16} {:<28} {:<28} {:<12} {:<20} {}",
        "ID", "NAME", "SURNAME", "EMAIL", "SPONSOR", "VOUCHER", "EXPIRES", "STATE"
    );
    for row in rows {
        let (code, expires, state) = match &row.voucher {
            Some(v) if v.disabled => (v.code.as_str(), "-".to_string(), "disabled"),
            Some(v) if v.expiration <= Utc::now() => (
                v.code.as_str(),
                v.expiration.format("%Y-%m-%d %H:%M").to_string(),
                "expired",
            ),
            Some(v) => (
                v.code.as_str(),
                v.expiration.format("%Y-%m-%d %H:%M").to_string(),
                "valid",
            ),
            None => ("-", "-".to_string(), "-"),
        };
        println!(
            "{:<5} {:<16} {:<16} {:<28} {:<28} {:<12} {:<20} {}",
            row.identity.id,
            row.identity.name.as_deref().unwrap_or(""),
            row.identity.surname.as_deref().unwrap_or(""),
            row.identity.email,
            row.sponsor_email.as_deref().unwrap_or("-"),
            code,
            expires,
            state
        );
    }
}
