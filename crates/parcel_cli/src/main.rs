//! `parcel-tracker` command-line entry point.
//!
//! # Responsibility
//! - Parse flags and environment into a database path and logging setup.
//! - Run one parcel workflow per invocation and print the affected parcels.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use parcel_core::{
    default_log_level, flush_logging, init_logging, open_db, ClientId, ParcelNumber, ParcelService,
    ParcelStatus, SqliteParcelStore,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "parcel-tracker", version, about = "Track postal parcels in SQLite")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "PARCEL_TRACKER_DB", default_value = "tracker.db")]
    db: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PARCEL_TRACKER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for log files; logging is off when unset
    #[arg(long, env = "PARCEL_TRACKER_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new parcel
    Register {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        address: String,
    },
    /// Show one parcel
    Get { number: ParcelNumber },
    /// List a client's parcels
    List {
        #[arg(long)]
        client: ClientId,
    },
    /// Change the address of a registered parcel
    SetAddress {
        number: ParcelNumber,
        address: String,
    },
    /// Force a status (registered, sent, delivered)
    SetStatus {
        number: ParcelNumber,
        status: ParcelStatus,
    },
    /// Advance a parcel to its next status
    NextStatus { number: ParcelNumber },
    /// Delete a registered parcel
    Delete { number: ParcelNumber },
    /// Run the full register/update/deliver/delete workflow for a client
    Demo {
        #[arg(long, default_value_t = 1)]
        client: ClientId,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let result = execute(cli);
    if let Err(err) = &result {
        error!("event=cli_command module=cli status=error error={err:#}");
    }
    flush_logging();
    result
}

fn execute(cli: Cli) -> Result<()> {
    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let service = ParcelService::new(SqliteParcelStore::new(&conn));
    info!(
        "event=cli_command module=cli status=start {}",
        cli.command.log_fields()
    );

    run(&service, cli.command)
}

impl Command {
    /// `key=value` summary for logs; never includes the address.
    fn log_fields(&self) -> String {
        match self {
            Self::Register { client, .. } => format!("command=register client={client}"),
            Self::Get { number } => format!("command=get number={number}"),
            Self::List { client } => format!("command=list client={client}"),
            Self::SetAddress { number, .. } => format!("command=set_address number={number}"),
            Self::SetStatus { number, status } => {
                format!("command=set_status number={number} new_status={status}")
            }
            Self::NextStatus { number } => format!("command=next_status number={number}"),
            Self::Delete { number } => format!("command=delete number={number}"),
            Self::Demo { client } => format!("command=demo client={client}"),
        }
    }
}

fn run(service: &ParcelService<SqliteParcelStore<'_>>, command: Command) -> Result<()> {
    match command {
        Command::Register { client, address } => {
            println!("{}", service.register(client, address)?);
        }
        Command::Get { number } => {
            println!("{}", service.get(number)?);
        }
        Command::List { client } => print_client_parcels(service, client)?,
        Command::SetAddress { number, address } => {
            service.change_address(number, &address)?;
            println!("{}", service.get(number)?);
        }
        Command::SetStatus { number, status } => {
            service.set_status(number, status)?;
            println!("{}", service.get(number)?);
        }
        Command::NextStatus { number } => {
            service.next_status(number)?;
            println!("{}", service.get(number)?);
        }
        Command::Delete { number } => {
            service.delete(number)?;
            match service.get(number) {
                Ok(parcel) => println!("not deleted, status is {}: {parcel}", parcel.status),
                Err(err) if err.is_not_found() => println!("Parcel #{number} deleted"),
                Err(err) => return Err(err.into()),
            }
        }
        Command::Demo { client } => demo(service, client)?,
    }
    Ok(())
}

fn demo(service: &ParcelService<SqliteParcelStore<'_>>, client: ClientId) -> Result<()> {
    let parcel = service.register(client, "Pskov, Voennaya st. 15")?;
    println!("registered: {parcel}");

    service.change_address(parcel.number, "Saratov, Verkhnyaya st. 3")?;
    println!("address changed: {}", service.get(parcel.number)?);

    service.next_status(parcel.number)?;
    println!("status advanced: {}", service.get(parcel.number)?);

    print_client_parcels(service, client)?;

    // Only registered parcels are actually removed.
    for parcel in service.client_parcels(client)? {
        service.delete(parcel.number)?;
    }

    println!("after delete:");
    print_client_parcels(service, client)
}

fn print_client_parcels(
    service: &ParcelService<SqliteParcelStore<'_>>,
    client: ClientId,
) -> Result<()> {
    let parcels = service.client_parcels(client)?;
    if parcels.is_empty() {
        println!("client {client} has no parcels");
    }
    for parcel in parcels {
        println!("{parcel}");
    }
    Ok(())
}
