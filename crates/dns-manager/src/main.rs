// # dns-manager
//
// One binary, two roles:
//
// 1. `server`: the HTTP façade over the reconciler, backed by NS1
// 2. `zone` / `record`: a thin client of a running server
//
// plus `probe`, which talks to NS1 directly to check the API key and
// measure list latency.
//
// ## Environment
//
// - `NS1_APIKEY`: API key, required by `server` and `probe`
// - `NS1_ENDPOINT`: API base URL override (optional)
// - `DNSM_LOG_LEVEL`: trace, debug, info, warn or error (default info)
//
// ## Example
//
// ```bash
// export NS1_APIKEY=your_key
// dns-manager server --store /var/lib/dns-manager/manager.cache &
//
// dns-manager zone add example.com
// dns-manager record add www.example.com A 1.2.3.4
// ```

use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

mod client;
mod commands;
mod server;

/// Exit codes, following systemd conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManagerExitCode {
    /// Clean exit
    Clean = 0,
    /// Bad configuration or arguments
    ConfigError = 1,
    /// The operation itself failed
    RuntimeError = 2,
}

impl From<ManagerExitCode> for ExitCode {
    fn from(code: ManagerExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser)]
#[command(name = "dns-manager")]
#[command(version)]
#[command(about = "Manage NS1 zones and records through a caching server")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DNSM_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Server(server::ServerArgs),

    /// Add or delete zones
    #[command(subcommand)]
    Zone(ZoneCommand),

    /// Add or delete records
    #[command(subcommand)]
    Record(RecordCommand),

    /// Quick test of the NS1 integration
    Probe(ProbeArgs),
}

/// Where the client finds the server
#[derive(Args, Clone)]
struct Target {
    /// Address of a running dns-manager server
    #[arg(short = 'a', long, default_value = dnsm_core::config::DEFAULT_LISTEN)]
    address: String,
}

#[derive(Subcommand)]
enum ZoneCommand {
    /// Add a zone
    Add {
        name: String,
        #[command(flatten)]
        target: Target,
    },
    /// Delete a zone
    Delete {
        name: String,
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Subcommand)]
enum RecordCommand {
    /// Add a record
    Add {
        domain: String,
        #[arg(value_name = "TYPE")]
        record_type: String,
        #[arg(required = true)]
        answer: Vec<String>,
        /// Zone of the record (default: everything after the first dot)
        #[arg(short = 'z', long)]
        zone: Option<String>,
        #[command(flatten)]
        target: Target,
    },
    /// Delete a record
    Delete {
        domain: String,
        #[arg(value_name = "TYPE")]
        record_type: String,
        /// Zone of the record (default: everything after the first dot)
        #[arg(short = 'z', long)]
        zone: Option<String>,
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Args)]
struct ProbeArgs {
    /// Number of timed list calls
    #[arg(long, default_value_t = 100)]
    rounds: u32,
}

fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Config and argument errors exit 1, everything else exits 2
fn exit_code_for(err: &anyhow::Error) -> ManagerExitCode {
    match err.downcast_ref::<dnsm_core::Error>() {
        Some(dnsm_core::Error::Config(_) | dnsm_core::Error::InvalidInput(_)) => {
            ManagerExitCode::ConfigError
        }
        _ => ManagerExitCode::RuntimeError,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(log_level) = parse_level(&cli.log_level) else {
        eprintln!(
            "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            cli.log_level
        );
        return ManagerExitCode::ConfigError.into();
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ManagerExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ManagerExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run(cli.command));

    match result {
        Ok(()) => ManagerExitCode::Clean.into(),
        Err(e) => {
            let code = exit_code_for(&e);
            if code == ManagerExitCode::ConfigError {
                eprintln!("Configuration error: {:#}", e);
            } else {
                eprintln!("{:#}", e);
            }
            code.into()
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Server(args) => {
            let config = server::config_from_args(&args)?;
            server::run(config).await
        }
        Command::Zone(ZoneCommand::Add { name, target }) => {
            commands::zone_add(&client::ManagerClient::new(&target.address)?, &name).await
        }
        Command::Zone(ZoneCommand::Delete { name, target }) => {
            commands::zone_delete(&client::ManagerClient::new(&target.address)?, &name).await
        }
        Command::Record(RecordCommand::Add {
            domain,
            record_type,
            answer,
            zone,
            target,
        }) => {
            let zone = commands::resolve_zone(&domain, zone)?;
            let client = client::ManagerClient::new(&target.address)?;
            commands::record_add(&client, &zone, &domain, &record_type, answer).await
        }
        Command::Record(RecordCommand::Delete {
            domain,
            record_type,
            zone,
            target,
        }) => {
            let zone = commands::resolve_zone(&domain, zone)?;
            let client = client::ManagerClient::new(&target.address)?;
            commands::record_delete(&client, &zone, &domain, &record_type).await
        }
        Command::Probe(args) => commands::probe(args.rounds).await,
    }
}
