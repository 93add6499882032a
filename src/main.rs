use clap::{Args, Parser, Subcommand};
use microloan_ussd::application::engine::UssdEngine;
use microloan_ussd::domain::account::Account;
use microloan_ussd::domain::ports::{AccountDirectoryBox, CatalogProviderBox, SessionStoreBox};
use microloan_ussd::domain::session::SessionPolicy;
use microloan_ussd::infrastructure::http_catalog::HttpCatalog;
use microloan_ussd::infrastructure::in_memory::{
    InMemoryAccountDirectory, InMemorySessionStore, StaticCatalog,
};
use microloan_ussd::interfaces::csv::account_reader::AccountReader;
use microloan_ussd::interfaces::csv::request_reader::RequestReader;
use microloan_ussd::interfaces::csv::response_writer::ResponseWriter;
use microloan_ussd::interfaces::http::{AppState, create_router};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the USSD gateway endpoint over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "USSD_BIND", default_value = "0.0.0.0:8080")]
        bind: SocketAddr,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Replay recorded USSD requests from a CSV file and print the responses
    Replay {
        /// Input requests CSV file
        input: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Accounts CSV file. Defaults to the built-in demo accounts.
    #[arg(long, env = "USSD_ACCOUNTS")]
    accounts: Option<PathBuf>,

    /// Base URL of the loan catalog API. Defaults to the built-in demo catalog.
    #[arg(long, env = "USSD_CATALOG_URL")]
    catalog_url: Option<String>,

    #[arg(long, env = "USSD_CATALOG_TIMEOUT_SECS", default_value_t = 10)]
    catalog_timeout_secs: u64,

    /// Start new sessions at PIN entry instead of the language menu
    #[arg(long, env = "USSD_SKIP_LANGUAGE_SELECT")]
    skip_language_select: bool,

    /// Idle seconds after which a session is discarded
    #[arg(long, env = "USSD_SESSION_TIMEOUT_SECS", default_value_t = 180)]
    session_timeout_secs: u64,

    /// Path to persistent session database (optional). If provided, uses RocksDB.
    #[arg(long, env = "USSD_DB_PATH")]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "microloan_ussd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind, engine } => {
            let engine = build_engine(&engine)?;
            let app = create_router(AppState::new(engine));

            info!("USSD server listening on {}", bind);
            let listener = tokio::net::TcpListener::bind(bind).await.into_diagnostic()?;
            axum::serve(listener, app).await.into_diagnostic()?;
        }
        Command::Replay { input, engine } => {
            let engine = build_engine(&engine)?;
            let file = File::open(input).into_diagnostic()?;
            let reader = RequestReader::new(file);

            let stdout = io::stdout();
            let mut writer = ResponseWriter::new(stdout.lock());
            for request in reader.requests() {
                match request {
                    Ok(request) => {
                        let session_id = request.session_id.clone();
                        match engine.handle(request).await {
                            Ok(response) => writer.write(&session_id, &response)?,
                            Err(e) => eprintln!("Error processing request: {}", e),
                        }
                    }
                    Err(e) => {
                        eprintln!("Error reading request: {}", e);
                    }
                }
            }
            writer.flush()?;
        }
    }

    Ok(())
}

fn build_engine(args: &EngineArgs) -> Result<UssdEngine> {
    let policy = SessionPolicy {
        ask_language: !args.skip_language_select,
        idle_timeout: Duration::from_secs(args.session_timeout_secs),
    };

    let sessions = session_store(args.db_path.as_ref(), policy)?;

    let accounts: AccountDirectoryBox = match &args.accounts {
        Some(path) => {
            let file = File::open(path).into_diagnostic()?;
            let accounts: Vec<Account> = AccountReader::new(file)
                .accounts()
                .collect::<microloan_ussd::error::Result<_>>()?;
            info!(count = accounts.len(), "Loaded accounts");
            Box::new(InMemoryAccountDirectory::with_accounts(accounts))
        }
        None => Box::new(InMemoryAccountDirectory::demo()),
    };

    let catalog: CatalogProviderBox = match &args.catalog_url {
        Some(url) => Box::new(HttpCatalog::new(
            url,
            Duration::from_secs(args.catalog_timeout_secs),
        )?),
        None => Box::new(StaticCatalog::demo()),
    };

    Ok(UssdEngine::new(sessions, accounts, catalog))
}

#[cfg(feature = "storage-rocksdb")]
fn session_store(db_path: Option<&PathBuf>, policy: SessionPolicy) -> Result<SessionStoreBox> {
    use microloan_ussd::infrastructure::rocksdb::RocksDbSessionStore;

    Ok(match db_path {
        Some(path) => Box::new(RocksDbSessionStore::open(path, policy)?),
        None => Box::new(InMemorySessionStore::new(policy)),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn session_store(db_path: Option<&PathBuf>, policy: SessionPolicy) -> Result<SessionStoreBox> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemorySessionStore::new(policy)))
}
