use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use list_core::ShoppingList;
use storage::{KeyValueStore, MemoryStore, Storage};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod lookup;
mod render;
mod shell;

use config::{load_settings, normalize_database_url};
use shell::Action;

#[derive(Parser, Debug)]
#[command(name = "shopping", about = "Keep a shopping list between runs")]
struct Cli {
    #[arg(long, default_value = "shopping.toml")]
    config: PathBuf,
    #[arg(long)]
    database_url: Option<String>,
    /// Keep the list in memory only.
    #[arg(long)]
    ephemeral: bool,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    Add {
        name: String,
        #[arg(long)]
        price: Option<String>,
    },
    Remove {
        id: String,
    },
    Edit {
        id: String,
        name: String,
        #[arg(long)]
        price: Option<String>,
    },
    Toggle {
        id: String,
    },
    List,
    Total,
    /// Read commands from stdin until `quit`.
    Shell,
}

impl CliCommand {
    fn into_action(self) -> Option<Action> {
        let action = match self {
            CliCommand::Add { name, price } => Action::Add { name, price },
            CliCommand::Remove { id } => Action::Remove { id },
            CliCommand::Edit { id, name, price } => Action::Edit { id, name, price },
            CliCommand::Toggle { id } => Action::Toggle { id },
            CliCommand::List => Action::List,
            CliCommand::Total => Action::Total,
            CliCommand::Shell => return None,
        };
        Some(action)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config);
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let storage = if cli.ephemeral {
        None
    } else {
        let database_url = normalize_database_url(&settings.database_url);
        let storage = Storage::new(&database_url).await.map_err(|error| {
            error!(
                %database_url,
                error = %format!("{error:#}"),
                "failed to open SQLite database; verify parent directory exists and permissions are correct"
            );
            error
        })?;
        storage.health_check().await?;
        info!(%database_url, "opened shopping list database");
        Some(storage)
    };
    let store: Arc<dyn KeyValueStore> = match &storage {
        Some(storage) => Arc::new(storage.clone()),
        None => Arc::new(MemoryStore::new()),
    };

    let list = ShoppingList::open(store).await;
    let mut stdout = std::io::stdout();

    match cli.command.into_action() {
        Some(action) => {
            shell::execute(&list, action, &settings.currency_prefix, &mut stdout).await?;
        }
        None => {
            let warnings =
                shell::spawn_save_warnings(list.subscribe(), settings.currency_prefix.clone());
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            shell::run(&list, &settings.currency_prefix, stdin, &mut stdout).await?;
            warnings.abort();
        }
    }
    stdout.flush()?;

    if let Err(error) = list.flush().await {
        eprintln!("warning: {error}");
    }
    if let Some(storage) = storage {
        storage.close().await;
    }
    Ok(())
}
