mod client;
mod session_store;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use client::{Credential, SoundboardClient};
use session_store::{SessionStore, StoredSession};
use soundboard_types::SoundboardConfig;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "soundboard-admin")]
#[command(about = "Admin CLI for the soundboard service")]
struct Cli {
    /// Base URL of the soundboard server
    #[arg(long, global = true, env = "SOUNDBOARD_URL", default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        /// Admin password (prompted for when absent)
        #[arg(long, env = "SOUNDBOARD_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Show whether the saved session is still accepted
    Status,
    /// Read or replace the soundboard configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage uploaded audio files
    Files {
        #[command(subcommand)]
        action: FilesAction,
    },
    /// Upload audio files
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration as YAML
    Get {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace the configuration with a YAML file
    Put { file: PathBuf },
}

#[derive(Subcommand)]
enum FilesAction {
    /// List uploaded audio files
    List,
    /// Delete an uploaded audio file
    Delete { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = SessionStore::new()?;

    match cli.command {
        Commands::Login { password } => {
            let password = match password {
                Some(p) => Zeroizing::new(p),
                None => Zeroizing::new(
                    rpassword::read_password_from_tty(Some("Admin password: "))
                        .context("failed to read password")?,
                ),
            };
            let client = SoundboardClient::new(&cli.url, None);
            let token = client.login(&password).await?;
            store.save(&StoredSession {
                server_url: client.base_url.clone(),
                token,
            })?;
            println!("Logged in to {}", client.base_url);
        }
        Commands::Logout => {
            let client = SoundboardClient::new(&cli.url, None);
            if let Err(e) = client.logout().await {
                eprintln!("Server logout failed: {}", e);
            }
            if store.clear()? {
                println!("Session removed");
            } else {
                println!("No saved session");
            }
        }
        Commands::Status => {
            let client = authorized_client(&cli.url, &store)?;
            if client.verify().await? {
                println!("Authenticated with {}", client.base_url);
            } else {
                println!("Not authenticated with {}", client.base_url);
                std::process::exit(1);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Get { output } => {
                let config = SoundboardClient::new(&cli.url, None).get_config().await?;
                let yaml = serde_yaml::to_string(&config)?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, yaml)?;
                        println!("Configuration written to {}", path.display());
                    }
                    None => print!("{}", yaml),
                }
            }
            ConfigAction::Put { file } => {
                let content = std::fs::read_to_string(&file)
                    .with_context(|| format!("failed to read {}", file.display()))?;
                let config: SoundboardConfig = serde_yaml::from_str(&content)
                    .with_context(|| format!("{} is not a valid configuration", file.display()))?;
                let client = authorized_client(&cli.url, &store)?;
                println!("{}", client.put_config(&config).await?);
            }
        },
        Commands::Files { action } => {
            let client = authorized_client(&cli.url, &store)?;
            match action {
                FilesAction::List => {
                    for name in client.list_files().await? {
                        println!("{}", name);
                    }
                }
                FilesAction::Delete { name } => {
                    println!("{}", client.delete_file(&name).await?);
                }
            }
        }
        Commands::Upload { files } => {
            let client = authorized_client(&cli.url, &store)?;
            let report = client.upload(&files).await?;
            for result in &report.results {
                match &result.error {
                    None => println!("  ok    {}", result.filename),
                    Some(err) => println!("  fail  {}: {}", result.filename, err),
                }
            }
            println!("{}", report.message);
            if report.summary.success == 0 {
                bail!("no files were uploaded");
            }
        }
    }

    Ok(())
}

/// Client carrying the saved session, or the admin password from the
/// environment when no session is saved.
fn authorized_client(url: &str, store: &SessionStore) -> anyhow::Result<SoundboardClient> {
    let base_url = url.trim_end_matches('/');
    if let Some(session) = store.load(base_url)? {
        return Ok(SoundboardClient::new(
            base_url,
            Some(Credential::Session(session.token)),
        ));
    }
    if let Ok(password) = std::env::var("SOUNDBOARD_ADMIN_PASSWORD") {
        return Ok(SoundboardClient::new(
            base_url,
            Some(Credential::Password(Zeroizing::new(password))),
        ));
    }
    bail!("not logged in to {}; run `soundboard-admin login` first", base_url)
}
