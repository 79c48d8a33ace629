//! tunnelcrypt CLI
//!
//! Packet seal/open and capability listing on top of `tunnelcrypt-aead`.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::{CipherName, Config};

/// tunnelcrypt - authenticated encryption for tunnel packets
#[derive(Parser)]
#[command(name = "tunnelcrypt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cipher identifiers and whether they can be used for packets
    Algorithms,

    /// Encrypt a packet, printing ciphertext||tag as hex
    Seal {
        /// Key as hex (defaults to the configured key file)
        #[arg(short, long)]
        key: Option<String>,

        /// 12-byte nonce as hex
        #[arg(short, long)]
        nonce: String,

        /// Associated data as hex
        #[arg(long, default_value = "")]
        ad: String,

        /// Cipher (defaults to the configured cipher)
        #[arg(short, long, value_enum)]
        algorithm: Option<CipherName>,

        /// Plaintext as hex
        #[arg(required = true)]
        plaintext: String,
    },

    /// Authenticate and decrypt a packet, printing the plaintext as hex
    Open {
        /// Key as hex (defaults to the configured key file)
        #[arg(short, long)]
        key: Option<String>,

        /// 12-byte nonce as hex
        #[arg(short, long)]
        nonce: String,

        /// Associated data as hex
        #[arg(long, default_value = "")]
        ad: String,

        /// Cipher (defaults to the configured cipher)
        #[arg(short, long, value_enum)]
        algorithm: Option<CipherName>,

        /// ciphertext||tag as hex
        #[arg(required = true)]
        sealed: String,
    },

    /// Run known-answer tests against every supported cipher
    Selftest,

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration. Only seal/open fail on a bad config file.
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load_or_default(),
    };

    // Initialize logging
    let level = match (&config, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.to_lowercase(),
        (Err(_), false) => "info".to_string(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Algorithms => {
            for line in commands::algorithm_table() {
                println!("{line}");
            }
        }
        Commands::Seal {
            key,
            nonce,
            ad,
            algorithm,
            plaintext,
        } => {
            let config = config?;
            config.validate()?;
            let (algorithm, key) = config.select_cipher(algorithm, key.as_deref())?;
            tracing::debug!("Sealing {} bytes with {}", plaintext.len() / 2, algorithm);
            println!("{}", commands::seal(algorithm, &key, &nonce, &ad, &plaintext)?);
        }
        Commands::Open {
            key,
            nonce,
            ad,
            algorithm,
            sealed,
        } => {
            let config = config?;
            config.validate()?;
            let (algorithm, key) = config.select_cipher(algorithm, key.as_deref())?;
            tracing::debug!("Opening {} bytes with {}", sealed.len() / 2, algorithm);
            println!("{}", commands::open(algorithm, &key, &nonce, &ad, &sealed)?);
        }
        Commands::Selftest => {
            tunnelcrypt_aead::self_test()?;
            println!("All known-answer tests passed");
        }
        Commands::InitConfig { force } => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            Config::default().save(&config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
        }
    }

    Ok(())
}
