//! walletd: command-line front end for the wallet core.
//!
//! One subcommand per session operation. Secrets come in over stdin or
//! the environment, never argv where avoidable, and leave only through
//! the explicit `export` and `sign` commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::SecretString;
use serde::Serialize;
use zeroize::Zeroizing;

use wallet_core::utils::logging;
use wallet_core::{
    checksum_address, suggest_words, EncryptedFileStore, IdentitySummary, KeychainStore,
    SecretStore, SessionStatus, WalletSession,
};

/// Deterministic single-identity wallet daemon-less CLI.
#[derive(Parser)]
#[command(name = "walletd")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Secret store backend.
    #[arg(long, value_enum, default_value = "file", global = true)]
    store: StoreBackend,

    /// Path of the encrypted wallet file (file backend only).
    #[arg(long, default_value = "wallet.enc.json", global = true)]
    path: PathBuf,

    /// Password for the encrypted wallet file. Falls back to the
    /// WALLET_PASSWORD environment variable.
    #[arg(long, global = true)]
    password: Option<String>,

    /// Machine-readable JSON output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreBackend {
    /// AES-256-GCM encrypted file.
    File,
    /// OS credential manager (stores the key only; export is
    /// unavailable after a restart).
    Keychain,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh wallet and persist it.
    Generate {
        /// Optional BIP39 passphrase mixed into the seed. Not stored;
        /// restoring later needs the phrase and this passphrase.
        #[arg(long)]
        passphrase: Option<String>,

        /// Print the recovery phrase after generating.
        #[arg(long)]
        show_mnemonic: bool,

        /// Replace an already-stored wallet.
        #[arg(long)]
        force: bool,
    },

    /// Import a 12-word recovery phrase (read from stdin) and persist
    /// the derived wallet.
    Import {
        /// Optional BIP39 passphrase the wallet was created with.
        #[arg(long)]
        passphrase: Option<String>,
    },

    /// Show session state and the stored wallet's address, if any.
    Status,

    /// Print the wallet address.
    Address {
        /// Print the EIP-55 mixed-case form instead of lowercase.
        #[arg(long)]
        checksum: bool,
    },

    /// Print the stored recovery phrase.
    Export {
        /// Confirm that the phrase may be written to stdout.
        #[arg(long)]
        yes: bool,
    },

    /// Sign a hex payload with the wallet key.
    Sign {
        /// Payload bytes as hex, with or without a 0x prefix.
        payload: String,
    },

    /// Delete the stored wallet.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Suggest dictionary words for a prefix.
    Words {
        /// Word prefix typed so far.
        prefix: String,
    },
}

#[tokio::main]
async fn main() {
    logging::init_from_env();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Dictionary lookups need no store at all.
    if let Commands::Words { prefix } = &cli.command {
        return print_words(prefix, cli.json);
    }

    let session = WalletSession::new(build_store(&cli)?);

    match cli.command {
        Commands::Generate {
            passphrase,
            show_mnemonic,
            force,
        } => {
            if session.restore().await? && !force {
                bail!("a wallet is already stored (use --force to replace it)");
            }
            let summary = session
                .generate_with_passphrase(passphrase.map(SecretString::from))
                .await?;
            session.persist().await?;
            print_summary(&summary, cli.json)?;
            if show_mnemonic {
                print_phrase(&session, cli.json)?;
            }
        }

        Commands::Import { passphrase } => {
            let words = read_phrase_from_stdin()?;
            let summary = session
                .import(&words, passphrase.map(SecretString::from))
                .await?;
            session.persist().await?;
            print_summary(&summary, cli.json)?;
        }

        Commands::Status => {
            let stored = session.restore().await?;
            let report = StatusReport {
                status: session.status().to_string(),
                backend: session.store_kind(),
                address: stored.then(|| session.address()).transpose()?.map(|a| a.to_string()),
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Status:  {}", report.status);
                println!("Backend: {}", report.backend);
                if let Some(address) = &report.address {
                    println!("Address: {address}");
                }
            }
        }

        Commands::Address { checksum } => {
            restore_or_bail(&session).await?;
            let address = session.address()?;
            let rendered = if checksum {
                checksum_address(&address)
            } else {
                address.to_string()
            };
            if cli.json {
                println!("{}", serde_json::json!({ "address": rendered }));
            } else {
                println!("{rendered}");
            }
        }

        Commands::Export { yes } => {
            if !yes {
                bail!("refusing to print the recovery phrase without --yes");
            }
            restore_or_bail(&session).await?;
            print_phrase(&session, cli.json)?;
        }

        Commands::Sign { payload } => {
            let bytes = hex::decode(payload.trim_start_matches("0x"))
                .context("payload must be hex")?;
            restore_or_bail(&session).await?;
            let signature = session.sign(&bytes)?;
            if cli.json {
                println!("{}", serde_json::json!({ "signature": signature }));
            } else {
                println!("{signature}");
            }
        }

        Commands::Clear { yes } => {
            if !yes {
                bail!("refusing to delete the stored wallet without --yes");
            }
            session.purge().await?;
            if cli.json {
                println!("{}", serde_json::json!({ "cleared": true }));
            } else {
                println!("Stored wallet deleted.");
            }
        }

        Commands::Words { .. } => unreachable!("handled above"),
    }

    Ok(())
}

#[derive(Serialize)]
struct StatusReport {
    status: String,
    backend: &'static str,
    address: Option<String>,
}

fn build_store(cli: &Cli) -> Result<Arc<dyn SecretStore>> {
    Ok(match cli.store {
        StoreBackend::File => {
            let password = resolve_password(cli)?;
            Arc::new(EncryptedFileStore::new(&cli.path, password))
        }
        StoreBackend::Keychain => {
            Arc::new(KeychainStore::new().context("opening the keychain credential")?)
        }
    })
}

fn resolve_password(cli: &Cli) -> Result<SecretString> {
    if let Some(password) = &cli.password {
        return Ok(SecretString::from(password.clone()));
    }
    if let Ok(password) = std::env::var("WALLET_PASSWORD") {
        return Ok(SecretString::from(password));
    }
    bail!("the file store needs --password or WALLET_PASSWORD");
}

fn read_phrase_from_stdin() -> Result<Zeroizing<String>> {
    use std::io::{BufRead, IsTerminal, Write};

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprint!("Enter the 12-word recovery phrase: ");
        std::io::stderr().flush().ok();
    }

    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("failed to read the phrase from stdin")?;
    Ok(Zeroizing::new(line))
}

async fn restore_or_bail(session: &WalletSession) -> Result<()> {
    if !session.restore().await? {
        bail!("no wallet stored (run `walletd generate` first)");
    }
    debug_assert_eq!(session.status(), SessionStatus::Ready);
    Ok(())
}

fn print_summary(summary: &IdentitySummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("Address:  {}", summary.checksum_address);
    if let Some(created) = chrono::DateTime::from_timestamp(summary.created_at, 0) {
        println!("Created:  {}", created.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if !summary.has_mnemonic {
        println!("Note: this wallet has no recoverable phrase (key-only restore).");
    }
    Ok(())
}

fn print_phrase(session: &WalletSession, json: bool) -> Result<()> {
    let phrase = session.export()?;
    if json {
        println!("{}", serde_json::json!({ "mnemonic": phrase.as_str() }));
    } else {
        eprintln!("Anyone who sees these words can take everything this wallet holds.");
        println!("{}", phrase.as_str());
    }
    Ok(())
}

fn print_words(prefix: &str, json: bool) -> Result<()> {
    let matches = suggest_words(prefix);
    if json {
        println!("{}", serde_json::to_string(&matches)?);
    } else {
        for word in matches {
            println!("{word}");
        }
    }
    Ok(())
}
