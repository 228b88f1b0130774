//! `sealwrap` — command-line wrapper around the envelope cipher.
//!
//! Thin glue over the four library operations: key generation, IV
//! generation, encrypt, decrypt. Keys arrive via flags or environment
//! variables and are never logged.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Args, Parser, Subcommand};
use rand::{rngs::OsRng, RngCore};
use sealwrap::{EnvelopeCipher, RJD_256_HMAC_SHA256};

#[derive(Parser)]
#[command(name = "sealwrap")]
#[command(about = "Authenticated-encryption envelopes (encrypt-then-MAC)", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct KeyArgs {
    /// Base64 encryption key (decodes to 32 bytes).
    #[arg(long, env = "SEALWRAP_ENCRYPTION_KEY", hide_env_values = true)]
    encryption_key: String,

    /// Base64 MAC key (decodes to 32 bytes).
    #[arg(long, env = "SEALWRAP_MAC_KEY", hide_env_values = true)]
    mac_key: String,
}

impl KeyArgs {
    fn cipher(&self) -> Result<EnvelopeCipher> {
        EnvelopeCipher::new(&self.encryption_key, &self.mac_key)
            .context("invalid key material")
    }
}

#[derive(Subcommand)]
enum Command {
    /// Generate a fresh encryption/MAC key pair, base64, one per line.
    Keygen,

    /// Generate a fresh base64 IV of one cipher block.
    GenIv {
        #[command(flatten)]
        keys: KeyArgs,
    },

    /// Encrypt plaintext (argument, or stdin when absent) to an envelope.
    Encrypt {
        #[command(flatten)]
        keys: KeyArgs,

        /// Base64 IV override. For reproducing test vectors only — never
        /// reuse an IV under the same key.
        #[arg(long)]
        iv: Option<String>,

        plaintext: Option<String>,
    },

    /// Verify and decrypt an envelope (argument, or stdin when absent).
    Decrypt {
        #[command(flatten)]
        keys: KeyArgs,

        envelope: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))?;

    match Cli::parse().command {
        Command::Keygen => {
            let mut key = [0u8; RJD_256_HMAC_SHA256.key_size];
            OsRng.fill_bytes(&mut key);
            println!("{}", STANDARD.encode(key));
            OsRng.fill_bytes(&mut key);
            println!("{}", STANDARD.encode(key));
        }
        Command::GenIv { keys } => {
            println!("{}", keys.cipher()?.generate_iv());
        }
        Command::Encrypt {
            keys,
            iv,
            plaintext,
        } => {
            let plaintext = match plaintext {
                Some(text) => text.into_bytes(),
                None => read_stdin()?,
            };
            tracing::debug!(bytes = plaintext.len(), "encrypting");
            let envelope = keys.cipher()?.encrypt(&plaintext, iv.as_deref())?;
            println!("{envelope}");
        }
        Command::Decrypt { keys, envelope } => {
            let envelope = match envelope {
                Some(wire) => wire,
                None => String::from_utf8(read_stdin()?).context("envelope is not UTF-8")?,
            };
            let plaintext = keys.cipher()?.decrypt(envelope.trim())?;
            std::io::stdout()
                .write_all(&plaintext)
                .context("failed to write plaintext")?;
        }
    }
    Ok(())
}

fn read_stdin() -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn keygen_output_is_usable_key_material() {
        // What keygen prints must be accepted by the cipher constructor.
        let mut key = [0u8; RJD_256_HMAC_SHA256.key_size];
        OsRng.fill_bytes(&mut key);
        let enc = STANDARD.encode(key);
        OsRng.fill_bytes(&mut key);
        let mac = STANDARD.encode(key);
        assert!(EnvelopeCipher::new(&enc, &mac).is_ok());
    }
}
