use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{Address, U256};
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use k256::ecdsa::SigningKey;
use meta_relay_encoder::{meta_transaction_digest, relayed_calldata, sign_meta_transaction};
use meta_relay_types::DomainParams;
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build and sign meta-transaction requests for a relayer to submit via `executeMetaTransaction`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the EIP-712 digest a signer must sign.
    Digest {
        #[command(flatten)]
        domain: DomainArgs,

        /// Address of the signer the request is made for.
        #[arg(long)]
        from: Address,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// Sign a request and emit the executeMetaTransaction arguments as JSON.
    Sign {
        #[command(flatten)]
        domain: DomainArgs,

        #[command(flatten)]
        request: RequestArgs,

        #[command(flatten)]
        key: KeyArgs,

        /// Write the signed request here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct DomainArgs {
    /// EIP-712 domain name the dispatcher was initialized with.
    #[arg(long, env = "META_TX_NAME")]
    name: String,

    /// EIP-712 domain version.
    #[arg(long = "domain-version", env = "META_TX_VERSION", default_value = "1")]
    domain_version: String,

    #[arg(long, env = "CHAIN_ID")]
    chain_id: u64,

    /// Address of the dispatcher (the contract that verifies the signature).
    #[arg(long, env = "VERIFYING_CONTRACT")]
    verifying_contract: Address,
}

impl DomainArgs {
    fn params(&self) -> DomainParams {
        DomainParams::new(
            self.name.clone(),
            self.domain_version.clone(),
            self.chain_id,
            self.verifying_contract,
        )
    }
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Current dispatcher nonce of the signer (`getNonce`), decimal or 0x hex.
    #[arg(long, default_value = "0")]
    nonce: U256,

    /// ABI-encoded call to relay, hex (0x...).
    #[arg(long)]
    function_data: String,
}

impl RequestArgs {
    fn function_data(&self) -> Result<Vec<u8>> {
        decode_hex(&self.function_data).context("invalid --function-data")
    }
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// Path to a file containing the signer private key.
    #[arg(long, env = "PRIV_KEY_PATH", conflicts_with = "private_key")]
    private_key_path: Option<PathBuf>,

    /// Signer private key (hex string, 0x...).
    #[arg(long, env = "PKEY", conflicts_with = "private_key_path")]
    private_key: Option<String>,
}

impl KeyArgs {
    fn signing_key(&self) -> Result<SigningKey> {
        let raw = if let Some(ref path) = self.private_key_path {
            fs::read_to_string(path)
                .with_context(|| format!("failed reading key file {}", path.display()))?
        } else if let Some(ref pk) = self.private_key {
            pk.clone()
        } else {
            return Err(anyhow!(
                "missing signer key: provide --private-key-path or --private-key (or set PRIV_KEY_PATH/PKEY)"
            ));
        };

        let bytes = decode_hex(raw.trim()).context("private key is not valid hex")?;
        SigningKey::from_slice(&bytes).map_err(|e| anyhow!("invalid private key: {e}"))
    }
}

#[derive(Serialize, Debug)]
struct DomainOutput {
    name: String,
    version: String,
    chain_id: u64,
    verifying_contract: String,
}

#[derive(Serialize, Debug)]
struct SignedRequestOutput {
    domain: DomainOutput,
    user_address: String,
    nonce: String,
    function_data: String,
    digest: String,
    signature: String,
    /// Calldata the dispatcher forwards to itself, for trace comparison.
    relayed_calldata: String,
    created_at: String,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    setup_tracing(&cli.log_level);

    match cli.command {
        Command::Digest {
            domain,
            from,
            request,
        } => {
            let data = request.function_data()?;
            let digest =
                meta_transaction_digest(&domain.params(), request.nonce, from, &data);
            debug!(%from, nonce = %request.nonce, "computed meta-transaction digest");
            println!("{digest}");
        }
        Command::Sign {
            domain,
            request,
            key,
            out,
        } => {
            let params = domain.params();
            let data = request.function_data()?;
            let signing_key = key.signing_key()?;
            let signed =
                sign_meta_transaction(&params, request.nonce, &data, &signing_key)
                    .map_err(|e| anyhow!("signing failed: {e}"))?;
            info!(from = %signed.from, nonce = %signed.nonce, "signed meta-transaction");

            let output = SignedRequestOutput {
                domain: DomainOutput {
                    name: params.name.clone(),
                    version: params.version.clone(),
                    chain_id: params.chain_id,
                    verifying_contract: params.verifying_contract.to_string(),
                },
                user_address: signed.from.to_string(),
                nonce: signed.nonce.to_string(),
                function_data: format!("0x{}", hex::encode(&signed.function_data)),
                digest: signed.digest.to_string(),
                signature: format!("0x{}", hex::encode(&signed.signature)),
                relayed_calldata: format!(
                    "0x{}",
                    hex::encode(relayed_calldata(&signed.function_data, signed.from))
                ),
                created_at: OffsetDateTime::now_utc()
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| "unknown".to_string()),
            };

            match out {
                Some(path) => {
                    write_json_atomic(&path, &output)?;
                    println!("Wrote signed request for {} to {}", signed.from, path.display());
                }
                None => println!(
                    "{}",
                    serde_json::to_string_pretty(&output)
                        .context("failed serialising signed request")?
                ),
            }
        }
    }
    Ok(())
}

fn setup_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(s)?)
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let serialised =
        serde_json::to_string_pretty(value).context("failed serialising signed request")?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, serialised.as_bytes())
        .with_context(|| format!("failed writing temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
