use crate::command_title;
use crate::prelude::*;
use vqp_vault::{AccessPolicy, DefaultPolicy, EncryptedVaultStore};

const DEFAULT_ITERATIONS: u32 = 100_000;
const DEFAULT_KEY_LENGTH: usize = 32;

#[derive(Subcommand)]
pub(crate) enum VaultCommand {
    /// Create a new encrypted vault file.
    Init(InitArgs),
    /// Re-encrypt an existing vault under a new passphrase.
    Rotate(RotateArgs),
    /// Print a vault file's stored metadata (algorithm, key derivation
    /// parameters, timestamp) without decrypting its contents.
    Inspect(InspectArgs),
}

#[derive(Args)]
pub(crate) struct InitArgs {
    /// Where to write the new vault file.
    path: PathBuf,

    /// Optional JSON document to seed the vault with. Defaults to `{}`.
    #[arg(long)]
    initial_data: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct RotateArgs {
    /// Path to the existing vault file.
    path: PathBuf,
}

#[derive(Args)]
pub(crate) struct InspectArgs {
    /// Path to the vault file.
    path: PathBuf,
}

pub(crate) fn run(action: VaultCommand) -> Result<(), VqpCliError> {
    match action {
        VaultCommand::Init(args) => init(args),
        VaultCommand::Rotate(args) => rotate(args),
        VaultCommand::Inspect(args) => inspect(args),
    }
}

fn init(args: InitArgs) -> Result<(), VqpCliError> {
    command_title!("Initializing vault at {}", args.path.display());

    let initial_data = match &args.initial_data {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read initial data file {path:?}"))?;
            serde_json::from_str(&contents).context("initial data file is not valid JSON")?
        }
        None => serde_json::json!({}),
    };

    let passphrase = read_passphrase("New vault passphrase: ")?;
    EncryptedVaultStore::create(
        &args.path,
        passphrase,
        DEFAULT_ITERATIONS,
        DEFAULT_KEY_LENGTH,
        allow_all_policy(),
        initial_data,
        true,
    )
    .map_err(|e| anyhow!("failed to create vault: {e}"))?;

    println!("vault created at {}", args.path.display());
    Ok(())
}

fn rotate(args: RotateArgs) -> Result<(), VqpCliError> {
    command_title!("Rotating vault passphrase for {}", args.path.display());

    let old_passphrase = read_passphrase("Current vault passphrase: ")?;
    let vault = EncryptedVaultStore::open(
        &args.path,
        old_passphrase,
        DEFAULT_ITERATIONS,
        DEFAULT_KEY_LENGTH,
        allow_all_policy(),
        false,
        true,
    )
    .map_err(|e| anyhow!("failed to open vault: {e}"))?;

    let new_passphrase = read_passphrase("New vault passphrase: ")?;
    vault
        .rotate(new_passphrase)
        .map_err(|e| anyhow!("failed to rotate vault: {e}"))?;

    println!("vault passphrase rotated");
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<(), VqpCliError> {
    command_title!("Inspecting vault at {}", args.path.display());

    let passphrase = read_passphrase("Vault passphrase: ")?;
    let vault = EncryptedVaultStore::open(
        &args.path,
        passphrase,
        DEFAULT_ITERATIONS,
        DEFAULT_KEY_LENGTH,
        allow_all_policy(),
        false,
        true,
    )
    .map_err(|e| anyhow!("failed to open vault: {e}"))?;

    let record = vault
        .inspect()
        .map_err(|e| anyhow!("failed to inspect vault: {e}"))?;

    // Everything but the decrypted plaintext: the ciphertext, IV, and
    // checksum are opaque blobs, never the data they protect.
    println!("version:        {}", record.version);
    println!("algorithm:      {}", record.algorithm);
    println!("saved at:       {}", record.timestamp);
    println!("checksum:       {}", record.checksum);
    Ok(())
}

/// CLI-only default, see `commands::query::run`'s identical note.
fn allow_all_policy() -> AccessPolicy {
    AccessPolicy {
        default_policy: DefaultPolicy::Allow,
        ..AccessPolicy::default()
    }
}
