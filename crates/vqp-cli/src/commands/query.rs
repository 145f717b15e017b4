use crate::prelude::*;
use crate::command_title;
use vqp_engine::{
    AlwaysDenyConsent, DefaultSigner, LoggingAuditSink, NeverCancelled, Responder,
    ResponderConfig,
};
use vqp_types::Query;
use vqp_vault::{AccessPolicy, DefaultPolicy, EncryptedVaultStore};
use vqp_vocab::{BuiltinVocabularyResolver, VocabSchema};

#[derive(Subcommand)]
pub(crate) enum QueryCommand {
    /// Evaluate a query JSON file against a vault and print the signed
    /// response to stdout.
    Run(RunArgs),
}

#[derive(Args)]
pub(crate) struct RunArgs {
    /// Path to a JSON-encoded `Query`.
    query: PathBuf,

    /// Path to the encrypted vault file.
    #[arg(long, default_value = "vault.json")]
    vault: PathBuf,

    /// Optional JSON `VocabSchema` document to use instead of resolving
    /// the query's `vocab` URI through the built-in vocabularies.
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// Optional `ResponderConfig` as JSON or TOML.
    #[arg(long)]
    config: Option<PathBuf>,
}

pub(crate) fn run(action: QueryCommand) -> Result<(), VqpCliError> {
    let QueryCommand::Run(args) = action;
    command_title!("Running query {}", args.query.display());

    let query_json = std::fs::read_to_string(&args.query)
        .with_context(|| format!("failed to read query file {:?}", args.query))?;
    let query: Query =
        serde_json::from_str(&query_json).context("query file is not a valid Query document")?;

    let config = load_config(args.config.as_deref())?;

    let provided_vocabulary = match &args.vocab {
        Some(path) => {
            let document = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read vocabulary file {path:?}"))?;
            let document: serde_json::Value =
                serde_json::from_str(&document).context("vocabulary file is not valid JSON")?;
            Some(
                VocabSchema::new(query.query.vocab.clone(), document)
                    .map_err(|e| anyhow!("invalid vocabulary document: {e}"))?,
            )
        }
        None => None,
    };

    let passphrase = read_passphrase("Vault passphrase: ")?;
    let vault = EncryptedVaultStore::open(
        &args.vault,
        passphrase,
        config.key_derivation.iterations,
        config.key_derivation.key_length,
        allow_all_policy(),
        false,
        config.cache_enabled,
    )
    .map_err(|e| anyhow!("failed to open vault: {e}"))?;

    let responder = Responder::new(
        config.clone(),
        Box::new(BuiltinVocabularyResolver::new()),
        Box::new(vault),
        Box::new(DefaultSigner::new(config.signature_algorithm)),
        Box::new(LoggingAuditSink),
        Box::new(AlwaysDenyConsent),
        Box::new(NeverCancelled),
        None,
    )?;

    let response = responder.process_query(&query, provided_vocabulary)?;
    println!("{}", serde_json::to_string_pretty(&response).expect("Response always serializes"));
    Ok(())
}

/// CLI-only default: local experimentation permits every path, since this
/// binary has no deployment-specific policy store to load from. A real
/// deployment wires its own `AccessPolicy` into `ResponderConfig` or a
/// custom `DataPort`, not this CLI.
fn allow_all_policy() -> AccessPolicy {
    AccessPolicy {
        default_policy: DefaultPolicy::Allow,
        ..AccessPolicy::default()
    }
}

pub(crate) fn load_config(path: Option<&std::path::Path>) -> AnyResult<ResponderConfig> {
    let Some(path) = path else {
        return Ok(ResponderConfig::default());
    };
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("failed to read config file {path:?}"))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&contents).context("invalid TOML responder config"),
        _ => serde_json::from_str(&contents).context("invalid JSON responder config"),
    }
}
