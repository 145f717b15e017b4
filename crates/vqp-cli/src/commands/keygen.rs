use crate::command_title;
use crate::prelude::*;
use vqp_crypto::{KeyRegistry, DEFAULT_KEY_ID};
use vqp_types::SignatureAlgorithm;

#[derive(Clone, Copy, clap::ValueEnum)]
#[value(rename_all = "kebab-case")]
pub(crate) enum Algorithm {
    Ed25519,
    Secp256k1,
    RsaPss,
}

impl From<Algorithm> for SignatureAlgorithm {
    fn from(value: Algorithm) -> Self {
        match value {
            Algorithm::Ed25519 => SignatureAlgorithm::Ed25519,
            Algorithm::Secp256k1 => SignatureAlgorithm::Secp256k1,
            Algorithm::RsaPss => SignatureAlgorithm::RsaPss,
        }
    }
}

#[derive(Args)]
pub(crate) struct KeygenArgs {
    /// Which signature algorithm to materialize the `default` keypair
    /// under.
    #[arg(long, value_enum, default_value = "ed25519")]
    algorithm: Algorithm,
}

pub(crate) fn run(args: KeygenArgs) -> Result<(), VqpCliError> {
    command_title!("Generating default signing keypair");

    let registry = KeyRegistry::new();
    registry
        .ensure_default(args.algorithm.into())
        .map_err(|e| anyhow!("failed to generate keypair: {e}"))?;
    let public_key = registry
        .public_key_hex(DEFAULT_KEY_ID)
        .map_err(|e| anyhow!("failed to read generated public key: {e}"))?;

    println!("public key: {public_key}");
    println!(
        "{}",
        "note: this key lives only in this process's memory; a real deployment \
         must persist it behind its own key-management collaborator."
            .truecolor(150, 150, 0)
    );
    Ok(())
}
