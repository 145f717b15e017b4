mod commands;
mod display;
mod error;
mod prelude;

use prelude::*;

#[derive(Parser)]
#[command(name = "vqp", version, about = "Verifiable Query Protocol responder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a query against a local encrypted vault.
    Query {
        #[command(subcommand)]
        action: commands::query::QueryCommand,
    },
    /// Manage an encrypted vault file.
    Vault {
        #[command(subcommand)]
        action: commands::vault::VaultCommand,
    },
    /// Verify a response's shape, timing, and cryptographic proof.
    Verify(commands::verify::VerifyArgs),
    /// Generate the responder's default signing keypair and print its
    /// public key.
    Keygen(commands::keygen::KeygenArgs),
}

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{}", VqpCliError::SyntaxError(err));
            std::process::exit(2);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), VqpCliError> {
    match cli.command {
        Command::Query { action } => commands::query::run(action),
        Command::Vault { action } => commands::vault::run(action),
        Command::Verify(args) => commands::verify::run(args),
        Command::Keygen(args) => commands::keygen::run(args),
    }
}
