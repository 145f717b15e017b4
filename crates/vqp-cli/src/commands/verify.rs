use crate::command_title;
use crate::prelude::*;
use vqp_engine::Verifier;
use vqp_types::Response;

#[derive(Args)]
pub(crate) struct VerifyArgs {
    /// Path to a JSON-encoded `Response`.
    response: PathBuf,

    /// Expect `response.queryId` to equal this value.
    #[arg(long)]
    query_id: Option<uuid::Uuid>,
}

pub(crate) fn run(args: VerifyArgs) -> Result<(), VqpCliError> {
    command_title!("Verifying {}", args.response.display());

    let contents = std::fs::read_to_string(&args.response)
        .with_context(|| format!("failed to read response file {:?}", args.response))?;
    let response: Response =
        serde_json::from_str(&contents).context("response file is not a valid Response document")?;

    let report = Verifier::new().verify_complete(&response, args.query_id);

    println!("cryptographic proof: {}", colored_bool(report.cryptographic_proof));
    println!("metadata:            {}", colored_bool(report.metadata));
    println!("overall:             {}", colored_bool(report.overall));
    for detail in &report.details {
        println!("  - {detail}");
    }

    if !report.overall {
        return Err(anyhow!("response failed verification").into());
    }
    Ok(())
}

fn colored_bool(value: bool) -> colored::ColoredString {
    if value {
        "true".green()
    } else {
        "false".red()
    }
}
