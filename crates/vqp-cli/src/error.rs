use {crate::display::separator, crate::prelude::*, thiserror::Error};

/// Pretty-printed top-level error for the binary's `main`. Wraps the
/// engine's own fault taxonomy plus the usual clap/IO/anyhow surface.
#[derive(Debug, Error)]
pub(crate) enum VqpCliError {
    #[error("{error}{separator}\n{0}", error = "Syntax Error".red().bold(), separator = separator())]
    SyntaxError(clap::error::Error),

    #[error("{error}{separator}\n{0}", error = "IO Error".red().bold(), separator = separator())]
    IoError(std::io::Error),

    #[error("{error}{separator}\n{0}", error = "Error".red().bold(), separator = separator())]
    AnyError(anyhow::Error),

    #[error(
        "{error}{separator}\n{0} (fault={1})",
        error = "Protocol Fault".red().bold(),
        separator = separator()
    )]
    EngineFault(vqp_engine::EngineError, &'static str),
}

impl From<std::io::Error> for VqpCliError {
    fn from(err: std::io::Error) -> Self {
        VqpCliError::IoError(err)
    }
}

impl From<anyhow::Error> for VqpCliError {
    fn from(err: anyhow::Error) -> Self {
        VqpCliError::AnyError(err)
    }
}

impl From<vqp_engine::EngineError> for VqpCliError {
    fn from(err: vqp_engine::EngineError) -> Self {
        let kind = err.fault_kind();
        VqpCliError::EngineFault(err, kind)
    }
}
