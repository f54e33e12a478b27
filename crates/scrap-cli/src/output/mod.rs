use serde::Serialize;
use scrap_core::enums::ErrorKind;
use scrap_core::responses::ApiResponse;
use scrap_lifecycle::LifecycleError;

use crate::cli::OutputFormat;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Print a success envelope around `data`.
pub fn success<T: Serialize>(
    message: &str,
    data: T,
    format: OutputFormat,
) -> anyhow::Result<()> {
    output(&ApiResponse::ok(message, data), format)
}

/// Build the failure envelope for a lifecycle error.
pub fn failure_envelope(error: &LifecycleError) -> ApiResponse<()> {
    ApiResponse::failure(error.kind(), failure_message(error.kind()), error.to_string())
}

/// Print the failure envelope for a lifecycle error.
pub fn failure(error: &LifecycleError, format: OutputFormat) -> anyhow::Result<()> {
    output(&failure_envelope(error), format)
}

const fn failure_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "Resource not found",
        ErrorKind::Expired => "Shared link has expired",
        ErrorKind::ValidationError => "Request failed validation",
        ErrorKind::StorageUnavailable => "Object storage unavailable",
        ErrorKind::StoreError => "Metadata store error",
        ErrorKind::PartialFailure => "Operation partially failed",
    }
}
