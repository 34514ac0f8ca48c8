use super::ExportError;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Export any serializable data structure to pretty-printed JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<(), ExportError>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let json_data = serde_json::to_string_pretty(data)
        .map_err(|e| ExportError::SerializationError(e.to_string()))?;

    let mut file = std::fs::File::create(output_path.as_ref())?;
    file.write_all(json_data.as_bytes())?;

    info!(file = %output_path.as_ref().display(), bytes = json_data.len(), "Exported JSON");
    Ok(())
}
