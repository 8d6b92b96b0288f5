//! I/O utilities.
//!
//! This module reads JSON and TOML settings files and writes output to files
//! or standard output.

use tokio::{
    fs::File,
    io::{AsyncWrite, AsyncWriteExt as _, BufWriter},
};

use crate::{prelude::*, toml_utils::from_toml_str};

/// Read TOML or JSON from a file, choosing a parser by file extension.
pub async fn read_json_or_toml<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned + for<'de> toml_span::Deserialize<'de>,
{
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at path: {:?}", path))?;
    let is_json = path.extension().is_some_and(|ext| ext == "json")
        || data.trim_start().starts_with('{');
    if is_json {
        serde_json::from_str(&data).with_context(|| {
            format!("Failed to parse JSON from file at path: {:?}", path)
        })
    } else {
        from_toml_str(&data).map_err(|err| {
            anyhow!(
                "Failed to parse TOML from file at path: {:?}: {}",
                path,
                describe_toml_errors(&err)
            )
        })
    }
}

/// Flatten a [`toml_span::DeserError`] into one line.
fn describe_toml_errors(err: &toml_span::DeserError) -> String {
    err.errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Create an [`AsyncWrite`] for a file or stdout.
pub async fn create_writer(
    path: Option<&Path>,
) -> Result<Box<dyn AsyncWrite + Unpin + Send + Sync + 'static>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .await
                .with_context(|| format!("Failed to create file at path: {:?}", path))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdout())),
    }
}

/// Write `data` to either standard output or a file.
pub async fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    let mut writer = BufWriter::new(create_writer(path).await?);
    writer
        .write_all(data)
        .await
        .context("Failed to write output")?;
    writer.flush().await.context("Failed to flush output")?;
    Ok(())
}
