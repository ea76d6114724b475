//! Airflow variables file
//!
//! `default-variables` from pyproject.toml are written as key-sorted JSON so
//! the one-off `variables -i` container can import them.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ComposeError, ErrorCode, Result};

/// Serialise variables with a four-space indent
pub fn to_json(variables: &BTreeMap<String, Value>) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    variables.serialize(&mut serializer)?;

    String::from_utf8(buffer).map_err(|e| {
        ComposeError::storage_with_code(
            ErrorCode::STORAGE_SERIALIZATION_ERROR,
            "variables JSON is not valid UTF-8",
            None,
        )
        .with_source(e)
    })
}

pub async fn write_variables_file(path: &Path, variables: &BTreeMap<String, Value>) -> Result<()> {
    let json = to_json(variables)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| ComposeError::from(e).with_path(path))?;

    tracing::debug!("Wrote {} variables to {}", variables.len(), path.display());
    Ok(())
}
