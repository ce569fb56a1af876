//! Footer-only Parquet validation.
//!
//! Before a set of files is handed to the query engine, each file's footer is
//! fetched with at most two range requests and parsed into an Arrow schema.
//! This catches truncated or non-Parquet files up front and lets the loader
//! compare chunk schemas without reading any row data.

use std::sync::Arc;
use arrow::datatypes::Schema;
use bytes::{Bytes, BytesMut};
use object_store::{ObjectMeta, ObjectStore};
use parquet::arrow::parquet_to_arrow_schema;
use parquet::file::reader::{FileReader, SerializedFileReader};
use crate::error::StoreError;
use crate::utils::file_interaction::to_local_path;

/// Size of the Parquet footer: 4 bytes metadata length + 4 bytes "PAR1" magic
const FOOTER_SIZE: usize = 8;
/// First read covers the tail of the file; most footers fit in it
const INITIAL_READ: u64 = 1024 * 1024;

/// Extracts the metadata length from the last 8 bytes of a Parquet file.
///
/// ```text
/// [... file content ...]
/// [metadata bytes]
/// [4 bytes: metadata length (little-endian u32)]
/// [4 bytes: "PAR1" magic number]
/// ```
fn read_metadata_length(footer_bytes: &[u8]) -> Result<usize, String> {
    if footer_bytes.len() < FOOTER_SIZE {
        return Err("footer too short".to_string());
    }

    let magic = &footer_bytes[footer_bytes.len() - 4..];
    if magic != b"PAR1" {
        return Err("missing PAR1 magic number".to_string());
    }

    let length_bytes = &footer_bytes[footer_bytes.len() - 8..footer_bytes.len() - 4];
    let metadata_length = u32::from_le_bytes([
        length_bytes[0],
        length_bytes[1],
        length_bytes[2],
        length_bytes[3],
    ]) as usize;

    Ok(metadata_length)
}

/// Reads the footer of one Parquet object and returns its Arrow schema.
///
/// # Errors
///
/// `StoreError::Corrupt` if the footer is missing, truncated, or does not
/// decode; `StoreError::ObjectStore` if the range requests themselves fail.
pub async fn read_arrow_schema(
    store: &Arc<dyn ObjectStore>,
    meta: &ObjectMeta,
) -> Result<Schema, StoreError> {
    let path = to_local_path(&meta.location).display().to_string();
    let corrupt = |reason: String| StoreError::Corrupt { path: path.clone(), reason };

    let file_size = meta.size;
    if (file_size as usize) < FOOTER_SIZE + 4 {
        return Err(corrupt(format!("file is only {} bytes", file_size)));
    }

    let initial_read_size = INITIAL_READ.min(file_size);
    let initial_start = file_size - initial_read_size;
    let initial_bytes = store.get_range(&meta.location, initial_start..file_size).await?;

    let footer_offset = initial_bytes.len().saturating_sub(FOOTER_SIZE);
    let metadata_length = read_metadata_length(&initial_bytes[footer_offset..]).map_err(&corrupt)?;
    let total_metadata_size = metadata_length + FOOTER_SIZE;

    let footer: Bytes = if total_metadata_size <= initial_bytes.len() {
        let metadata_start = initial_bytes.len() - total_metadata_size;
        initial_bytes.slice(metadata_start..)
    } else {
        let additional = (total_metadata_size - initial_bytes.len()) as u64;
        let additional_start = initial_start
            .checked_sub(additional)
            .ok_or_else(|| corrupt("metadata length exceeds file size".to_string()))?;
        let additional_bytes = store.get_range(&meta.location, additional_start..initial_start).await?;

        let mut combined = BytesMut::with_capacity(total_metadata_size);
        combined.extend_from_slice(&additional_bytes);
        combined.extend_from_slice(&initial_bytes);
        combined.freeze()
    };

    let reader = SerializedFileReader::new(footer).map_err(|e| corrupt(e.to_string()))?;
    let file_metadata = reader.metadata().file_metadata();
    parquet_to_arrow_schema(file_metadata.schema_descr(), file_metadata.key_value_metadata())
        .map_err(|e| corrupt(e.to_string()))
}

/// Renders a schema as `name:type` pairs for comparison and error messages.
pub fn describe_schema(schema: &Schema) -> String {
    schema
        .fields()
        .iter()
        .map(|f| format!("{}:{}", f.name(), f.data_type()))
        .collect::<Vec<_>>()
        .join(", ")
}
