//! Customer sheet ingestion.
//!
//! Reads the client's CSV sheet and turns each data row inside the
//! configured window into a [`CustomerRecord`]. Field problems degrade per
//! field or per row; only a missing sheet, an empty sheet, or a broken
//! mapping abort the batch.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use pvgen_models::field_mapping::{find_primary_field, MappingSet};
use pvgen_models::CustomerRecord;

use crate::error::{BatchError, WorkerResult};

/// Read the customers in rows `start_row..=end_row` (1-based data rows,
/// header excluded).
pub fn read_customers(
    sheet: &Path,
    mapping: &MappingSet,
    start_row: u32,
    end_row: u32,
) -> WorkerResult<Vec<CustomerRecord>> {
    if !sheet.exists() {
        return Err(BatchError::ingest(format!(
            "customer sheet not found: {}",
            sheet.display()
        )));
    }

    let primary_field = find_primary_field(mapping)?;
    let primary_column = mapping
        .get(primary_field)
        .map(|m| m.column_name.as_str())
        .unwrap_or(primary_field);

    let mut reader = csv::Reader::from_path(sheet)?;
    let headers = reader.headers()?.clone();
    let column_index = |name: &str| headers.iter().position(|h| h == name);

    let Some(primary_idx) = column_index(primary_column) else {
        return Err(BatchError::ingest(format!(
            "primary column '{}' not found in the customer sheet",
            primary_column
        )));
    };

    let mut customers = Vec::new();
    let mut total_rows = 0u32;

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i as u32 + 1;
        total_rows += 1;
        if row < start_row || row > end_row {
            continue;
        }

        let mut fields = BTreeMap::new();
        for (field, field_mapping) in mapping {
            let Some(idx) = column_index(&field_mapping.column_name) else {
                warn!(
                    row,
                    field = %field,
                    column = %field_mapping.column_name,
                    "column not found, skipping field"
                );
                continue;
            };
            match record.get(idx).map(str::trim) {
                Some(value) if !value.is_empty() => {
                    fields.insert(field.clone(), value.to_string());
                }
                _ => {
                    warn!(row, field = %field, "missing value, skipping field");
                }
            }
        }

        let key = record.get(primary_idx).map(str::trim).unwrap_or_default();
        if key.is_empty() {
            warn!(row, "primary key missing, skipping row");
            continue;
        }

        info!(row, user_key = %key, "customer row ingested");
        customers.push(CustomerRecord::new(key, fields));
    }

    if total_rows == 0 {
        return Err(BatchError::ingest(format!(
            "customer sheet {} has no data rows",
            sheet.display()
        )));
    }

    Ok(customers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn mapping() -> MappingSet {
        serde_json::from_str(
            r#"{
                "phone": {"column_name": "Phone Number", "IsPrimary": "True"},
                "name": {"column_name": "Full Name"},
                "score": {"column_name": "Score"}
            }"#,
        )
        .unwrap()
    }

    fn write_sheet(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_window_inclusive() {
        let sheet = write_sheet(
            "Phone Number,Full Name,Score\n\
             911,Asha,90\n\
             912,Vikram,85\n\
             913,Meera,80\n",
        );
        let customers = read_customers(sheet.path(), &mapping(), 2, 3).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].key, "912");
        assert_eq!(customers[1].key, "913");
    }

    #[test]
    fn test_missing_primary_drops_row() {
        let sheet = write_sheet(
            "Phone Number,Full Name,Score\n\
             911,Asha,90\n\
             ,NoPhone,50\n",
        );
        let customers = read_customers(sheet.path(), &mapping(), 1, 10).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].key, "911");
    }

    #[test]
    fn test_missing_value_skips_field_only() {
        let sheet = write_sheet(
            "Phone Number,Full Name,Score\n\
             911,Asha,\n",
        );
        let customers = read_customers(sheet.path(), &mapping(), 1, 1).unwrap();
        assert_eq!(customers[0].fields.get("name").unwrap(), "Asha");
        assert!(!customers[0].fields.contains_key("score"));
    }

    #[test]
    fn test_missing_column_skips_field_for_all_rows() {
        let sheet = write_sheet(
            "Phone Number,Full Name\n\
             911,Asha\n",
        );
        let customers = read_customers(sheet.path(), &mapping(), 1, 1).unwrap();
        assert!(!customers[0].fields.contains_key("score"));
    }

    #[test]
    fn test_empty_sheet_is_fatal() {
        let sheet = write_sheet("Phone Number,Full Name,Score\n");
        let err = read_customers(sheet.path(), &mapping(), 1, 10).unwrap_err();
        assert!(matches!(err, BatchError::Ingest(_)));
    }

    #[test]
    fn test_missing_primary_column_is_fatal() {
        let sheet = write_sheet("Full Name,Score\nAsha,90\n");
        let err = read_customers(sheet.path(), &mapping(), 1, 10).unwrap_err();
        assert!(matches!(err, BatchError::Ingest(_)));
    }
}
