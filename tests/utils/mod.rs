use std::fs::File;
use std::path::Path;

use arrow::datatypes::FieldRef;
use parquet::arrow::ArrowWriter;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_arrow::schema::{SchemaLike, TracingOptions};

use pmi_synth::utils::test_utils::{reference_data, test_config_builder};
use pmi_synth::{GeneratorConfig, GeneratorConfigBuilder, IdentityGraphBuilder, PersonRecord, PmiOutput, UrValue};

/// Configuration over a UR range with a fixed seed and reference date
#[must_use]
pub fn config_for(seed: u64, start_ur: u64, end_ur: u64) -> GeneratorConfigBuilder {
    test_config_builder(seed).ur_range(start_ur, end_ur)
}

/// Run the builder against the in-memory reference data
pub fn generate(config: &GeneratorConfig) -> PmiOutput {
    let reference = reference_data();
    match IdentityGraphBuilder::from_config(config, &reference).run() {
        Ok(output) => output,
        Err(e) => panic!("generation failed: {e}"),
    }
}

/// Slots of every record carrying each UR value
#[must_use]
pub fn ur_index(records: &[PersonRecord]) -> FxHashMap<String, Vec<usize>> {
    let mut index: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    for (slot, record) in records.iter().enumerate() {
        index.entry(record.ur.to_string()).or_default().push(slot);
    }
    index
}

/// Records an Alias or Merged value resolves to
pub fn resolve<'r>(
    records: &'r [PersonRecord],
    index: &FxHashMap<String, Vec<usize>>,
    value: &UrValue,
) -> Vec<&'r PersonRecord> {
    index
        .get(&value.to_string())
        .map(|slots| slots.iter().map(|slot| &records[*slot]).collect())
        .unwrap_or_default()
}

/// Write typed rows to a Parquet file
pub fn write_parquet<T: Serialize + DeserializeOwned>(path: &Path, rows: &[T]) {
    let fields = Vec::<FieldRef>::from_type::<T>(TracingOptions::default()).unwrap();
    let batch = serde_arrow::to_record_batch(&fields, &rows).unwrap();
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}
