use std::path::Path;
use trophy_api::source::{build_from_tables, load_layout, read_tables_file};
use trophy_api::{DEFAULT_TOP_SCORERS, Snapshot};

pub fn sample_snapshot_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("api/tests/fixtures/sample_snapshot.json")
}

/// The 30-fixture sample tournament with the embedded layout.
pub fn sample_snapshot() -> Snapshot {
    let layout = load_layout(None).unwrap();
    let raw = read_tables_file(&sample_snapshot_path()).unwrap();
    build_from_tables(layout, raw, DEFAULT_TOP_SCORERS).unwrap()
}
