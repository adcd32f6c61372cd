use crate::builder::{self, BuildError};
use crate::client::{ApiError, WarehouseClient, WarehouseTarget};
use crate::credentials;
use crate::layout::{LayoutError, TournamentLayout};
use crate::rows::RawTables;
use crate::{DEFAULT_TOP_SCORERS, Snapshot};
use log::info;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where one snapshot load reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Local JSON file shaped `{"fixtures": [...], "standings": [...], "scorers": [...]}`.
    File(PathBuf),
    Warehouse(WarehouseTarget),
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSource::File(path) => write!(f, "file {}", path.display()),
            SnapshotSource::Warehouse(t) => write!(f, "warehouse {}.{}", t.project, t.dataset),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub source: SnapshotSource,
    /// Replaces the embedded layout when set.
    pub layout_file: Option<PathBuf>,
    pub top_scorers: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            source: SnapshotSource::Warehouse(WarehouseTarget::default()),
            layout_file: None,
            top_scorers: DEFAULT_TOP_SCORERS,
        }
    }
}

#[derive(Debug)]
pub enum LoadError {
    Layout(LayoutError),
    File(String),
    Api(ApiError),
    Build(BuildError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Layout(e) => write!(f, "{e}"),
            LoadError::File(msg) => write!(f, "snapshot file: {msg}"),
            LoadError::Api(e) => write!(f, "{e}"),
            LoadError::Build(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<LayoutError> for LoadError {
    fn from(e: LayoutError) -> Self {
        LoadError::Layout(e)
    }
}

impl From<ApiError> for LoadError {
    fn from(e: ApiError) -> Self {
        LoadError::Api(e)
    }
}

impl From<BuildError> for LoadError {
    fn from(e: BuildError) -> Self {
        LoadError::Build(e)
    }
}

pub fn load_layout(path: Option<&Path>) -> Result<TournamentLayout, LayoutError> {
    match path {
        Some(path) => TournamentLayout::from_file(path),
        None => TournamentLayout::embedded(),
    }
}

pub fn read_tables_file(path: &Path) -> Result<RawTables, LoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LoadError::File(format!("could not read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| LoadError::File(format!("invalid snapshot json at {}: {e}", path.display())))
}

/// Load a complete snapshot: layout, raw tables, placeholder names, build.
///
/// There is no partial result. Any failure, including a single row that does
/// not fit the layout, fails the load.
pub async fn load_snapshot(options: &LoadOptions) -> Result<Snapshot, LoadError> {
    let layout = load_layout(options.layout_file.as_deref())?;

    let raw = match &options.source {
        SnapshotSource::File(path) => read_tables_file(path)?,
        SnapshotSource::Warehouse(target) => {
            let (source, key) = credentials::resolve().map_err(ApiError::from)?;
            info!("using GCP credentials from {source}");
            WarehouseClient::new(target.clone(), key).fetch_tables().await?
        }
    };

    build_from_tables(layout, raw, options.top_scorers)
}

/// Placeholder substitution plus build, shared by every source.
pub fn build_from_tables(
    layout: TournamentLayout,
    mut raw: RawTables,
    top_scorers: usize,
) -> Result<Snapshot, LoadError> {
    builder::apply_placeholders(&layout, &mut raw.fixtures)?;
    Ok(builder::build(layout, raw, top_scorers)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_snapshot.json")
    }

    #[test]
    fn sample_snapshot_builds_completely() {
        let layout = load_layout(None).unwrap();
        let raw = read_tables_file(&sample_path()).unwrap();
        let snapshot = build_from_tables(layout, raw, DEFAULT_TOP_SCORERS).unwrap();
        assert_eq!(snapshot.matches.len(), 30);
        assert_eq!(snapshot.teams.len(), 12);
        assert_eq!(snapshot.players.len(), DEFAULT_TOP_SCORERS);
        assert_eq!(snapshot.teams_in_group("B").len(), 3);
    }

    #[test]
    fn undecided_final_shows_placeholder_names() {
        let layout = load_layout(None).unwrap();
        let raw = read_tables_file(&sample_path()).unwrap();
        let snapshot = build_from_tables(layout, raw, DEFAULT_TOP_SCORERS).unwrap();
        let final_match = snapshot.match_in_slot("Final").unwrap();
        assert_eq!(final_match.fixture_label(), "Winner Match 19 vs Winner Match 20");
        assert_eq!(final_match.score, ":");
    }

    #[tokio::test]
    async fn load_snapshot_reads_file_source() {
        let options = LoadOptions {
            source: SnapshotSource::File(sample_path()),
            ..Default::default()
        };
        let snapshot = load_snapshot(&options).await.unwrap();
        assert!(snapshot.match_in_slot("A1").is_some());
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = read_tables_file(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/snapshot.json"));
    }
}
