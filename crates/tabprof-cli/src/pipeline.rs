//! End-to-end run: stage a source into a lake, profile it, and optionally
//! materialize the typed table.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tabprof_ingest::Source;
use tabprof_lake::{DataLakeBuilder, LakeOptions};
use tabprof_profile::{ProfileReport, Profiler, ProfilerConfig};
use tracing::{info, info_span};

/// Everything a run needs besides the source itself.
#[derive(Debug, Clone)]
pub struct ProfileRequest {
    /// Directory that holds the lake database.
    pub lake_dir: PathBuf,
    pub lake: LakeOptions,
    pub profiler: ProfilerConfig,
    /// Explicit sample size; the sampling policy decides when unset.
    pub sample_size: Option<usize>,
    pub create_inferred_table: bool,
}

impl ProfileRequest {
    pub fn new(lake_dir: impl Into<PathBuf>) -> Self {
        Self {
            lake_dir: lake_dir.into(),
            lake: LakeOptions::default(),
            profiler: ProfilerConfig::default(),
            sample_size: None,
            create_inferred_table: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileOutcome {
    pub lake_db: PathBuf,
    pub raw_table: String,
    /// Set when the typed table was written.
    pub inferred_table: Option<String>,
    pub report: ProfileReport,
}

pub fn run(source: &dyn Source, request: &ProfileRequest) -> Result<ProfileOutcome> {
    let span = info_span!("pipeline", lake_dir = %request.lake_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    let lake = DataLakeBuilder::new(&request.lake_dir)
        .with_options(request.lake.clone())
        .build(source)
        .with_context(|| format!("load into lake at {}", request.lake_dir.display()))?;

    let mut profiler = Profiler::new(&lake).with_config(request.profiler);
    profiler
        .profile(request.sample_size)
        .with_context(|| format!("profile table {}", lake.table_name()))?;

    let inferred_table = if request.create_inferred_table {
        let name = profiler
            .create_inferred_table()
            .with_context(|| format!("materialize typed copy of {}", lake.table_name()))?;
        Some(name)
    } else {
        None
    };

    let report = profiler.report()?;
    info!(
        table = %lake.table_name(),
        rows = report.row_count,
        typed_columns = report.typed_columns().count(),
        duration_ms = start.elapsed().as_millis(),
        "pipeline complete"
    );

    Ok(ProfileOutcome {
        lake_db: lake.db_path().to_path_buf(),
        raw_table: lake.table_name().to_string(),
        inferred_table,
        report,
    })
}
