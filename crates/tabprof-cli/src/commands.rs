use anyhow::{Context, Result};
use tabprof_cli::pipeline::{ProfileOutcome, ProfileRequest, run};
use tabprof_ingest::{DbSource, DsvOptions, DsvSource};
use tabprof_lake::LakeOptions;
use tabprof_profile::ProfilerConfig;

use crate::cli::{DsvArgs, ProfileArgs, TableArgs};

pub fn run_dsv(args: &DsvArgs) -> Result<ProfileOutcome> {
    let options = DsvOptions::new()
        .with_delimiter(args.delimiter.as_str())
        .with_bookend((!args.no_bookend).then_some(args.bookend))
        .with_strip(!args.no_strip)
        .with_bookend_strip(!args.no_bookend_strip)
        .with_encoding(args.encoding.as_str())
        .with_skip_header_rows(args.skip_header_rows)
        .with_skip_footer_rows(args.skip_footer_rows)
        .with_header_rows(args.header_rows)
        .with_skip_empty_rows(!args.keep_empty_rows)
        .with_truncate_long_rows(args.truncate_long_rows);
    let source = DsvSource::open(&args.file, options)
        .with_context(|| format!("open {}", args.file.display()))?;
    run(&source, &request(&args.profile))
}

pub fn run_table(args: &TableArgs) -> Result<ProfileOutcome> {
    let source = DbSource::new(&args.db, args.schema.as_deref(), &args.table)
        .with_context(|| format!("open table {} in {}", args.table, args.db))?;
    run(&source, &request(&args.profile))
}

fn request(args: &ProfileArgs) -> ProfileRequest {
    let mut lake = LakeOptions::new().with_batch_size(args.batch_size);
    if let Some(name) = &args.table_name {
        lake = lake.with_table_name(name.as_str());
    }
    let mut profiler = ProfilerConfig::new();
    if let Some(seed) = args.seed {
        profiler = profiler.with_seed(seed);
    }
    ProfileRequest {
        lake_dir: args.lake_dir.clone(),
        lake,
        profiler,
        sample_size: args.sample_size,
        create_inferred_table: !args.no_inferred_table,
    }
}
