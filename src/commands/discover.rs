use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::cli::DiscoverArgs;
use crate::discovery::find_latest_log;
use crate::model::ArtifactKind;

pub fn run(args: DiscoverArgs) -> Result<()> {
    let (path, kind) = select(&args)?;

    let mut output = io::stdout().lock();
    writeln!(output, "{}\t{}", path.display(), kind)?;
    output.flush()?;

    Ok(())
}

/// Resolves the artifact `check` would evaluate without loading it. A file
/// matched by a custom pattern still has to be a format the loader accepts.
pub fn select(args: &DiscoverArgs) -> Result<(PathBuf, ArtifactKind)> {
    let path = find_latest_log(&args.search.log_dir, args.search.pattern.as_deref())?;
    let kind = ArtifactKind::detect(&path)?;

    info!(path = %path.display(), kind = %kind, "discovery selected log file");
    Ok((path, kind))
}
