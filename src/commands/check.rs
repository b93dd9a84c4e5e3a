use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::CheckArgs;
use crate::discovery::find_latest_log;
use crate::loader::load_vehicle_stats;
use crate::model::LoadedArtifact;
use crate::report::{Evaluation, build_gate_report, evaluate, write_json_report, write_text_report};

/// Runs the gate and prints the report. Returns the process exit status for
/// the verdict.
pub fn run(args: CheckArgs) -> Result<i32> {
    let (artifact, evaluation) = execute(&args)?;

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        let report = build_gate_report(&artifact, &evaluation)?;
        write_json_report(&mut output, &report)?;
    } else {
        write_text_report(&mut output, &artifact, &evaluation)?;
    }
    output.flush()?;

    Ok(evaluation.verdict.exit_code())
}

pub fn execute(args: &CheckArgs) -> Result<(LoadedArtifact, Evaluation)> {
    let candidate = match &args.log_file {
        Some(path) => {
            debug!(path = %path.display(), "using explicit log file");
            path.clone()
        }
        None => {
            let path = find_latest_log(&args.search.log_dir, args.search.pattern.as_deref())?;
            debug!(path = %path.display(), "using discovered log file");
            path
        }
    };

    let artifact = load_vehicle_stats(&candidate).with_context(|| {
        format!(
            "failed to load vehicle statistics from {}",
            candidate.display()
        )
    })?;
    let evaluation = evaluate(&artifact.stats, args.threshold);

    let failing = evaluation.failing().count();
    if failing > 0 {
        warn!(
            path = %artifact.path.display(),
            threshold = args.threshold,
            failing,
            vehicles = evaluation.vehicles.len(),
            "position accuracy gate failed"
        );
    } else {
        info!(
            path = %artifact.path.display(),
            threshold = args.threshold,
            vehicles = evaluation.vehicles.len(),
            "position accuracy gate passed"
        );
    }

    Ok((artifact, evaluation))
}
