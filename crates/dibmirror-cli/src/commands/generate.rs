//! Generate command - create the mirror tree and render repo files

use dibmirror_core::{Generator, RunMode};

use super::Settings;
use crate::display;
use crate::error::{CliError, Result};

pub fn run(settings: &Settings, check: bool) -> Result<()> {
    let context = settings.context()?;
    let engine = settings.engine()?;
    let mode = if check { RunMode::Check } else { RunMode::Apply };

    tracing::debug!(
        root = %context.repo_root.display(),
        mirror_host = %context.mirror_host,
        site_mirror_host = %context.site_mirror_host,
        "resolved context"
    );

    let report = Generator::new(&engine)
        .targets(settings.targets())
        .mode(mode)
        .run(&context)?;

    display::print_report(&report);

    if check && report.changed() {
        let count = report.steps.iter().filter(|s| s.change().is_change()).count();
        return Err(CliError::ChangesPending { count });
    }

    Ok(())
}
