//! Display formatting for CLI output

use console::{StyledObject, style};
use dibmirror_core::{Change, GenerationReport, Plan, RunMode, Step};

fn verb(mode: RunMode, change: Change) -> StyledObject<&'static str> {
    match (mode, change) {
        (RunMode::Apply, Change::Created) => style("created").green(),
        (RunMode::Apply, Change::Updated) => style("updated").yellow(),
        (RunMode::Check, Change::Created) => style("would create").green(),
        (RunMode::Check, Change::Updated) => style("would update").yellow(),
        (_, Change::Unchanged) => style("ok").dim(),
    }
}

/// Print each step of a run, then a summary line
pub fn print_report(report: &GenerationReport) {
    for step in &report.steps {
        match step {
            Step::Directory { path, change } => {
                println!("{} {}/", verb(report.mode, *change), path.display());
            }
            Step::File {
                path,
                template_id,
                change,
            } => {
                println!(
                    "{} {} {}",
                    verb(report.mode, *change),
                    path.display(),
                    style(format!("({})", template_id)).dim()
                );
            }
        }
    }

    println!();
    println!("{}", summary(report));
}

fn summary(report: &GenerationReport) -> String {
    let files = report.files().count();
    let directories = report.steps.len() - files;
    let prefix = match report.mode {
        RunMode::Apply => "Done",
        RunMode::Check => "Check",
    };

    format!(
        "{}: {} files, {} directories ({} created, {} updated, {} unchanged)",
        prefix,
        files,
        directories,
        report.count(Change::Created),
        report.count(Change::Updated),
        report.count(Change::Unchanged)
    )
}

/// Print planned directories and files grouped by target
pub fn print_plan(plan: &Plan) {
    println!("{} {}", style("root").cyan().bold(), plan.root.display());

    for stage in &plan.stages {
        println!();
        if let Some(distro) = stage.distro {
            println!("{}", style(distro).cyan().bold());
        }
        for dir in &stage.directories {
            println!("  {} {}/", style("dir ").dim(), dir.display());
        }
        for file in &stage.files {
            println!(
                "  {} {} {}",
                style("file").dim(),
                file.destination.display(),
                style(format!("<- {} ({:o})", file.template_id, file.mode)).dim()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_summary_counts() {
        let report = GenerationReport {
            mode: RunMode::Apply,
            steps: vec![
                Step::Directory {
                    path: PathBuf::from("/r"),
                    change: Change::Created,
                },
                Step::File {
                    path: PathBuf::from("/r/a"),
                    template_id: "a.j2".to_string(),
                    change: Change::Unchanged,
                },
            ],
        };

        assert_eq!(
            summary(&report),
            "Done: 1 files, 1 directories (1 created, 0 updated, 1 unchanged)"
        );
    }
}
