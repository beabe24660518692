//! Plan command - show what a run would produce

use dibmirror_core::Plan;

use super::Settings;
use crate::display;
use crate::error::{CliError, Result};

pub fn run(settings: &Settings, json_output: bool) -> Result<()> {
    let root = settings.repo_root()?;
    let plan = Plan::build(&root, &settings.targets())?;

    if json_output {
        println!("{}", plan_json(&plan)?);
    } else {
        display::print_plan(&plan);
    }
    Ok(())
}

fn plan_json(plan: &Plan) -> Result<String> {
    let output = serde_json::json!({
        "root": plan.root.display().to_string(),
        "directories": plan.directories().map(|d| d.display().to_string()).collect::<Vec<_>>(),
        "files": plan.files().map(|f| {
            serde_json::json!({
                "path": f.destination.display().to_string(),
                "template": f.template_id,
                "mode": format!("{:o}", f.mode),
            })
        }).collect::<Vec<_>>(),
    });

    serde_json::to_string_pretty(&output).map_err(|e| CliError::Io {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dibmirror_core::default_targets;
    use std::path::Path;

    #[test]
    fn test_plan_json_shape() {
        let plan = Plan::build(Path::new("/home/zuul/dib-mirror"), &default_targets()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&plan_json(&plan).unwrap()).unwrap();

        assert_eq!(value["root"], "/home/zuul/dib-mirror");
        assert_eq!(value["files"].as_array().unwrap().len(), 7);
        assert_eq!(value["files"][0]["template"], "centos-minimal/base.repo.j2");
        assert_eq!(value["files"][0]["mode"], "644");
        assert_eq!(value["directories"][0], "/home/zuul/dib-mirror");
    }
}
