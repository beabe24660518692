//! Templates command - list template ids

use console::style;
use dibmirror_engine::TemplateSource;

use super::Settings;
use crate::error::Result;

pub fn run(settings: &Settings) -> Result<()> {
    let engine = settings.engine()?;

    match engine.source() {
        TemplateSource::Builtin => println!("{}", style("# built-in templates").dim()),
        TemplateSource::Directory(dir) => {
            println!("{}", style(format!("# templates in {}", dir.display())).dim())
        }
    }

    for id in engine.template_ids() {
        println!("{}", id);
    }
    Ok(())
}
