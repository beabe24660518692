//! Render command - print one rendered template

use super::Settings;
use crate::error::Result;

pub fn run(settings: &Settings, template: &str) -> Result<()> {
    let context = settings.context()?;
    let engine = settings.engine()?;

    let rendered = engine.render_template(template, &context.variables())?;
    print!("{}", rendered);
    Ok(())
}
