use crate::output;
use crate::types::{ColorChoice, OutputFormat};
use anyhow::{Result, bail};

pub fn handle(left: &str, right: &str, color: ColorChoice, format: OutputFormat) -> Result<()> {
    let Some(diff) = buildscope_engine::compare_command_lines(left, right) else {
        bail!("Nothing to compare: a command line is empty");
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
        OutputFormat::Plain => print!("{}", output::render_diff(&diff, output::use_color(color))),
    }

    Ok(())
}
