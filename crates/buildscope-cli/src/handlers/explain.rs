use crate::output::{self, ConditionView};
use crate::types::{ColorChoice, OutputFormat};
use anyhow::Result;
use buildscope_engine::ConditionTree;

pub fn handle(
    condition: &str,
    evaluated: Option<&str>,
    color: ColorChoice,
    format: OutputFormat,
) -> Result<()> {
    let tree = match evaluated {
        Some(evaluated) => buildscope_engine::explain_condition(condition, evaluated)?,
        None => ConditionTree::parse(condition),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ConditionView::new(&tree))?);
        }
        OutputFormat::Plain => {
            print!("{}", output::render_condition(&tree, output::use_color(color)));
        }
    }

    Ok(())
}
