use crate::output::{self, NodeView};
use crate::types::{ColorChoice, OutputFormat};
use anyhow::{Context, Result};
use buildscope_engine::ReconstructOptions;
use std::io::Read;
use std::path::Path;

pub fn handle(
    file: &Path,
    options: ReconstructOptions,
    color: ColorChoice,
    format: OutputFormat,
) -> Result<()> {
    let input = read_input(file)?;
    let tree = buildscope_engine::reconstruct_jsonl(&input, options)
        .with_context(|| format!("Failed to reconstruct {}", file.display()))?;

    match format {
        OutputFormat::Json => {
            let view = NodeView::build(&tree, tree.root());
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        OutputFormat::Plain => {
            if output::use_color(color) {
                print!("{}", output::render_tree_colored(&tree));
            } else {
                print!("{}", tree.render_text());
            }
        }
    }

    Ok(())
}

fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read standard input")?;
        return Ok(input);
    }

    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}
