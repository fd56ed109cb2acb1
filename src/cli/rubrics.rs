//! Rubrics command handler.

use anyhow::{Context, Result};

use crate::pipeline::exit_codes;
use crate::rubric::{resolve_rubric, RubricPreset};

/// List the built-in presets, or print one rubric (preset or file) as YAML.
pub fn run_rubrics(name: Option<&str>) -> Result<i32> {
    let Some(name) = name else {
        println!("{}", preset_listing()?);
        return Ok(exit_codes::SUCCESS);
    };

    let rubric = resolve_rubric(name)?;
    let yaml = serde_yaml_ng::to_string(&rubric).context("failed to serialize rubric")?;
    print!("{yaml}");
    Ok(exit_codes::SUCCESS)
}

fn preset_listing() -> Result<String> {
    let mut lines = vec!["Available rubric presets:".to_string()];
    for preset in RubricPreset::all() {
        let rubric = preset.build()?;
        lines.push(format!(
            "  {:<26} {:>3} checks, {:>5.1} points  {}",
            preset.name(),
            rubric.len(),
            rubric.total_points(),
            preset.description()
        ));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_covers_every_preset() {
        let listing = preset_listing().unwrap();
        for preset in RubricPreset::all() {
            assert!(listing.contains(preset.name()));
        }
        assert!(listing.contains("37.0 points"));
    }
}
