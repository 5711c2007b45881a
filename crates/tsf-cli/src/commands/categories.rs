//! Categories command.

use std::io::Write;

use anyhow::Result;
use tsf_core::{Classifier, Rules};

pub fn run<W: Write>(writer: &mut W, rules: &Rules) -> Result<()> {
    let categories = rules.possible_categories();
    if categories.is_empty() {
        writeln!(writer, "No categories configured.")?;
        return Ok(());
    }
    for category in categories {
        if rules.is_overtime(&category) {
            writeln!(writer, "{category} (overtime)")?;
        } else {
            writeln!(writer, "{category}")?;
        }
    }
    Ok(())
}
