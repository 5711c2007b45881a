//! Tokens command: the semantic highlighting an editor would receive.

use std::io::Write;

use anyhow::Result;
use tsf_core::semantic::{self, TokenReady};
use tsf_core::{Day, LineParser, Rules};

pub fn run<W: Write>(writer: &mut W, rules: &Rules, text: &str, day: Day, encoded: bool) -> Result<()> {
    let lines: Vec<&str> = text.split('\n').collect();
    let tokens = semantic::project(&LineParser::new(rules, day), &lines);

    if encoded {
        writeln!(writer, "{}", serde_json::to_string(&semantic::encode(&tokens))?)?;
        return Ok(());
    }

    for TokenReady {
        line,
        column,
        length,
        kind,
    } in tokens
    {
        let start = column as usize;
        let end = start + length as usize;
        let text = lines
            .get(line as usize)
            .and_then(|l| l.get(start..end))
            .unwrap_or_default();
        writeln!(writer, "{}:{} {:<8} {text}", line + 1, column, kind.as_str())?;
    }
    Ok(())
}
