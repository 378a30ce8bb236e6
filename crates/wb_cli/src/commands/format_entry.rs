use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;
use wb_engine::entry_for;
use wb_mail::parse_message;

/// One line per file: the entry, or a dimmed note saying why there is none.
pub fn run(files: Vec<PathBuf>) -> Result<()> {
    for path in files {
        let raw = std::fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = style(path.display()).cyan();
        match parse_message(&raw) {
            None => println!("{}: {}", name, style("(not a parseable message)").red()),
            Some(message) => match entry_for(&message) {
                Some(entry) => println!("{}: {}", name, entry),
                None => println!("{}: {}", name, style("(not a shared link)").dim()),
            },
        }
    }
    Ok(())
}
