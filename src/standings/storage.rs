use super::types::Tournament;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Load a tournament export from a JSON file.
pub fn load_tournament(path: &Path) -> Result<Tournament> {
    if !path.exists() {
        anyhow::bail!("Tournament file not found at {}", path.display());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open tournament file at {}", path.display()))?;

    let tournament: Tournament = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse tournament JSON in {}", path.display()))?;

    tracing::debug!(
        name = %tournament.name,
        entries = tournament.entries.len(),
        stages = tournament.number_of_stages,
        "loaded tournament"
    );

    Ok(tournament)
}

/// Write rendered output to a file atomically.
///
/// Uses atomic-write-file so a reader never sees a half-written result.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    if !contents.ends_with('\n') {
        file.write_all(b"\n")
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(())
}
