use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write the generated module to `path`, or to standard output when no path
/// is given
pub fn write_output(path: Option<&Path>, source: &str) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;

            file.write_all(source.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;

            info!(path = %path.display(), bytes = source.len(), "Wrote generated module");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(source.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write to standard output")?;
        }
    }

    Ok(())
}
