//! Small filesystem helpers.

use anyhow::{Context, Result};
use std::path::Path;

/// Create a directory (and parents) if it does not exist yet
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = std::env::temp_dir().join(format!("lettr-test-{}", uuid::Uuid::new_v4()));
        assert!(!dir.exists());

        ensure_dir(&dir).unwrap();
        assert!(dir.exists());

        // Second call is a no-op
        ensure_dir(&dir).unwrap();

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
