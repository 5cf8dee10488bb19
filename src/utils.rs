use std::path::Path;

use eyre::Context;

pub async fn create_parent_dir(path: impl AsRef<Path>) -> eyre::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Creating {}", parent.display()))?;
    }

    Ok(())
}
