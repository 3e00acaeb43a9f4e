//! Implementation of `rosdock clean`.

use anyhow::Result;

use crate::ops::Project;
use crate::util::fs::remove_dir_all_if_exists;

/// Remove the workspace directory. Returns whether there was one.
pub fn clean(project: &Project) -> Result<bool> {
    let ws = project.workspace();
    let existed = ws.root().exists();
    remove_dir_all_if_exists(ws.root())?;
    Ok(existed)
}
