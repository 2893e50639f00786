use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::OpenError;
use crate::link;
use crate::presets;
use crate::repo::{self, RepoIndex};
use crate::shell;

/// A location that has been pinned to a real repository root. The relative
/// path is known to exist under `root` at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub root: PathBuf,
    pub rel_path: String,
    pub line: u32,
    pub column: u32,
    pub editor: Option<String>,
}

/// Decode a URL and pin it to a local repository. When resolution fails and
/// the index did not come from a scan in this process, the index is rebuilt
/// once and resolution retried before giving up.
pub fn resolve_url(index: &mut RepoIndex, raw: &str) -> Result<Location, OpenError> {
    let parsed = link::decode(raw)?;

    let mut root = repo::resolve(
        index,
        &parsed.rel_path,
        parsed.repo_hint.as_deref(),
        parsed.root.as_deref(),
    );
    if root.is_none() && !index.is_fresh() {
        index.refresh();
        root = repo::resolve(
            index,
            &parsed.rel_path,
            parsed.repo_hint.as_deref(),
            parsed.root.as_deref(),
        );
    }
    let root = root.ok_or_else(|| OpenError::RepoNotFound(parsed.rel_path.clone()))?;

    Ok(Location {
        root,
        rel_path: parsed.rel_path,
        line: parsed.line,
        column: parsed.column,
        editor: parsed.editor,
    })
}

/// The full pipeline short of launching: decode, resolve, synthesize.
pub fn command_for_url(
    config: &Config,
    index: &mut RepoIndex,
    raw: &str,
) -> Result<String, OpenError> {
    let location = resolve_url(index, raw)?;
    presets::synthesize(config, &location)
}

/// Resolve the URL and launch the configured editor at it, fire-and-forget.
pub fn open_url(config: &Config, index: &mut RepoIndex, raw: &str) -> Result<()> {
    info!("opening {raw}");
    let command = command_for_url(config, index, raw)?;
    debug!("launching: {command}");
    shell::launch(&command)
}
