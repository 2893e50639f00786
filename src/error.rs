use thiserror::Error;

/// Outcomes of handling a single URL that are expected in normal operation.
/// None of these should terminate a streaming session.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("could not parse url `{0}`")]
    MalformedUrl(String),

    #[error("no repository contains `{0}`")]
    RepoNotFound(String),

    #[error("no editor command could be determined")]
    EditorNotConfigured,

    #[error("no launcher found for editor `{0}`")]
    LauncherMissing(String),
}
