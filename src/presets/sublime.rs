use super::LaunchVars;
use crate::locate;

/// Sublime Text: a handful of known install locations, full line+column
/// addressing.
pub(super) fn command(vars: &LaunchVars, _editor: &str) -> Option<String> {
    let exe = locate::locate(&candidates())?;
    Some(format!("'{}' '{}'", exe.display(), vars.path_line_column))
}

fn candidates() -> Vec<String> {
    let mut candidates = vec!["subl".to_string(), "~/bin/subl".to_string()];
    #[cfg(target_os = "macos")]
    candidates.push("/Applications/Sublime Text*.app/Contents/SharedSupport/bin/subl".to_string());
    #[cfg(not(target_os = "macos"))]
    candidates.push("/opt/sublime_text/sublime_text".to_string());
    candidates
}
