use super::LaunchVars;

/// vim/gvim/nvim with optional remote-session addressing (`vim:server`).
/// With a server name, target that running session on a tab and position the
/// cursor; without one there is no server to talk to, so open a graphical
/// instance instead.
pub(super) fn command(vars: &LaunchVars, editor: &str) -> Option<String> {
    let (name, server) = match editor.split_once(':') {
        Some((name, server)) => (name, server),
        None => (editor, ""),
    };

    let (vim, server_flag) = if server.is_empty() {
        ("gvim", String::new())
    } else {
        (name, format!("--servername '{server}' "))
    };

    Some(format!(
        "{vim} {server_flag}--remote-tab-silent '+call cursor({line},{column})' '{path}'",
        line = vars.line,
        column = vars.column,
        path = vars.path,
    ))
}
