mod ide;
mod sublime;
mod vim;

use tracing::warn;

use crate::config::Config;
use crate::error::OpenError;
use crate::open::Location;

/// A named launch strategy: either a command template with placeholders, or a
/// programmatic strategy that parses the editor's `:sub-argument` and may
/// need to discover an installed executable (returning `None` when there is
/// none).
pub enum Preset {
    Template(&'static str),
    Programmatic(fn(&LaunchVars, &str) -> Option<String>),
}

/// Presets available on every platform.
const COMMON_PRESETS: &[(&str, Preset)] = &[
    ("androidstudio", Preset::Programmatic(ide::command)),
    ("appcode", Preset::Programmatic(ide::command)),
    ("clion", Preset::Programmatic(ide::command)),
    ("gvim", Preset::Programmatic(vim::command)),
    ("idea", Preset::Programmatic(ide::command)),
    ("nvim", Preset::Programmatic(vim::command)),
    ("phpstorm", Preset::Programmatic(ide::command)),
    ("pycharm", Preset::Programmatic(ide::command)),
    ("rubymine", Preset::Programmatic(ide::command)),
    ("sublime", Preset::Programmatic(sublime::command)),
    ("vim", Preset::Programmatic(vim::command)),
    ("webstorm", Preset::Programmatic(ide::command)),
];

#[cfg(target_os = "macos")]
const PLATFORM_PRESETS: &[(&str, Preset)] = &[
    ("atom", Preset::Template("open -a atom -n --args '{pathLineColumn}'")),
    ("system", Preset::Template("open '{path}'")),
    (
        "vscode",
        Preset::Template(
            "'/Applications/Visual Studio Code.app/Contents/Resources/app/bin/code' \
             --goto --reuse-window '{pathLineColumn}'",
        ),
    ),
    ("xcode", Preset::Template("open -a Xcode --args '{path}'")),
];

#[cfg(not(target_os = "macos"))]
const PLATFORM_PRESETS: &[(&str, Preset)] = &[
    ("atom", Preset::Template("atom '{pathLineColumn}'")),
    ("system", Preset::Template("xdg-open '{path}'")),
    ("vscode", Preset::Template("code --goto --reuse-window '{pathLineColumn}'")),
];

pub fn lookup(name: &str) -> Option<&'static Preset> {
    PLATFORM_PRESETS
        .iter()
        .chain(COMMON_PRESETS)
        .find(|(preset, _)| *preset == name)
        .map(|(_, strategy)| strategy)
}

/// Names of all registered presets, sorted.
pub fn available() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = PLATFORM_PRESETS
        .iter()
        .chain(COMMON_PRESETS)
        .map(|(name, _)| *name)
        .collect();
    names.sort_unstable();
    names
}

/// The variable set exposed to templates and programmatic strategies. Quote
/// characters are stripped so a value cannot break out of a single-quoted
/// shell argument.
#[derive(Debug, Clone)]
pub struct LaunchVars {
    pub root: String,
    pub rel_path: String,
    pub path: String,
    pub path_line: String,
    pub path_line_column: String,
    pub line: u32,
    pub column: u32,
    pub editor: String,
}

fn strip_quotes(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '\'' | '"')).collect()
}

impl LaunchVars {
    pub fn new(location: &Location, editor: &str) -> Self {
        let root = strip_quotes(&location.root.to_string_lossy());
        let rel_path = strip_quotes(&location.rel_path);
        let path = format!("{}/{}", root.trim_end_matches('/'), rel_path)
            .trim_end_matches('/')
            .to_string();

        // `line` renders only when set; `column` never renders without `line`.
        let mut path_line = path.clone();
        let mut path_line_column = path.clone();
        if location.line > 0 {
            path_line = format!("{path}:{}", location.line);
            path_line_column = if location.column > 0 {
                format!("{path_line}:{}", location.column)
            } else {
                path_line.clone()
            };
        }

        Self {
            root,
            rel_path,
            path,
            path_line,
            path_line_column,
            line: location.line,
            column: location.column,
            editor: strip_quotes(editor),
        }
    }

    fn get(&self, name: &str) -> Option<String> {
        match name {
            "root" => Some(self.root.clone()),
            "relPath" => Some(self.rel_path.clone()),
            "path" => Some(self.path.clone()),
            "pathLine" => Some(self.path_line.clone()),
            "pathLineColumn" => Some(self.path_line_column.clone()),
            "line" => Some(self.line.to_string()),
            "column" => Some(self.column.to_string()),
            "editor" => Some(self.editor.clone()),
            _ => None,
        }
    }
}

/// Build the exact external command for a resolved location.
///
/// Resolution order: the editor named in the URL, then the user's custom
/// command template, then the configured default preset. An unrecognized URL
/// editor logs a warning and falls through.
pub fn synthesize(config: &Config, location: &Location) -> Result<String, OpenError> {
    let mut editor = location.editor.clone().unwrap_or_default();
    let mut custom: Option<String> = None;
    let mut preset = match lookup(preset_name(&editor)) {
        some @ Some(_) => some,
        None => {
            if !editor.is_empty() {
                warn!("unknown editor \"{}\"", preset_name(&editor));
            }
            None
        }
    };

    if preset.is_none() {
        custom = config.command.clone().filter(|c| !c.is_empty());
    }

    if preset.is_none() && custom.is_none() {
        let configured = config.editor.clone().unwrap_or_default();
        preset = lookup(preset_name(&configured));
        if preset.is_some() {
            editor = configured;
        }
    }

    let vars = LaunchVars::new(location, &editor);
    if let Some(template) = custom {
        return Ok(render_template(&template, &vars));
    }
    match preset.ok_or(OpenError::EditorNotConfigured)? {
        Preset::Template(template) => Ok(render_template(template, &vars)),
        Preset::Programmatic(strategy) => strategy(&vars, &vars.editor)
            .ok_or_else(|| OpenError::LauncherMissing(preset_name(&vars.editor).to_string())),
    }
}

/// The preset name is the editor string up to any `:sub-argument`.
pub fn preset_name(editor: &str) -> &str {
    editor.split(':').next().unwrap_or(editor)
}

/// Substitute `{name}` placeholders from the closed variable set; unknown
/// placeholders are left verbatim.
fn render_template(template: &str, vars: &LaunchVars) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match tail.find('}') {
            Some(close) => {
                let name = &tail[1..close];
                match vars.get(name) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&tail[..=close]),
                }
                rest = &tail[close + 1..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
