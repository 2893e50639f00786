use std::collections::HashMap;
use std::path::PathBuf;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::OpenError;

/// Hosts whose paths look like `org/repo/blob/branch/rest` rather than
/// `project/rest`.
const CODE_HOSTS: &[&str] = &["github.com", "gitlab.com"];

/// Everything extracted from one incoming URL. Pure data; no filesystem
/// access happens during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocation {
    /// Project-name-like token from the URL host, used to rank candidate
    /// repositories.
    pub repo_hint: Option<String>,
    /// Path relative to the repository root, no leading slash.
    pub rel_path: String,
    /// 1-based line, 0 when unset.
    pub line: u32,
    /// 1-based column, 0 when unset.
    pub column: u32,
    /// Editor override from the `editor` query param, possibly carrying a
    /// `:sub-argument` (e.g. `vim:myserver`).
    pub editor: Option<String>,
    /// Explicit repository root from the `root` query param.
    pub root: Option<PathBuf>,
}

/// Decode a `codelink://project/path?line=N&column=M&editor=name` URL.
///
/// Query parameters are read case-sensitively with long/short aliases
/// (`line`|`l`, `column`|`c`); absent or non-numeric values normalize to 0.
pub fn decode(raw: &str) -> Result<ParsedLocation, OpenError> {
    let fixed = fix_encoded_fragment(raw);
    let url =
        Url::parse(&fixed).map_err(|_| OpenError::MalformedUrl(raw.to_string()))?;

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string);
    let path = percent_decode_str(url.path())
        .decode_utf8_lossy()
        .trim_matches('/')
        .to_string();

    let (repo_hint, rel_path) = split_host_path(host, &path);
    if rel_path.is_empty() {
        return Err(OpenError::MalformedUrl(raw.to_string()));
    }

    // First occurrence of each key wins, as with classic query-string parsing.
    let mut params: HashMap<String, String> = HashMap::new();
    for (key, val) in url.query_pairs() {
        params.entry(key.into_owned()).or_insert_with(|| val.into_owned());
    }

    Ok(ParsedLocation {
        repo_hint,
        rel_path,
        line: numeric_param(&params, "line", "l"),
        column: numeric_param(&params, "column", "c"),
        editor: params.remove("editor").filter(|e| !e.is_empty()),
        root: params.remove("root").filter(|r| !r.is_empty()).map(PathBuf::from),
    })
}

/// Some producers percent-encode the `#` that separates the fragment from the
/// path. Treat everything from the last `%23` onward as a proper fragment so
/// standard parsing discards it.
fn fix_encoded_fragment(url: &str) -> String {
    match url.rfind("%23") {
        Some(i) => format!("{}#{}", &url[..i], &url[i + 3..]),
        None => url.to_string(),
    }
}

/// Turn the host plus path into a repository hint and a root-relative path,
/// reinterpreting code-hosting URLs (`org/repo/blob/branch/rest`).
fn split_host_path(host: Option<String>, path: &str) -> (Option<String>, String) {
    let Some(host) = host else {
        return (None, path.to_string());
    };
    if !CODE_HOSTS.contains(&host.as_str()) {
        return (Some(host), path.to_string());
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 3 {
        return (Some(host), path.to_string());
    }

    let repo = segments[1].to_string();
    let mut rest = &segments[2..];
    // GitLab inserts a `-` segment before `blob`.
    if rest.first() == Some(&"-") {
        rest = &rest[1..];
    }
    if rest.len() >= 2 && rest[0] == "blob" {
        rest = &rest[2..];
    }
    (Some(repo), rest.join("/"))
}

fn numeric_param(params: &HashMap<String, String>, long: &str, short: &str) -> u32 {
    params
        .get(long)
        .or_else(|| params.get(short))
        // Digits only: `parse` would also accept a leading `+`.
        .filter(|v| v.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_basic() {
        let loc = decode("codelink://myproj/src/a.py?line=10&column=3").unwrap();
        assert_eq!(loc.repo_hint.as_deref(), Some("myproj"));
        assert_eq!(loc.rel_path, "src/a.py");
        assert_eq!(loc.line, 10);
        assert_eq!(loc.column, 3);
        assert!(loc.editor.is_none());
        assert!(loc.root.is_none());
    }

    #[test]
    fn test_decode_short_aliases() {
        let loc = decode("codelink://p/f.rs?l=7&c=2").unwrap();
        assert_eq!(loc.line, 7);
        assert_eq!(loc.column, 2);
    }

    #[test]
    fn test_long_alias_takes_precedence() {
        let loc = decode("codelink://p/f.rs?l=7&line=9").unwrap();
        assert_eq!(loc.line, 9);
    }

    #[test]
    fn test_no_query_means_no_position() {
        let loc = decode("codelink://p/some/file.rs").unwrap();
        assert_eq!(loc.line, 0);
        assert_eq!(loc.column, 0);
    }

    #[test]
    fn test_non_numeric_line_normalizes_to_zero() {
        let loc = decode("codelink://p/f.rs?line=abc&column=3").unwrap();
        assert_eq!(loc.line, 0);
        assert_eq!(loc.column, 3);
    }

    #[test]
    fn test_signed_line_normalizes_to_zero() {
        // `u32::parse` accepts a leading `+`, but only plain digit strings
        // count as a position.
        let loc = decode("codelink://p/f.rs?line=%2B5&column=3").unwrap();
        assert_eq!(loc.line, 0);
        assert_eq!(loc.column, 3);

        let loc = decode("codelink://p/f.rs?line=-5").unwrap();
        assert_eq!(loc.line, 0);
    }

    #[test]
    fn test_encoded_fragment_fixup() {
        // A single mis-encoded `#` marks the real fragment boundary; the
        // fragment is dropped from the path.
        let loc = decode("codelink://p/file.py%23L10").unwrap();
        assert_eq!(loc.rel_path, "file.py");
        assert_eq!(loc.line, 0);
    }

    #[test]
    fn test_encoded_fragment_uses_last_occurrence() {
        let loc = decode("codelink://p/a%23b/file.py%23L10").unwrap();
        assert_eq!(loc.rel_path, "a#b/file.py");
    }

    #[test]
    fn test_editor_with_session() {
        let loc = decode("codelink://p/f.rs?editor=vim:mysession").unwrap();
        assert_eq!(loc.editor.as_deref(), Some("vim:mysession"));
    }

    #[test]
    fn test_explicit_root_param() {
        let loc = decode("codelink://p/f.rs?root=/srv/checkout").unwrap();
        assert_eq!(loc.root, Some(PathBuf::from("/srv/checkout")));
    }

    #[test]
    fn test_github_blob_url() {
        let loc = decode("codelink://github.com/org/repo/blob/main/lib/x.go").unwrap();
        assert_eq!(loc.repo_hint.as_deref(), Some("repo"));
        assert_eq!(loc.rel_path, "lib/x.go");
    }

    #[test]
    fn test_github_url_without_blob() {
        let loc = decode("codelink://github.com/org/repo/lib/x.go").unwrap();
        assert_eq!(loc.repo_hint.as_deref(), Some("repo"));
        assert_eq!(loc.rel_path, "lib/x.go");
    }

    #[test]
    fn test_gitlab_dash_blob_url() {
        let loc =
            decode("codelink://gitlab.com/org/repo/-/blob/main/src/a.rs").unwrap();
        assert_eq!(loc.repo_hint.as_deref(), Some("repo"));
        assert_eq!(loc.rel_path, "src/a.rs");
    }

    #[test]
    fn test_percent_encoded_path() {
        let loc = decode("codelink://p/dir%20name/f.rs").unwrap();
        assert_eq!(loc.rel_path, "dir name/f.rs");
    }

    #[test]
    fn test_empty_path_is_malformed() {
        assert!(matches!(
            decode("codelink://onlyhost"),
            Err(OpenError::MalformedUrl(_))
        ));
        assert!(matches!(
            decode("not a url"),
            Err(OpenError::MalformedUrl(_))
        ));
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let loc = decode("codelink://p/src/dir/").unwrap();
        assert_eq!(loc.rel_path, "src/dir");
    }
}
