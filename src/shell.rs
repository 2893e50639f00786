use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// PATH with the directories where editors commonly live prepended. Launch
/// handlers inherit a minimal environment from the desktop session, so the
/// usual locations have to be added back.
pub fn augmented_path() -> String {
    let current = std::env::var("PATH").unwrap_or_default();
    let extras = [
        "/usr/local/bin",
        "/opt/homebrew/bin",
        "/opt/homebrew/sbin",
    ];
    let mut parts: Vec<&str> = extras.iter().copied().collect();
    for p in current.split(':').filter(|s| !s.is_empty()) {
        if !parts.contains(&p) {
            parts.push(p);
        }
    }
    parts.join(":")
}

/// Run one synthesized command line through the shell, detached. Quoting is
/// the synthesizer's responsibility; the launched process is never awaited.
pub fn launch(command: &str) -> Result<()> {
    shell_command(command)
        .env("PATH", augmented_path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to launch: {command}"))?;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(target_os = "windows")]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_augmented_path_contains_extras_and_original() {
        let path = augmented_path();
        assert!(path.contains("/usr/local/bin"));
        if let Ok(current) = std::env::var("PATH") {
            for dir in current.split(':').filter(|s| !s.is_empty()) {
                assert!(path.contains(dir));
            }
        }
    }

    #[test]
    fn test_augmented_path_deduplicates() {
        let path = augmented_path();
        let count = path
            .split(':')
            .filter(|p| *p == "/usr/local/bin")
            .count();
        assert_eq!(count, 1);
    }
}
