use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum SchemeStatus {
    Installed { path: String },
    NotInstalled,
}

impl std::fmt::Display for SchemeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Installed { path } => write!(f, "Installed at {path}"),
            Self::NotInstalled => write!(f, "Not installed"),
        }
    }
}

pub fn install() -> Result<()> {
    platform_install()
}

pub fn uninstall() -> Result<()> {
    platform_uninstall()
}

pub fn status() -> Result<SchemeStatus> {
    platform_status()
}

// ──────────────────────────── macOS ────────────────────────────

#[cfg(target_os = "macos")]
fn app_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("~"))
        .join("Applications")
        .join("CodeLink.app")
}

#[cfg(target_os = "macos")]
fn platform_install() -> Result<()> {
    use std::process::Command;

    let exe = std::env::current_exe().context("Failed to get current executable path")?;
    let app = app_dir();

    // Remove any previous install so osacompile starts clean
    if app.exists() {
        std::fs::remove_dir_all(&app)
            .with_context(|| format!("Failed to remove existing app at {}", app.display()))?;
    }

    // macOS delivers URL scheme events as Apple Events (kAEGetURL / open location),
    // NOT as argv[1] to the executable.  A plain shell script never sees the URL.
    // Compiling an AppleScript applet that handles `on open location` is the
    // correct, documented way to receive the URL from the OS.
    let script_src = std::env::temp_dir().join("codelink-handler.applescript");
    std::fs::write(&script_src, handler_script(&exe.display().to_string()))
        .context("Failed to write AppleScript source")?;

    // Compile the script into a .app bundle
    let status = Command::new("osacompile")
        .args(["-o"])
        .arg(&app)
        .arg(&script_src)
        .status()
        .context("Failed to run osacompile")?;
    let _ = std::fs::remove_file(&script_src);
    if !status.success() {
        anyhow::bail!("osacompile failed");
    }

    // Patch the generated Info.plist: bundle identity + LSUIElement + URL scheme
    let plist = app.join("Contents").join("Info.plist");
    let pb = "/usr/libexec/PlistBuddy";

    // CFBundleIdentifier is absent from the osacompile-generated plist — Add it
    plist_buddy(pb, "Add :CFBundleIdentifier string io.codelink.handler", &plist)?;
    // CFBundleName is present but defaults to the script filename — override it
    plist_buddy(pb, "Set :CFBundleName CodeLink", &plist)?;

    // LSUIElement keeps the applet out of the Dock; add if absent then set it
    let _ = Command::new(pb)
        .args(["-c", "Add :LSUIElement bool true"])
        .arg(&plist)
        .status();
    plist_buddy(pb, "Set :LSUIElement true", &plist)?;

    // URL scheme registration
    let _ = Command::new(pb)
        .args(["-c", "Add :CFBundleURLTypes array"])
        .arg(&plist)
        .status();
    plist_buddy(pb, "Add :CFBundleURLTypes:0 dict", &plist)?;
    plist_buddy(
        pb,
        "Add :CFBundleURLTypes:0:CFBundleURLName string CodeLink URL",
        &plist,
    )?;
    plist_buddy(pb, "Add :CFBundleURLTypes:0:CFBundleURLSchemes array", &plist)?;
    plist_buddy(
        pb,
        "Add :CFBundleURLTypes:0:CFBundleURLSchemes:0 string codelink",
        &plist,
    )?;

    // Register with Launch Services
    let lsregister = "/System/Library/Frameworks/CoreServices.framework/Versions/A/Frameworks/\
        LaunchServices.framework/Versions/A/Support/lsregister";
    let status = Command::new(lsregister)
        .arg("-f")
        .arg(&app)
        .status()
        .context("Failed to run lsregister")?;

    if !status.success() {
        anyhow::bail!("lsregister failed");
    }

    println!("Installed CodeLink.app at {}", app.display());
    println!("The codelink:// URL scheme is now registered.");
    Ok(())
}

/// AppleScript source for the handler applet. The applet receives the URL via
/// the `open location` event and forwards it to `codelink open`.
#[cfg(any(test, target_os = "macos"))]
fn handler_script(exe: &str) -> String {
    format!(
        "on open location this_URL\n\
         \tdo shell script {exe_q} & \" open \" & quoted form of this_URL\n\
         end open location\n",
        exe_q = applescript_quoted(exe),
    )
}

#[cfg(any(test, target_os = "macos"))]
fn applescript_quoted(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[cfg(target_os = "macos")]
fn plist_buddy(pb: &str, cmd: &str, plist: &std::path::Path) -> Result<()> {
    let status = std::process::Command::new(pb)
        .args(["-c", cmd])
        .arg(plist)
        .status()
        .with_context(|| format!("Failed to run PlistBuddy: {cmd}"))?;
    if !status.success() {
        anyhow::bail!("PlistBuddy failed: {cmd}");
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn platform_uninstall() -> Result<()> {
    use std::process::Command;

    let app = app_dir();
    if app.exists() {
        // Unregister before removing
        let lsregister = "/System/Library/Frameworks/CoreServices.framework/Versions/A/Frameworks/\
            LaunchServices.framework/Versions/A/Support/lsregister";
        let _ = Command::new(lsregister)
            .args(["-u"])
            .arg(&app)
            .status();

        std::fs::remove_dir_all(&app)
            .with_context(|| format!("Failed to remove {}", app.display()))?;
        println!("Removed {}", app.display());
    } else {
        println!("Not installed — nothing to remove.");
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn platform_status() -> Result<SchemeStatus> {
    let app = app_dir();
    if app.join("Contents").join("Info.plist").exists() {
        Ok(SchemeStatus::Installed {
            path: app.display().to_string(),
        })
    } else {
        Ok(SchemeStatus::NotInstalled)
    }
}

// ──────────────────────────── Linux ────────────────────────────

#[cfg(target_os = "linux")]
fn desktop_file() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("~/.local/share"))
        .join("applications")
        .join("codelink.desktop")
}

#[cfg(target_os = "linux")]
fn platform_install() -> Result<()> {
    use std::process::Command;

    let exe = std::env::current_exe().context("Failed to get current executable path")?;
    let path = desktop_file();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = format!(
        "[Desktop Entry]\n\
         Name=CodeLink\n\
         Exec={exe} open %u\n\
         Type=Application\n\
         NoDisplay=true\n\
         MimeType=x-scheme-handler/codelink;\n",
        exe = exe.display()
    );
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write desktop file to {}", path.display()))?;

    Command::new("xdg-mime")
        .args(["default", "codelink.desktop", "x-scheme-handler/codelink"])
        .status()
        .context("Failed to run xdg-mime")?;

    println!("Installed desktop entry at {}", path.display());
    Ok(())
}

#[cfg(target_os = "linux")]
fn platform_uninstall() -> Result<()> {
    let path = desktop_file();
    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        println!("Removed {}", path.display());
    } else {
        println!("Not installed — nothing to remove.");
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn platform_status() -> Result<SchemeStatus> {
    let path = desktop_file();
    if path.exists() {
        Ok(SchemeStatus::Installed {
            path: path.display().to_string(),
        })
    } else {
        Ok(SchemeStatus::NotInstalled)
    }
}

// ──────────────────────────── Fallback ────────────────────────────

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn platform_install() -> Result<()> {
    anyhow::bail!("URL scheme registration is not supported on this platform")
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn platform_uninstall() -> Result<()> {
    anyhow::bail!("URL scheme registration is not supported on this platform")
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn platform_status() -> Result<SchemeStatus> {
    Ok(SchemeStatus::NotInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_receives_url_via_open_location_event() {
        // The URL arrives as an Apple Event, never as argv, so the applet
        // must declare an `open location` handler and forward its argument.
        let script = handler_script("/usr/local/bin/codelink");
        assert!(script.starts_with("on open location this_URL\n"));
        assert!(script.contains("\"/usr/local/bin/codelink\" & \" open \""));
        assert!(script.contains("quoted form of this_URL"));
        assert!(script.ends_with("end open location\n"));
    }

    #[test]
    fn test_handler_script_escapes_exe_path() {
        let script = handler_script(r#"/Users/u/my "odd" dir/codelink"#);
        assert!(script.contains(r#""/Users/u/my \"odd\" dir/codelink""#));
    }

    #[test]
    fn test_status_display() {
        let installed = SchemeStatus::Installed {
            path: "/tmp/CodeLink.app".to_string(),
        };
        assert_eq!(installed.to_string(), "Installed at /tmp/CodeLink.app");
        assert_eq!(SchemeStatus::NotInstalled.to_string(), "Not installed");
    }
}
