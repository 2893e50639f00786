use super::LaunchVars;
use crate::locate;

/// One JetBrains-style product: a short launcher expected on the search path
/// and a versioned macOS bundle glob.
struct Product {
    preset: &'static str,
    cli: &'static str,
    bundle: &'static str,
}

const PRODUCTS: &[Product] = &[
    Product { preset: "androidstudio", cli: "studio", bundle: "Android Studio*.app/Contents/MacOS/studio" },
    Product { preset: "appcode", cli: "appcode", bundle: "AppCode*.app/Contents/MacOS/AppCode" },
    Product { preset: "clion", cli: "clion", bundle: "CLion*.app/Contents/MacOS/clion" },
    Product { preset: "idea", cli: "idea", bundle: "IntelliJ IDEA*.app/Contents/MacOS/idea" },
    Product { preset: "phpstorm", cli: "pstorm", bundle: "PhpStorm*.app/Contents/MacOS/phpstorm" },
    Product { preset: "pycharm", cli: "charm", bundle: "PyCharm*.app/Contents/MacOS/pycharm" },
    Product { preset: "rubymine", cli: "mine", bundle: "RubyMine*.app/Contents/MacOS/rubymine" },
    Product { preset: "webstorm", cli: "wstorm", bundle: "WebStorm*.app/Contents/MacOS/webstorm" },
];

/// Shared strategy for the JetBrains IDE family: discover a launcher, then
/// pass `pathLine` only, since these CLIs take no column argument. The
/// launcher always spawns detached, so GUI bundles do not block.
pub(super) fn command(vars: &LaunchVars, editor: &str) -> Option<String> {
    let preset = super::preset_name(editor);
    let product = PRODUCTS.iter().find(|p| p.preset == preset)?;

    let exe = locate::locate(&candidates(product))?;
    Some(format!("'{}' '{}'", exe.display(), vars.path_line))
}

#[cfg(target_os = "macos")]
fn candidates(product: &Product) -> Vec<String> {
    vec![
        product.cli.to_string(),
        format!("/Applications/{}", product.bundle),
    ]
}

#[cfg(not(target_os = "macos"))]
fn candidates(product: &Product) -> Vec<String> {
    vec![
        product.cli.to_string(),
        format!("~/.local/share/JetBrains/Toolbox/scripts/{}", product.cli),
    ]
}
