//! Version and host environment descriptions used in logs and reports.

/// Product name reported in logs and bug reports.
pub const PRODUCT_NAME: &str = "Markdown Monster";

/// Application version from the package manifest.
pub fn app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Version with trailing `.0` segments removed, for display in the UI.
///
/// Inner zero segments stay: `1.0.10` is not shortened.
pub fn version_for_display(version: &str) -> String {
    let mut display = version;
    while let Some(stripped) = display.strip_suffix(".0") {
        display = stripped;
    }
    display.to_string()
}

/// User interface language tag, taken from the usual locale variables.
pub fn ui_language() -> String {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .map(|value| {
            // en_US.UTF-8 -> en-US
            let tag = value.split('.').next().unwrap_or_default();
            tag.replace('_', "-")
        })
        .unwrap_or_else(|| "en-US".to_string())
}

/// Short OS description: `linux x86_64 - en-US`.
pub fn os_version() -> String {
    format!(
        "{} {} - {}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        ui_language()
    )
}

/// OS description extended with process bitness, used in error log entries.
pub fn runtime_description() -> String {
    let bitness = if cfg!(target_pointer_width = "64") {
        "64 bit"
    } else {
        "32 bit"
    };
    format!("{} - {}", os_version(), bitness)
}
