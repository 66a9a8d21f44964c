//! Site settings (flat key → string mapping)

use std::collections::BTreeMap;

/// Site settings map. Sorted so serialized documents are stable.
pub type SiteSettings = BTreeMap<String, String>;

pub const SITE_NAME: &str = "siteName";
pub const LOGO_TYPE: &str = "logoType";
pub const LOGO_TEXT: &str = "logoText";
pub const LOGO_IMAGE: &str = "logoImage";
pub const FAVICON: &str = "favicon";

const REGISTRAR_ICON_PREFIX: &str = "registrarIcon:";

/// Default key/value pairs written on first bootstrap.
#[must_use]
pub fn default_site_settings() -> SiteSettings {
    [
        (SITE_NAME, "Domain Market"),
        (LOGO_TYPE, "text"),
        (LOGO_TEXT, "Domain Market"),
        (LOGO_IMAGE, ""),
        (FAVICON, "/favicon.ico"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Settings key holding the SVG markup of a registrar icon.
#[must_use]
pub fn registrar_icon_key(registrar: &str) -> String {
    format!("{REGISTRAR_ICON_PREFIX}{}", registrar.trim().to_lowercase())
}

/// All registrar icons stored in `settings`, keyed by registrar name.
#[must_use]
pub fn registrar_icons(settings: &SiteSettings) -> BTreeMap<&str, &str> {
    settings
        .iter()
        .filter_map(|(k, v)| {
            k.strip_prefix(REGISTRAR_ICON_PREFIX)
                .map(|name| (name, v.as_str()))
        })
        .collect()
}
