use std::sync::OnceLock;

use rust_embed::RustEmbed;

/// Embed the entire `assets/` directory into the binary.
#[derive(RustEmbed)]
#[folder = "assets"]
struct EmbeddedAssets;

static CATALOG_JSON: OnceLock<Option<String>> = OnceLock::new();

/// Contents of `assets/catalog.json`.
pub fn catalog_json() -> Option<&'static str> {
    CATALOG_JSON
        .get_or_init(|| load_text("/assets/catalog.json"))
        .as_deref()
}

fn load_text(path: &str) -> Option<String> {
    let asset = EmbeddedAssets::get(&canonical_asset_path(path))?;
    match String::from_utf8(asset.data.into_owned()) {
        Ok(text) => Some(text),
        Err(_) => {
            tracing::error!("embedded asset {path} is not valid UTF-8");
            None
        }
    }
}

fn canonical_asset_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    if let Some(rest) = trimmed.strip_prefix("assets/") {
        rest.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_paths_are_relative_to_the_folder() {
        assert_eq!(canonical_asset_path("/assets/catalog.json"), "catalog.json");
        assert_eq!(canonical_asset_path("catalog.json"), "catalog.json");
    }

    #[test]
    fn catalog_is_embedded() {
        let json = catalog_json().unwrap();
        assert!(json.contains("\"businesses\""));
    }
}
