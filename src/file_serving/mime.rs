//! Content-Type selection for served files.

use mime_guess::from_path;
use std::path::Path;

/// Checked in order, case-sensitively, before falling back to `mime_guess`.
pub const MIME_OVERRIDES: &[(&str, &str)] = &[
    (".wasm", "application/wasm"),
    (".pck", "application/octet-stream"),
];

pub fn content_type_for(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    if let Some((suffix, content_type)) = MIME_OVERRIDES
        .iter()
        .find(|(suffix, _)| file_name.ends_with(suffix))
    {
        log::trace!("{} matched override {}", path.display(), suffix);
        return content_type.to_string();
    }

    from_path(path).first_or_octet_stream().to_string()
}
