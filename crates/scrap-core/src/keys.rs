//! Blob storage keys for uploaded assets.
//!
//! Every asset blob lives at `projects/{project_id}/assets/{random_id}{ext}`.
//! An [`AssetKey`] can only be obtained by generating a fresh key or by parsing
//! a caller-supplied path, so holding one proves the path stays inside the
//! asset namespace (no `..`, no absolute paths, no foreign prefixes).

use std::fmt;

use crate::errors::CoreError;
use crate::ids::random_hex_id;

/// Route prefix of the caller-facing asset reference.
pub const ASSET_ROUTE_PREFIX: &str = "/api/assets/";

const PROJECTS_SEGMENT: &str = "projects";
const ASSETS_SEGMENT: &str = "assets";
const MAX_FILE_SEGMENT_LEN: usize = 128;

/// A validated blob key inside the asset namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    key: String,
    project_id: i64,
}

impl AssetKey {
    /// Derive a fresh, globally unique key for a new upload of `filename`.
    ///
    /// The original extension is preserved verbatim; the rest of the name is
    /// replaced by a 128-bit random identifier so uploads never collide and
    /// keys cannot be enumerated.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the extension contains characters that
    /// are not allowed in a key, or `CoreError::Randomness` if the OS random
    /// source fails.
    pub fn generate(project_id: i64, filename: &str) -> Result<Self, CoreError> {
        let ext = file_extension(filename);
        if !ext.chars().skip(1).all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::Validation(format!(
                "file extension '{ext}' contains unsupported characters"
            )));
        }
        let key = format!("{}{}{ext}", Self::project_prefix(project_id), random_hex_id()?);
        Ok(Self { key, project_id })
    }

    /// Parse a caller-supplied path into a key.
    ///
    /// Accepts either the raw key (`projects/7/assets/ab12.png`), the key with
    /// a single leading slash, or the full reference (`/api/assets/projects/...`).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidAssetPath` if the path is empty, contains
    /// traversal segments or unsafe characters, or does not have the exact
    /// `projects/{id}/assets/{file}` shape.
    pub fn parse(path: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidAssetPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = path.strip_prefix(ASSET_ROUTE_PREFIX).unwrap_or(path);
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(invalid("path is empty"));
        }
        if trimmed
            .chars()
            .any(|c| c == '\\' || c == '%' || c.is_control() || c.is_whitespace())
        {
            return Err(invalid("path contains disallowed characters"));
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        let [projects, project_id, assets, file] = segments.as_slice() else {
            return Err(invalid("expected projects/{id}/assets/{file}"));
        };
        if *projects != PROJECTS_SEGMENT || *assets != ASSETS_SEGMENT {
            return Err(invalid("path is outside the asset namespace"));
        }
        if project_id.is_empty() || !project_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("project id must be numeric"));
        }
        let project_id: i64 = project_id
            .parse()
            .map_err(|_| invalid("project id is out of range"))?;
        if file.is_empty() || file.starts_with('.') || file.len() > MAX_FILE_SEGMENT_LEN {
            return Err(invalid("file name is empty, hidden, or too long"));
        }
        if !file
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        {
            return Err(invalid("file name contains disallowed characters"));
        }

        Ok(Self {
            key: trimmed.to_string(),
            project_id,
        })
    }

    /// Blob prefix shared by every asset of a project.
    #[must_use]
    pub fn project_prefix(project_id: i64) -> String {
        format!("{PROJECTS_SEGMENT}/{project_id}/{ASSETS_SEGMENT}/")
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn project_id(&self) -> i64 {
        self.project_id
    }

    /// Caller-facing reference for this key.
    #[must_use]
    pub fn reference(&self) -> String {
        asset_reference(&self.key)
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.key
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Build the caller-facing reference for a raw storage key.
#[must_use]
pub fn asset_reference(storage_key: &str) -> String {
    format!("{ASSET_ROUTE_PREFIX}{storage_key}")
}

/// Extension of the last path component of `filename`, including the dot.
///
/// Returns an empty string when the name has no extension.
#[must_use]
pub fn file_extension(filename: &str) -> &str {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    name.rfind('.').map_or("", |idx| &name[idx..])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn generated_key_is_namespaced_and_keeps_extension() {
        let key = AssetKey::generate(42, "photo.png").unwrap();
        assert!(key.as_str().starts_with("projects/42/assets/"));
        assert!(key.as_str().ends_with(".png"));
        assert_eq!(key.project_id(), 42);

        let random = key
            .as_str()
            .trim_start_matches("projects/42/assets/")
            .trim_end_matches(".png");
        assert!(crate::ids::is_random_hex_id(random), "random part: {random}");
    }

    #[test]
    fn generated_keys_do_not_collide_for_same_filename() {
        let a = AssetKey::generate(1, "photo.png").unwrap();
        let b = AssetKey::generate(1, "photo.png").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_key_parses_back() {
        let key = AssetKey::generate(9, "Holiday.PNG").unwrap();
        let parsed = AssetKey::parse(&key.reference()).unwrap();
        assert_eq!(parsed, key);
    }

    #[rstest]
    #[case("projects/3/assets/abc.png")]
    #[case("/projects/3/assets/abc.png")]
    #[case("/api/assets/projects/3/assets/abc.png")]
    fn parse_accepts_key_forms(#[case] input: &str) {
        let key = AssetKey::parse(input).unwrap();
        assert_eq!(key.as_str(), "projects/3/assets/abc.png");
        assert_eq!(key.project_id(), 3);
    }

    #[rstest]
    #[case("")]
    #[case("/api/assets/")]
    #[case("projects/3/assets/../../etc/passwd")]
    #[case("projects/3/assets/..")]
    #[case("projects/../assets/abc.png")]
    #[case("projects/3/other/abc.png")]
    #[case("secrets/3/assets/abc.png")]
    #[case("projects/x/assets/abc.png")]
    #[case("projects/3/assets/.hidden")]
    #[case("projects/3/assets/a%2F..%2Fb.png")]
    #[case("projects/3/assets/a\\b.png")]
    #[case("//projects/3/assets/abc.png")]
    #[case("projects/3/assets/abc.png/extra")]
    fn parse_rejects_paths_outside_namespace(#[case] input: &str) {
        let err = AssetKey::parse(input).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAssetPath { .. }), "{input}: {err}");
    }

    #[rstest]
    #[case("photo.png", ".png")]
    #[case("archive.tar.gz", ".gz")]
    #[case("noext", "")]
    #[case("dir.v2/noext", "")]
    #[case("C:\\Users\\me\\pic.PNG", ".PNG")]
    fn extension_of_last_component(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(file_extension(name), expected);
    }

    #[test]
    fn generate_rejects_unsafe_extension() {
        assert!(AssetKey::generate(1, "photo.p-ng").is_err());
        assert!(AssetKey::generate(1, "photo.p ng").is_err());
    }
}
