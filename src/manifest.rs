use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Font Awesome release the generator targets unless told otherwise
pub const DEFAULT_VERSION: &str = "5.11.2";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode icon manifest")]
    Decode(#[from] serde_json::Error),
}

/// All icons of one release, keyed by icon name.
///
/// Backed by a `BTreeMap`, so iteration is in byte-wise ascending name
/// order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct IconManifest {
    icons: BTreeMap<String, IconMetadata>,
}

impl IconManifest {
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Icons in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IconMetadata)> {
        self.icons.iter().map(|(name, icon)| (name.as_str(), icon))
    }
}

/// Metadata for a single icon
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IconMetadata {
    /// Styles in the order the manifest declares them
    #[serde(default)]
    pub styles: Vec<String>,
    /// Drawing data per style
    #[serde(default)]
    pub svg: BTreeMap<String, StyleData>,
}

/// Drawing data for one style of an icon.
///
/// Entries that carry both shapes decode as `Raw`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StyleData {
    /// A complete `<svg>` document
    Raw { raw: String },
    /// A viewbox plus path data or path markup
    Path {
        #[serde(rename = "viewBox", deserialize_with = "view_box")]
        view_box: [f64; 4],
        path: String,
    },
}

/// The manifest stores viewbox components as strings, but plain numbers are
/// accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Component {
    Number(f64),
    Text(String),
}

fn view_box<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[f64; 4], D::Error> {
    let components = <[Component; 4]>::deserialize(deserializer)?;
    let mut view_box = [0.0; 4];

    for (slot, component) in view_box.iter_mut().zip(components) {
        let value = match component {
            Component::Number(value) => value,
            Component::Text(text) => text.trim().parse().map_err(|_| {
                D::Error::custom(format!("invalid viewBox component {text:?}"))
            })?,
        };
        if !value.is_finite() {
            return Err(D::Error::custom(format!(
                "viewBox component {value} is not finite"
            )));
        }
        *slot = value;
    }

    Ok(view_box)
}

/// Location of the metadata document for a release
pub fn manifest_url(version: &str) -> String {
    format!("https://raw.githubusercontent.com/FortAwesome/Font-Awesome/{version}/metadata/icons.json")
}

/// Download and decode the manifest for `version`
pub fn fetch(version: &str) -> Result<IconManifest, ManifestError> {
    fetch_from(&manifest_url(version))
}

/// Download and decode the manifest served at `url`
pub fn fetch_from(url: &str) -> Result<IconManifest, ManifestError> {
    let url = url.to_string();
    info!(%url, "Fetching icon manifest");

    let client = reqwest::blocking::Client::builder()
        .timeout(None::<Duration>)
        .build()
        .map_err(ManifestError::Client)?;

    let response = client
        .get(&url)
        .send()
        .map_err(|source| ManifestError::Transport {
            url: url.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ManifestError::Status { url, status });
    }

    let body = response
        .bytes()
        .map_err(|source| ManifestError::Transport {
            url: url.clone(),
            source,
        })?;
    debug!(bytes = body.len(), "Downloaded manifest");

    decode(&body)
}

/// Read and decode a manifest stored on disk
pub fn load(path: &Path) -> Result<IconManifest, ManifestError> {
    info!(path = %path.display(), "Reading icon manifest");

    let data = std::fs::read(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    decode(&data)
}

/// Decode a manifest document
pub fn decode(data: &[u8]) -> Result<IconManifest, ManifestError> {
    let manifest: IconManifest = serde_json::from_slice(data)?;
    debug!(icons = manifest.len(), "Decoded manifest");
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;

    #[test]
    fn test_decode_raw_shape() {
        let json = br#"{
            "home": {
                "label": "home",
                "styles": ["solid"],
                "svg": {
                    "solid": {
                        "last_modified": 1,
                        "raw": "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 576 512\"><path d=\"M1 2\"/></svg>",
                        "viewBox": ["0", "0", "576", "512"],
                        "width": 576,
                        "height": 512,
                        "path": "M1 2"
                    }
                }
            }
        }"#;

        let manifest = decode(json).unwrap();
        let home = &manifest.icons["home"];
        assert_eq!(home.styles, vec!["solid"]);
        assert!(matches!(home.svg["solid"], StyleData::Raw { .. }));
    }

    #[test]
    fn test_decode_path_shape() {
        let json = br#"{
            "alert": {
                "styles": ["solid"],
                "svg": { "solid": { "viewBox": ["0", "0", "16", "16"], "path": "M8 1z" } }
            },
            "bell": {
                "styles": ["regular"],
                "svg": { "regular": { "viewBox": [0, 0, 448, 512.5], "path": "M0 0z" } }
            }
        }"#;

        let manifest = decode(json).unwrap();
        assert_eq!(
            manifest.icons["alert"].svg["solid"],
            StyleData::Path {
                view_box: [0.0, 0.0, 16.0, 16.0],
                path: "M8 1z".to_string()
            }
        );
        assert_eq!(
            manifest.icons["bell"].svg["regular"],
            StyleData::Path {
                view_box: [0.0, 0.0, 448.0, 512.5],
                path: "M0 0z".to_string()
            }
        );
    }

    #[test]
    fn test_iteration_is_sorted() {
        let json = br#"{"zoom": {}, "500px": {}, "angle-up": {}, "angle": {}}"#;
        let manifest = decode(json).unwrap();
        let names: Vec<&str> = manifest.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["500px", "angle", "angle-up", "zoom"]);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(matches!(
            decode(b"{\"home\": "),
            Err(ManifestError::Decode(_))
        ));
        assert!(decode(br#"{"home": {"styles": ["solid"], "svg": {"solid": {"viewBox": ["a", "0", "1", "1"], "path": "M0"}}}}"#).is_err());
        assert!(decode(br#"{"home": {"styles": ["solid"], "svg": {"solid": {"viewBox": [0, 0, 1], "path": "M0"}}}}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/icons.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    #[test]
    fn test_fetch_from_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/5.11.2/metadata/icons.json");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"home": {"styles": ["solid"], "svg": {"solid": {"raw": "<svg/>"}}}}"#);
        });

        let manifest = fetch_from(&server.url("/5.11.2/metadata/icons.json")).unwrap();
        mock.assert();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.icons["home"].styles, vec!["solid"]);
    }

    #[test]
    fn test_fetch_from_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing/metadata/icons.json");
            then.status(404).body("404: Not Found");
        });

        let err = fetch_from(&server.url("/missing/metadata/icons.json")).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Status { status, .. } if status == reqwest::StatusCode::NOT_FOUND
        ));
    }

    #[test]
    fn test_fetch_from_garbage_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/icons.json");
            then.status(200).body("<html>not json</html>");
        });

        let err = fetch_from(&server.url("/icons.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Decode(_)));
    }

    #[test]
    fn test_fetch_from_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetch_from(&format!("http://{addr}/icons.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Transport { .. }));
    }

    #[test]
    fn test_manifest_url() {
        assert_eq!(
            manifest_url("5.11.2"),
            "https://raw.githubusercontent.com/FortAwesome/Font-Awesome/5.11.2/metadata/icons.json"
        );
    }
}
