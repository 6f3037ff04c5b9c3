//! Ground facts and rule texts named by the config.

use std::path::Path;

use deduct_core::{Document, Store, n3};

use crate::config::Config;
use crate::error::{Result, StoreError};

/// Everything the reasoner gets besides the request itself.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    pub ground: Store,
    pub rules: Vec<Document>,
}

impl Bundle {
    /// Read every configured ground and rule file.
    ///
    /// Ground files are parsed and merged; each parse scopes its own blank
    /// nodes, so two files never share one by accident. Rule files are kept
    /// verbatim.
    pub fn load(config: &Config) -> Result<Self> {
        let mut bundle = Bundle::default();
        for path in config.ground_paths() {
            let store = load_ground(&path)?;
            tracing::debug!(path = %path.display(), statements = store.len(), "loaded ground facts");
            bundle.ground.extend(store);
        }
        for path in config.rule_paths() {
            bundle.rules.push(load_rules(&path)?);
        }
        tracing::info!(
            ground = bundle.ground.len(),
            rules = bundle.rules.len(),
            "application bundle loaded"
        );
        Ok(bundle)
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| StoreError::Read {
        path: path.display().to_string(),
        source: e,
    })
}

/// Relative IRIs in a ground file resolve against the file's own location.
fn file_base(path: &Path) -> Option<String> {
    let absolute = std::fs::canonicalize(path).ok()?;
    let absolute = absolute.to_str()?.replace('\\', "/");
    let path = absolute
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/");
    Some(if path.starts_with('/') {
        format!("file://{path}")
    } else {
        format!("file:///{path}")
    })
}

/// Percent-encode every byte outside the unreserved set and the
/// sub-delimiters allowed in a path segment.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'.'
            | b'_'
            | b'~'
            | b'!'
            | b'$'
            | b'&'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b'+'
            | b','
            | b';'
            | b'='
            | b':'
            | b'@' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub fn load_ground(path: &Path) -> Result<Store> {
    let text = read(path)?;
    let base = file_base(path);
    n3::parse_with_base(&text, base.as_deref()).map_err(|e| StoreError::Ground {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn load_rules(path: &Path) -> Result<Document> {
    let text = read(path)?;
    if let Err(e) = n3::parse(&text) {
        // Engines accept more than the codec does; hand the text over anyway.
        tracing::warn!(path = %path.display(), "rule file does not parse locally: {e}");
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Document::new(name, text))
}
