//! Strict decode-into-target.
//!
//! Populates a destination from an opaque JSON value and refuses to silently
//! drop anything: every source field serde skips while deserializing the
//! destination is reported, whether or not the destination type declares
//! `deny_unknown_fields`.

use serde::de::DeserializeOwned;
use serde_ignored::Path;
use serde_json::value::RawValue;

use crate::error::{Result, SubwireError};

/// Decode `raw` into `dest`.
///
/// When the source only carries fields the destination has no place for,
/// `dest` still receives everything that did fit and the first unused field
/// is reported. On a shape mismatch `dest` is left as it was.
pub fn decode_into<T>(raw: &RawValue, dest: &mut T) -> Result<()>
where
    T: DeserializeOwned,
{
    let mut unused: Vec<String> = Vec::new();
    let mut de = serde_json::Deserializer::from_str(raw.get());
    let decoded: T = serde_ignored::deserialize(&mut de, |path| unused.push(render(&path)))
        .map_err(|e| SubwireError::Decode(e.to_string()))?;

    *dest = decoded;

    match unused.first() {
        Some(path) => {
            tracing::debug!(unused = ?unused, "source fields left over after decode");
            Err(SubwireError::Decode(format!(
                "field `{path}` has no place in the destination"
            )))
        }
        None => Ok(()),
    }
}

/// `tags[1].color` style rendering.
fn render(path: &Path<'_>) -> String {
    match path {
        Path::Root => String::new(),
        Path::Seq { parent, index } => format!("{}[{index}]", render(parent)),
        Path::Map { parent, key } => {
            let head = render(parent);
            if head.is_empty() {
                key.clone()
            } else {
                format!("{head}.{key}")
            }
        }
        Path::Some { parent }
        | Path::NewtypeStruct { parent }
        | Path::NewtypeVariant { parent } => render(parent),
    }
}
