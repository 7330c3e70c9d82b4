//! Tileset metadata header codec.
//!
//! A tileset file begins with a JSON object describing the set; tile data
//! follows and is not read here.

use std::io::{BufReader, Read};

use serde::Deserialize;

use crate::vfs::VfsError;

/// Descriptive record of one tileset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetInfo {
    pub unique_name: String,
    pub display_name: String,
    pub description: String,
    pub author: String,
    pub license: String,
    pub version: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum TilesetParseError {
    #[error(transparent)]
    Open(#[from] VfsError),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed header: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file has no header")]
    Empty,

    #[error("header is missing `{0}`")]
    MissingField(&'static str),
}

/// Reads the metadata header from the start of a tileset stream.
pub trait TilesetCodec: Send + Sync {
    fn parse_metadata(&self, stream: &mut dyn Read) -> Result<TilesetInfo, TilesetParseError>;
}

#[derive(Deserialize)]
struct RawHeader {
    unique_name: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    license: String,
    #[serde(default)]
    version: u32,
}

/// The JSON header format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHeaderCodec;

impl TilesetCodec for JsonHeaderCodec {
    fn parse_metadata(&self, stream: &mut dyn Read) -> Result<TilesetInfo, TilesetParseError> {
        let reader = BufReader::new(stream);
        let raw: RawHeader = serde_json::Deserializer::from_reader(reader)
            .into_iter::<RawHeader>()
            .next()
            .ok_or(TilesetParseError::Empty)??;

        let unique_name = raw
            .unique_name
            .filter(|n| !n.trim().is_empty())
            .ok_or(TilesetParseError::MissingField("unique_name"))?;
        let display_name = raw
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| unique_name.clone());

        Ok(TilesetInfo {
            unique_name,
            display_name,
            description: raw.description,
            author: raw.author,
            license: raw.license,
            version: raw.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(bytes: &[u8]) -> Result<TilesetInfo, TilesetParseError> {
        JsonHeaderCodec.parse_metadata(&mut &bytes[..])
    }

    #[test]
    fn header_followed_by_tile_data() {
        let mut file = br#"{"unique_name":"lab","display_name":"Laboratory","author":"ml","version":2}"#.to_vec();
        file.extend_from_slice(&[0, 159, 146, 150, 1, 2, 3]);
        let info = parse(&file).unwrap();
        assert_eq!(info.unique_name, "lab");
        assert_eq!(info.display_name, "Laboratory");
        assert_eq!(info.author, "ml");
        assert_eq!(info.version, 2);
        assert_eq!(info.license, "");
    }

    #[test]
    fn display_name_falls_back_to_unique_name() {
        let info = parse(br#"{"unique_name":"cave"}"#).unwrap();
        assert_eq!(info.display_name, "cave");
    }

    #[test]
    fn missing_or_blank_unique_name_is_an_error() {
        assert!(matches!(parse(br#"{"display_name":"x"}"#), Err(TilesetParseError::MissingField("unique_name"))));
        assert!(matches!(parse(br#"{"unique_name":"  "}"#), Err(TilesetParseError::MissingField(_))));
    }

    #[test]
    fn garbage_and_empty_input_fail() {
        assert!(matches!(parse(b"\x89PNG\r\n"), Err(TilesetParseError::Json(_))));
        assert!(matches!(parse(b""), Err(TilesetParseError::Empty)));
    }
}
