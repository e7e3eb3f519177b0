//! Share links.
//!
//! A chart travels as a single URL query parameter: the compact JSON array
//! of 81 strings, compressed with lz-string into its URI-safe alphabet
//! (`A-Z a-z 0-9 + - $`). Links made by the web version of the chart open
//! here unchanged. Decoding validates the shape before a `Grid` is built,
//! so the store never sees a malformed chart.

use std::fmt;

use log::{error, warn};
use url::Url;

use mandala_engine::error::GridError;
use mandala_engine::grid::Grid;

/// Query parameter that carries the encoded chart.
pub const URL_PARAM_KEY: &str = "d";

/// Upper bound on the length of a share code. A full chart of long entries
/// stays far below this.
const MAX_CODE_LEN: usize = 1 << 20;

#[derive(Debug)]
pub enum ShareError {
    /// Nothing to decode.
    Empty,
    /// Characters outside the share-code alphabet, or an oversized code.
    Encoding(String),
    /// Not a valid lz-string stream.
    Decompress(String),
    /// Decompressed text is not a JSON array of strings.
    Json(String),
    /// A JSON array of the wrong length.
    Malformed(GridError),
    /// The share link itself could not be parsed or built.
    Url(String),
    /// A URL without the chart parameter.
    MissingParam(String),
}

impl fmt::Display for ShareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty share code"),
            Self::Encoding(msg) => write!(f, "invalid share code encoding: {msg}"),
            Self::Decompress(msg) => write!(f, "invalid share code payload: {msg}"),
            Self::Json(msg) => write!(f, "invalid chart data: {msg}"),
            Self::Malformed(err) => write!(f, "{err}"),
            Self::Url(msg) => write!(f, "invalid URL: {msg}"),
            Self::MissingParam(key) => write!(f, "URL has no '{key}' parameter"),
        }
    }
}

impl std::error::Error for ShareError {}

impl From<GridError> for ShareError {
    fn from(err: GridError) -> Self {
        Self::Malformed(err)
    }
}

#[inline]
fn is_code_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '$')
}

/// Encode a chart into a share code.
pub fn try_encode(grid: &Grid) -> Result<String, ShareError> {
    let json = serde_json::to_string(grid).map_err(|e| ShareError::Json(e.to_string()))?;
    Ok(lz_str::compress_to_encoded_uri_component(json.as_str()))
}

/// Encode a chart into a share code, or an empty string on failure.
pub fn encode(grid: &Grid) -> String {
    match try_encode(grid) {
        Ok(code) => code,
        Err(e) => {
            error!("failed to encode chart: {e}");
            String::new()
        }
    }
}

/// Decode a share code into a chart.
///
/// Spaces are read as `+`: form decoding of a query string turns an
/// unescaped `+` into a space.
pub fn decode(code: &str) -> Result<Grid, ShareError> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(ShareError::Empty);
    }
    let code = trimmed.replace(' ', "+");
    if code.len() > MAX_CODE_LEN {
        return Err(ShareError::Encoding(format!("code exceeds {MAX_CODE_LEN} bytes")));
    }
    if let Some(bad) = code.chars().find(|&c| !is_code_char(c)) {
        return Err(ShareError::Encoding(format!("unexpected character {bad:?}")));
    }

    let wide = lz_str::decompress_from_encoded_uri_component(code.as_str())
        .ok_or_else(|| ShareError::Decompress("corrupt or truncated data".to_string()))?;
    if wide.is_empty() {
        return Err(ShareError::Empty);
    }
    let json = String::from_utf16(&wide).map_err(|e| ShareError::Decompress(e.to_string()))?;

    let cells: Vec<String> =
        serde_json::from_str(&json).map_err(|e| ShareError::Json(e.to_string()))?;
    Ok(Grid::try_from(cells)?)
}

/// Decode a share code, substituting an empty chart for anything invalid.
pub fn decode_or_empty(code: &str) -> Grid {
    match decode(code) {
        Ok(grid) => grid,
        Err(e) => {
            warn!("ignoring share code: {e}");
            Grid::empty()
        }
    }
}

/// Build a share URL: `base` with its query replaced by `key=<code>`.
pub fn share_url(base: &str, key: &str, grid: &Grid) -> Result<String, ShareError> {
    let mut url = Url::parse(base).map_err(|e| ShareError::Url(e.to_string()))?;
    let code = try_encode(grid)?;
    url.query_pairs_mut().clear().append_pair(key, &code);
    Ok(url.to_string())
}

/// Extract and decode the chart parameter of a share URL.
pub fn grid_from_url(link: &str, key: &str) -> Result<Grid, ShareError> {
    let url = Url::parse(link.trim()).map_err(|e| ShareError::Url(e.to_string()))?;
    let code = url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| ShareError::MissingParam(key.to_string()))?;
    decode(&code)
}

/// Accept either a full share URL or a bare share code.
pub fn grid_from_link(input: &str, key: &str) -> Result<Grid, ShareError> {
    let input = input.trim();
    if input.contains("://") {
        grid_from_url(input, key)
    } else {
        decode(input)
    }
}
