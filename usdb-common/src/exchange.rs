//! Import and export of USDB id lists
//!
//! Supported inputs, chosen by file extension:
//! - `.json`: array of objects with an `id` field
//! - `.usdb_ids`: one id per line (also the export format)
//! - `.url` / `.desktop`: INI style web links to a USDB song page
//! - `.webloc`: macOS property list holding a single USDB link

use crate::{Result, SongId};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Host serving USDB song pages
pub const USDB_HOST: &str = "usdb.animux.de";

/// Reasons a single id file cannot be imported
#[derive(Error, Debug)]
pub enum UsdbIdFileError {
    #[error("file extension is not supported")]
    UnsupportedExtension,

    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("empty file")]
    EmptyFile,

    #[error("invalid JSON format: {0}")]
    InvalidJson(serde_json::Error),

    #[error("file does not contain a JSON array")]
    NoJsonArray,

    #[error("empty JSON array")]
    EmptyJsonArray,

    #[error("invalid USDB ID in file")]
    InvalidSongId,

    #[error("invalid file format: missing a section header")]
    MissingSectionHeader,

    #[error("invalid file format: missing or duplicate option")]
    MissingOrDuplicateOption,

    #[error("invalid file format: missing section '{0}'")]
    MissingSection(String),

    #[error("invalid file format: missing key '{0}'")]
    MissingKey(String),

    #[error("invalid file format: missing tag '{0}'")]
    MissingTag(String),

    #[error("invalid file format: multiple tags '{0}'")]
    MultipleTags(String),

    #[error("invalid file format: missing URL tag '{0}'")]
    MissingUrlTag(String),

    #[error("invalid file format: file contains multiple URLs")]
    MultipleUrls,

    #[error("no URL found")]
    NoUrlFound,

    #[error("invalid file format: malformed URL '{0}'")]
    MalformedUrl(String),

    #[error("invalid file format: malformed URL '{url}': has invalid domain '{domain}'")]
    InvalidDomain { url: String, domain: String },

    #[error("invalid file format: malformed URL '{0}': has no query parameters")]
    NoQueryParameters(String),

    #[error("invalid file format: malformed URL '{url}': missing query parameter '{parameter}'")]
    MissingQueryParameter { url: String, parameter: String },

    #[error("invalid file format: malformed URL '{url}': repeated query parameter '{parameter}'")]
    RepeatedQueryParameter { url: String, parameter: String },

    #[error("invalid file format: malformed URL '{url}': invalid query parameter '{parameter}'")]
    InvalidQueryParameter { url: String, parameter: String },
}

type ParseResult<T> = std::result::Result<T, UsdbIdFileError>;

/// Read the song ids listed in `path`
pub fn parse_usdb_id_file(path: &Path) -> ParseResult<Vec<SongId>> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    match extension {
        "json" => parse_json(&read_content(path)?),
        "usdb_ids" => parse_id_lines(&read_content(path)?),
        "url" => parse_ini_link(&read_content(path)?, "InternetShortcut", "URL").map(|id| vec![id]),
        "desktop" => parse_ini_link(&read_content(path)?, "Desktop Entry", "URL").map(|id| vec![id]),
        "webloc" => parse_webloc(&read_content(path)?).map(|id| vec![id]),
        _ => Err(UsdbIdFileError::UnsupportedExtension),
    }
}

/// Parse several files and merge their ids, sorted and without duplicates
///
/// Every failing file is logged; the import is aborted with the first
/// failure so that a partial list is never staged.
pub fn import_usdb_id_files(paths: &[PathBuf]) -> Result<Vec<SongId>> {
    let mut ids = BTreeSet::new();
    let mut first_error = None;
    for path in paths {
        match parse_usdb_id_file(path) {
            Ok(parsed) => ids.extend(parsed),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed importing USDB ids");
                first_error.get_or_insert(crate::Error::UsdbIdFile {
                    path: path.clone(),
                    source: e,
                });
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }
    tracing::info!(files = paths.len(), ids = ids.len(), "Read USDB ids");
    Ok(ids.into_iter().collect())
}

/// Write `ids` one per line, the format read back from `.usdb_ids` files
pub fn write_usdb_id_file(path: &Path, ids: &[SongId]) -> Result<()> {
    let content = ids
        .iter()
        .map(SongId::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), ids = ids.len(), "Exported USDB ids");
    Ok(())
}

fn read_content(path: &Path) -> ParseResult<String> {
    let content = std::fs::read_to_string(path)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    if content.trim().is_empty() {
        return Err(UsdbIdFileError::EmptyFile);
    }
    Ok(content.to_string())
}

fn parse_json(content: &str) -> ParseResult<Vec<SongId>> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(UsdbIdFileError::InvalidJson)?;
    let serde_json::Value::Array(elements) = value else {
        return Err(UsdbIdFileError::NoJsonArray);
    };
    if elements.is_empty() {
        return Err(UsdbIdFileError::EmptyJsonArray);
    }
    elements
        .iter()
        .map(|element| match element.get("id") {
            Some(serde_json::Value::Number(n)) => n
                .as_i64()
                .and_then(|n| SongId::new(n).ok())
                .ok_or(UsdbIdFileError::InvalidSongId),
            Some(serde_json::Value::String(s)) => {
                SongId::parse(s).map_err(|_| UsdbIdFileError::InvalidSongId)
            }
            Some(_) => Err(UsdbIdFileError::InvalidSongId),
            None => Err(UsdbIdFileError::MissingKey("id".to_string())),
        })
        .collect()
}

fn parse_id_lines(content: &str) -> ParseResult<Vec<SongId>> {
    content
        .lines()
        .map(|line| SongId::parse(line).map_err(|_| UsdbIdFileError::InvalidSongId))
        .collect()
}

/// Look up `section.key` in an INI style link file and parse its URL
///
/// Keys compare case-insensitively; a key repeated within one section, a
/// repeated section or a line that is neither is a format error.
fn parse_ini_link(content: &str, section: &str, key: &str) -> ParseResult<SongId> {
    let mut current: Option<&str> = None;
    let mut sections = Vec::new();
    let mut seen_keys = BTreeSet::new();
    let mut url = None;

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if sections.contains(&name) {
                return Err(UsdbIdFileError::MissingOrDuplicateOption);
            }
            sections.push(name);
            current = Some(name);
            continue;
        }
        let Some(current) = current else {
            return Err(UsdbIdFileError::MissingSectionHeader);
        };
        let Some((name, value)) = line.split_once(['=', ':']) else {
            return Err(UsdbIdFileError::MissingOrDuplicateOption);
        };
        let name = name.trim().to_lowercase();
        if !seen_keys.insert((current, name.clone())) {
            return Err(UsdbIdFileError::MissingOrDuplicateOption);
        }
        if current == section && name == key.to_lowercase() {
            url = Some(value.trim());
        }
    }

    if sections.is_empty() {
        return Err(UsdbIdFileError::EmptyFile);
    }
    if !sections.contains(&section) {
        return Err(UsdbIdFileError::MissingSection(section.to_string()));
    }
    let url = url.ok_or_else(|| UsdbIdFileError::MissingKey(key.to_string()))?;
    parse_usdb_url(url)
}

/// Contents of every `<tag>...</tag>` element in `xml`
fn elements<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let mut found = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find(&open) {
        let after_open = &rest[start + open.len()..];
        let Some(end) = after_open.find(&close) else {
            break;
        };
        found.push(&after_open[..end]);
        rest = &after_open[end + close.len()..];
    }
    found
}

/// Exactly one `<tag>` element of `xml`
fn single_element<'a>(xml: &'a str, tag: &str) -> ParseResult<&'a str> {
    match elements(xml, tag).as_slice() {
        [] => Err(UsdbIdFileError::MissingTag(tag.to_string())),
        [inner] => Ok(*inner),
        _ => Err(UsdbIdFileError::MultipleTags(tag.to_string())),
    }
}

fn parse_webloc(content: &str) -> ParseResult<SongId> {
    // Attributes are allowed on the plist root, e.g. `<plist version="1.0">`
    let normalized = match content.find("<plist ") {
        Some(start) => match content[start..].find('>') {
            Some(end) => format!("{}<plist>{}", &content[..start], &content[start + end + 1..]),
            None => content.to_string(),
        },
        None => content.to_string(),
    };
    let plist = single_element(&normalized, "plist")?;
    let dict = single_element(plist, "dict")?;
    let url = match elements(dict, "string").as_slice() {
        [] => return Err(UsdbIdFileError::MissingUrlTag("string".to_string())),
        [url] => *url,
        _ => return Err(UsdbIdFileError::MultipleUrls),
    };
    parse_usdb_url(&url.trim().replace("&amp;", "&"))
}

/// Song id from a link such as `https://usdb.animux.de/?link=detail&id=3327`
pub fn parse_usdb_url(raw: &str) -> ParseResult<SongId> {
    if raw.is_empty() {
        return Err(UsdbIdFileError::NoUrlFound);
    }
    let url = Url::parse(raw).map_err(|_| UsdbIdFileError::MalformedUrl(raw.to_string()))?;
    let Some(host) = url.host_str() else {
        return Err(UsdbIdFileError::MalformedUrl(raw.to_string()));
    };
    if host != USDB_HOST {
        return Err(UsdbIdFileError::InvalidDomain {
            url: raw.to_string(),
            domain: host.to_string(),
        });
    }
    if url.query().map_or(true, str::is_empty) {
        return Err(UsdbIdFileError::NoQueryParameters(raw.to_string()));
    }

    let values: Vec<_> = url
        .query_pairs()
        .filter(|(name, _)| name == "id")
        .map(|(_, value)| value.into_owned())
        .collect();
    let (url, parameter) = (raw.to_string(), "id".to_string());
    match values.as_slice() {
        [] => Err(UsdbIdFileError::MissingQueryParameter { url, parameter }),
        [value] => SongId::parse(value)
            .map_err(|_| UsdbIdFileError::InvalidQueryParameter { url, parameter }),
        _ => Err(UsdbIdFileError::RepeatedQueryParameter { url, parameter }),
    }
}
