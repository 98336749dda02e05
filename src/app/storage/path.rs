//! Output path derivation
//!
//! Images are grouped by author: the directory name is built from the
//! record's `artist:` tags, and the file name is the image id plus the
//! extension of the artifact URL.
//!
//! ```text
//! {root}/{author}-&-{author}/{id}{ext}
//! {root}/{author}-&-{author}/{id}.json
//! ```

use std::path::Path;

use url::Url;

use crate::app::models::{DownloadTask, ImageRecord};
use crate::constants::{files, naming};

/// Directory name for a record's authors
///
/// Author tags lose their `artist:` prefix, path separators inside a name
/// become `_`, and the names are sorted and joined with `-&-`. The result is
/// cut to 200 characters. Records without author tags go to `unknown`.
pub fn author_directory(tags: &[String]) -> String {
    let replacement = naming::SEPARATOR_REPLACEMENT.to_string();
    let mut authors: Vec<String> = tags
        .iter()
        .filter_map(|tag| tag.strip_prefix(naming::AUTHOR_TAG_PREFIX))
        .map(|name| name.replace(['/', '\\'], &replacement))
        .collect();

    if authors.is_empty() {
        return naming::UNKNOWN_AUTHOR_DIRECTORY.to_string();
    }

    authors.sort();
    authors
        .join(naming::AUTHOR_SEPARATOR)
        .chars()
        .take(naming::MAX_DIRECTORY_NAME_CHARS)
        .collect()
}

/// Extension of the artifact, taken from the last segment of the URL path
///
/// Lower-cased, with `.jpeg` collapsed to `.jpg`. Empty when the file name
/// carries no extension.
pub fn normalized_extension(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let file_name = path.rsplit('/').next().unwrap_or_default();
    let extension = match Path::new(file_name).extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
        None => return String::new(),
    };

    if extension == naming::JPEG_ALIAS {
        naming::JPEG_CANONICAL.to_string()
    } else {
        extension
    }
}

/// Path generation utility for downloaded images
pub struct PathGenerator;

impl PathGenerator {
    /// Plan where a record and its sidecar are written under `root`
    pub fn task_for(root: &Path, record: &ImageRecord) -> DownloadTask {
        let directory = root.join(author_directory(&record.tags));
        let url = record.representations.full.clone();
        let file_path = directory.join(format!("{}{}", record.id, normalized_extension(&url)));
        let sidecar_path = directory.join(format!("{}.{}", record.id, files::SIDECAR_EXTENSION));

        DownloadTask {
            id: record.id,
            url,
            directory,
            file_path,
            sidecar_path,
        }
    }

    /// Prefix of the temporary files a download is streamed into
    ///
    /// A random part follows the prefix, so concurrent writes of the same
    /// artifact never share a temporary file.
    pub fn temp_prefix(final_path: &Path) -> String {
        let name = final_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!(".{}.", name)
    }
}
