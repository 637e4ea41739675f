//! Download URL construction.
//!
//! URLs are assembled from path segments rather than string concatenation, so
//! a base with or without a trailing slash yields the same result:
//!
//! - release: `{base}/{remote path}/{project}-{version}/{project}-{version}{suffix}`
//! - maven jar: `{repo}/{group/as/path}/{artifact}/{version}/{artifact}-{version}.jar`

use url::Url;

use super::types::{ArchiveSpec, FetchError, FetchResult};

/// Builds the URL of a release archive below a mirror or archive root.
pub fn release_url(base: &Url, spec: &ArchiveSpec) -> FetchResult<Url> {
    let release = spec.release_name();
    let file_name = spec.file_name();

    append_segments(
        base,
        spec.remote_path()
            .split('/')
            .chain([release.as_str(), file_name.as_str()]),
    )
}

/// Builds the URL of a jar in a Maven 2 layout repository.
pub fn maven_jar_url(
    repository: &Url,
    group_id: &str,
    artifact_id: &str,
    version: &str,
) -> FetchResult<Url> {
    let file_name = format!("{}-{}.jar", artifact_id, version);

    append_segments(
        repository,
        group_id
            .split('.')
            .chain([artifact_id, version, file_name.as_str()]),
    )
}

fn append_segments<'a, I>(base: &Url, segments: I) -> FetchResult<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::Mirror(format!("URL cannot be used as a base: {}", base)))?
        .pop_if_empty()
        .extend(segments.into_iter().filter(|s| !s.is_empty()));
    Ok(url)
}

/// Parses the body returned by the mirror-resolution endpoint.
///
/// Checks:
/// - the body is an absolute URL
/// - the scheme is HTTP or HTTPS
/// - the URL has a host
pub fn parse_mirror_url(body: &str) -> FetchResult<Url> {
    let trimmed = body.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| FetchError::Mirror(format!("Invalid mirror URL {:?}: {}", trimmed, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::Mirror(format!(
            "Mirror URL must use HTTP(S): {}",
            trimmed
        )));
    }

    if url.host_str().is_none() {
        return Err(FetchError::Mirror(format!(
            "Mirror URL must have a host: {}",
            trimmed
        )));
    }

    Ok(url)
}
