//! Image reference normalisation
//!
//! Splits `name[:tag][@digest]` input into its parts. A registry port
//! (`registry:5000/app`) is never mistaken for a tag.

use std::fmt;

use serde::Serialize;

/// Tag used when none is given.
pub const DEFAULT_TAG: &str = "latest";

/// A normalised image reference.
///
/// When `digest` is set it pins the image content: the engine pulls and
/// inspects by digest, and `tag` is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageRef {
    pub name: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ImageRef {
    /// Builds a reference from an image name and an optional tag.
    ///
    /// A tag embedded in `name` wins and the `tag` argument is ignored.
    /// Otherwise the `tag` argument is used, falling back to [`DEFAULT_TAG`].
    /// An `@digest` suffix is kept separately and never treated as a tag.
    ///
    /// ```
    /// use hoist_docker::ImageRef;
    ///
    /// let r = ImageRef::parse("hello-world", None);
    /// assert_eq!(r.to_string(), "hello-world:latest");
    ///
    /// let r = ImageRef::parse("nginx:1.27", Some("ignored"));
    /// assert_eq!(r.tag, "1.27");
    ///
    /// let r = ImageRef::parse("alpine@sha256:abcd", None);
    /// assert_eq!(r.to_string(), "alpine@sha256:abcd");
    /// ```
    pub fn parse(name: &str, tag: Option<&str>) -> Self {
        let (reference, digest) = split_digest(name);
        let digest = digest.map(str::to_owned);

        if let Some((repo, embedded)) = split_tag(reference) {
            return Self {
                name: repo.to_owned(),
                tag: embedded.to_owned(),
                digest,
            };
        }

        let tag = tag.filter(|t| !t.is_empty()).unwrap_or(DEFAULT_TAG);
        Self {
            name: reference.to_owned(),
            tag: tag.to_owned(),
            digest,
        }
    }

    /// The value the engine's pull call expects as its tag: the digest when
    /// present, the tag otherwise.
    pub fn pull_tag(&self) -> &str {
        self.digest.as_deref().unwrap_or(&self.tag)
    }
}

/// Splits off an `@digest` suffix. An empty digest or name leaves the input whole.
fn split_digest(name: &str) -> (&str, Option<&str>) {
    match name.split_once('@') {
        Some((reference, digest)) if !reference.is_empty() && !digest.is_empty() => {
            (reference, Some(digest))
        }
        _ => (name, None),
    }
}

/// Treats the part after the last `:` as a tag only when it has no `/`.
fn split_tag(name: &str) -> Option<(&str, &str)> {
    let (repo, tag) = name.rsplit_once(':')?;
    if tag.contains('/') || repo.is_empty() || tag.is_empty() {
        return None;
    }
    Some((repo, tag))
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.digest {
            Some(digest) => write!(f, "{}@{}", self.name, digest),
            None => write!(f, "{}:{}", self.name, self.tag),
        }
    }
}
