//! Container image references

use std::fmt;

use crate::error::{ResolverError, ResolverResult};

const DEFAULT_TAG: &str = "latest";

/// A parsed image reference: `[registry/]repository[:tag][@digest]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageName {
    repository: String,
    tag: String,
    digest: Option<String>,
}

impl ImageName {
    /// Parse an image reference. A missing tag means `latest`.
    ///
    /// A colon only separates the tag when it appears after the last `/`,
    /// so `localhost:5000/postgres` is a repository on a registry port.
    pub fn parse(reference: &str) -> ResolverResult<Self> {
        let invalid = |reason| ResolverError::InvalidImage {
            image: reference.to_string(),
            reason,
        };

        let reference = reference.trim();
        if reference.is_empty() {
            return Err(invalid("empty reference"));
        }
        if reference.chars().any(char::is_whitespace) {
            return Err(invalid("contains whitespace"));
        }

        let (name, digest) = match reference.split_once('@') {
            Some((name, digest)) if !digest.is_empty() => (name, Some(digest.to_string())),
            Some(_) => return Err(invalid("empty digest")),
            None => (reference, None),
        };

        let last_slash = name.rfind('/').map_or(0, |i| i + 1);
        let (repository, tag) = match name[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                (&name[..split], &name[split + 1..])
            }
            None => (name, DEFAULT_TAG),
        };

        if repository.is_empty() || repository.ends_with('/') {
            return Err(invalid("empty repository"));
        }
        if tag.is_empty() {
            return Err(invalid("empty tag"));
        }

        Ok(Self {
            repository: repository.to_string(),
            tag: tag.to_string(),
            digest,
        })
    }

    /// Repository including any registry prefix, e.g. `docker.io/library/postgres`.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// The tag, `latest` when none was given.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The digest, when pinned.
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// The same repository with another tag. Drops any digest.
    #[must_use]
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        Self {
            repository: self.repository.clone(),
            tag: tag.into(),
            digest: None,
        }
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)?;
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ImageName {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
