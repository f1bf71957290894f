//! Hashed, allowlisted file sets.
//!
//! A [`Distribution`] is a fixed list of relative paths under a release
//! directory. Its manifest lists every present file with its SHA-256 and
//! size. The device release and the bootstrap subset are two instances of
//! the same type.
//!
//! Manifests are memoized against a stamp of `(path, size, mtime)` for every
//! file plus the `VERSION` file. A changed stamp triggers a rebuild, and the
//! result is published as one immutable `Arc`, so readers either see the old
//! snapshot or the new one.

use classnet_common::conditional::sha256_hex;
use classnet_config::{is_safe_relative_path, AgentConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::error::AgentError;

const VERSION_FILE: &str = "VERSION";
const UNKNOWN_VERSION: &str = "0.0.0";

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub sha256: String,
    pub size: u64,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub files: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entry(&self, path: &str) -> Option<&ManifestEntry> {
        self.files.iter().find(|entry| entry.path == path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

type ReleaseStamp = Vec<(String, Option<FileStamp>)>;

#[derive(Debug)]
struct Snapshot {
    stamp: ReleaseStamp,
    manifest: Arc<Manifest>,
}

/// Normalize a requested path to the form used in manifests.
///
/// Backslashes become slashes and a leading `./` or `/` is dropped. Returns
/// `None` for anything that is not a plain relative path.
pub fn normalize_request_path(raw: &str) -> Option<String> {
    let slashed = raw.trim().replace('\\', "/");
    let mut path = slashed.as_str();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    let path = path.trim_start_matches('/');
    is_safe_relative_path(path).then(|| path.to_string())
}

#[derive(Debug)]
pub struct Distribution {
    name: &'static str,
    root: PathBuf,
    version: Option<String>,
    files: Vec<String>,
    cache: RwLock<Option<Arc<Snapshot>>>,
}

impl Distribution {
    pub fn new(
        name: &'static str,
        root: impl Into<PathBuf>,
        version: Option<String>,
        files: &[String],
    ) -> Result<Self, AgentError> {
        let mut normalized = Vec::with_capacity(files.len());
        for file in files {
            let path = normalize_request_path(file)
                .ok_or_else(|| AgentError::UnsafePath(file.clone()))?;
            if !normalized.contains(&path) {
                normalized.push(path);
            }
        }

        Ok(Self {
            name,
            root: root.into(),
            version: version.filter(|v| !v.trim().is_empty()),
            files: normalized,
            cache: RwLock::new(None),
        })
    }

    /// The full agent release a registered device updates from.
    pub fn agent(config: &AgentConfig) -> Result<Self, AgentError> {
        Self::new("agent", &config.release_dir, config.version.clone(), &config.files)
    }

    /// The installer subset served to devices holding only an enrollment ticket.
    pub fn bootstrap(config: &AgentConfig) -> Result<Self, AgentError> {
        Self::new(
            "bootstrap",
            &config.release_dir,
            config.version.clone(),
            &config.bootstrap_files,
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configured paths, in manifest order.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    fn stamp_of(&self, relative: &str) -> Result<Option<FileStamp>, AgentError> {
        match fs::metadata(self.root.join(relative)) {
            Ok(meta) if meta.is_file() => Ok(Some(FileStamp {
                len: meta.len(),
                modified: meta.modified().ok(),
            })),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(AgentError::Io {
                path: relative.to_string(),
                source,
            }),
        }
    }

    fn current_stamp(&self) -> Result<ReleaseStamp, AgentError> {
        let mut stamp = Vec::with_capacity(self.files.len() + 1);
        if self.version.is_none() {
            stamp.push((VERSION_FILE.to_string(), self.stamp_of(VERSION_FILE)?));
        }
        for file in &self.files {
            stamp.push((file.clone(), self.stamp_of(file)?));
        }
        Ok(stamp)
    }

    fn read_version(&self) -> String {
        if let Some(version) = &self.version {
            return version.trim().to_string();
        }
        match fs::read_to_string(self.root.join(VERSION_FILE)) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => {
                warn!(distribution = self.name, root = %self.root.display(), "No release version found");
                UNKNOWN_VERSION.to_string()
            }
        }
    }

    fn build(&self, stamp: &ReleaseStamp) -> Result<Manifest, AgentError> {
        // The VERSION stamp, when present, leads and is not a release file.
        let offset = usize::from(self.version.is_none());
        let mut files = Vec::with_capacity(self.files.len());
        for (path, file_stamp) in &stamp[offset..] {
            if file_stamp.is_none() {
                warn!(distribution = self.name, path = %path, "Release file missing, left out of manifest");
                continue;
            }
            let bytes = match fs::read(self.root.join(path)) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!(distribution = self.name, path = %path, "Release file vanished while hashing");
                    continue;
                }
                Err(source) => {
                    return Err(AgentError::Io {
                        path: path.clone(),
                        source,
                    })
                }
            };
            files.push(ManifestEntry {
                path: path.clone(),
                sha256: sha256_hex(&bytes),
                size: bytes.len() as u64,
            });
        }

        Ok(Manifest {
            version: self.read_version(),
            files,
        })
    }

    /// Current manifest, rebuilt only when the release on disk changed.
    ///
    /// Blocking: call from `spawn_blocking` in async code.
    pub fn manifest(&self) -> Result<Arc<Manifest>, AgentError> {
        let stamp = self.current_stamp()?;

        {
            let cache = self.cache.read().map_err(|_| AgentError::Poisoned)?;
            if let Some(snapshot) = cache.as_ref() {
                if snapshot.stamp == stamp {
                    return Ok(snapshot.manifest.clone());
                }
            }
        }

        let manifest = Arc::new(self.build(&stamp)?);
        info!(
            distribution = self.name,
            version = %manifest.version,
            files = manifest.files.len(),
            "Manifest rebuilt"
        );

        let mut cache = self.cache.write().map_err(|_| AgentError::Poisoned)?;
        *cache = Some(Arc::new(Snapshot {
            stamp,
            manifest: manifest.clone(),
        }));
        Ok(manifest)
    }

    /// Bytes of a manifest entry. `None` when the path is not listed.
    ///
    /// Only paths present in the current manifest are ever opened.
    pub fn read_file(&self, requested: &str) -> Result<Option<Vec<u8>>, AgentError> {
        let Some(path) = normalize_request_path(requested) else {
            debug!(distribution = self.name, "Rejected unsafe file path");
            return Ok(None);
        };

        let manifest = self.manifest()?;
        if manifest.entry(&path).is_none() {
            return Ok(None);
        }

        match fs::read(self.root.join(&path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(AgentError::Io { path, source }),
        }
    }
}
