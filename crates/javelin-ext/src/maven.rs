//! Maven procurer: repository layout, artifact cache, POM-driven child
//! dependency reads, and jar procurement with checksum verification.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use javelin_core::{
    CoordId, CoordSpec, DepsMap, Lib, ManifestInfo, ManifestKind, MavenCoord, RepositoryEntry,
};
use javelin_util::errors::{JavelinError, JavelinResult};

use crate::pom::{parse_pom, Pom};
use crate::version::MavenVersion;
use crate::Procurer;

/// Maven Central base URL, always consulted last when not configured.
pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2";

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_PARENT_DEPTH: usize = 10;

/// A configured Maven repository with optional credentials.
#[derive(Debug, Clone)]
pub struct Repo {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Repo {
    pub fn from_entry(name: &str, entry: &RepositoryEntry) -> Self {
        match entry {
            RepositoryEntry::Url(url) => Self {
                name: name.to_string(),
                url: url.trim_end_matches('/').to_string(),
                username: None,
                password: None,
            },
            RepositoryEntry::Detailed {
                url,
                username,
                password,
            } => Self {
                name: name.to_string(),
                url: url.trim_end_matches('/').to_string(),
                username: username.clone(),
                password: password.clone(),
            },
        }
    }

    pub fn central() -> Self {
        Self {
            name: "central".to_string(),
            url: MAVEN_CENTRAL_URL.to_string(),
            username: None,
            password: None,
        }
    }

    /// Standard Maven layout path for a coordinate:
    /// `org.clojure:clojure:1.12.0` becomes `org/clojure/clojure/1.12.0`.
    pub fn coordinate_path(group: &str, artifact: &str, version: &str) -> String {
        format!("{}/{}/{}", group.replace('.', "/"), artifact, version)
    }

    /// Full URL to a file within this repository.
    pub fn file_url(&self, group: &str, artifact: &str, version: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.url,
            Self::coordinate_path(group, artifact, version),
            filename
        )
    }
}

/// The repositories to consult, from the deps map's `mvn-repos` plus Central.
pub fn repos_from_config(config: &DepsMap) -> Vec<Repo> {
    let mut repos: Vec<Repo> = config
        .mvn_repos
        .iter()
        .map(|(name, entry)| Repo::from_entry(name, entry))
        .collect();
    if !repos.iter().any(|r| r.url.contains("repo.maven.apache.org")) {
        repos.push(Repo::central());
    }
    repos
}

/// Procurer for `mvn` coordinates.
///
/// Holds per-call state: the HTTP client and a POM memoization table. The
/// registry is rebuilt per resolve call, so this doubles as the call's
/// session cache.
pub struct MavenProcurer {
    cache_root: PathBuf,
    client: Mutex<Option<reqwest::blocking::Client>>,
    poms: Mutex<HashMap<String, Pom>>,
}

impl MavenProcurer {
    /// Create a procurer caching artifacts under `cache_root` in standard
    /// repository layout.
    pub fn new(cache_root: PathBuf) -> Self {
        Self {
            cache_root,
            client: Mutex::new(None),
            poms: Mutex::new(HashMap::new()),
        }
    }

    fn version_of<'c>(&self, lib: &Lib, coord: &'c CoordSpec) -> JavelinResult<&'c str> {
        let version = match coord {
            CoordSpec::Version(v) => v.as_str(),
            CoordSpec::Maven(m) => m.version.as_str(),
            _ => {
                return Err(JavelinError::Input {
                    message: format!("maven procurer got a non-maven coordinate for {lib}"),
                }
                .into())
            }
        };
        if version.is_empty() {
            return Err(JavelinError::resolution(
                lib.to_string(),
                "maven coordinate has no version",
            )
            .into());
        }
        Ok(version)
    }

    fn client(&self) -> JavelinResult<reqwest::blocking::Client> {
        let mut guard = self.client.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_none() {
            let client = reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .user_agent("javelin/0.3")
                .build()
                .map_err(|e| JavelinError::Network {
                    message: format!("failed to create HTTP client: {e}"),
                })?;
            *guard = Some(client);
        }
        Ok(guard.clone().ok_or_else(|| JavelinError::Network {
            message: "HTTP client unavailable".to_string(),
        })?)
    }

    fn artifact_dir(&self, group: &str, artifact: &str, version: &str) -> PathBuf {
        self.cache_root
            .join(group.replace('.', "/"))
            .join(artifact)
            .join(version)
    }

    /// Return the cached path of an artifact file, downloading it from the
    /// first repository that has it when missing.
    fn ensure_artifact(
        &self,
        config: &DepsMap,
        lib: &Lib,
        group: &str,
        artifact: &str,
        version: &str,
        filename: &str,
    ) -> JavelinResult<PathBuf> {
        let path = self.artifact_dir(group, artifact, version).join(filename);
        if path.is_file() {
            return Ok(path);
        }

        let client = self.client()?;
        for repo in repos_from_config(config) {
            let url = repo.file_url(group, artifact, version, filename);
            if let Some(data) = download_bytes(&client, &repo, &url)? {
                verify_checksum(&client, &repo, &url, &data)?;
                javelin_util::fs::ensure_dir(
                    path.parent().unwrap_or(Path::new(".")),
                )
                .map_err(JavelinError::from)?;
                std::fs::write(&path, &data).map_err(JavelinError::from)?;
                tracing::debug!("downloaded {url}");
                return Ok(path);
            }
        }

        Err(JavelinError::Resolution {
            lib: lib.to_string(),
            coord: Some(version.to_string()),
            message: format!("{filename} not found in any configured repository"),
        }
        .into())
    }

    /// The effective POM for a coordinate: parsed, parent chain applied, and
    /// properties interpolated.
    fn effective_pom(&self, config: &DepsMap, lib: &Lib, version: &str) -> JavelinResult<Pom> {
        let mut pom = self.raw_pom(config, lib, lib.group(), lib.artifact_base(), version)?;
        let mut depth = 0;
        while let Some(parent_ref) = pom.parent.clone() {
            if depth >= MAX_PARENT_DEPTH {
                tracing::warn!("parent POM chain for {lib} exceeds {MAX_PARENT_DEPTH}, stopping");
                break;
            }
            depth += 1;
            let parent = self.raw_pom(
                config,
                lib,
                &parent_ref.group_id,
                &parent_ref.artifact_id,
                &parent_ref.version,
            )?;
            pom.apply_parent(&parent);
            pom.parent = parent.parent.clone();
        }
        pom.resolve_properties();
        Ok(pom)
    }

    fn raw_pom(
        &self,
        config: &DepsMap,
        lib: &Lib,
        group: &str,
        artifact: &str,
        version: &str,
    ) -> JavelinResult<Pom> {
        let key = format!("{group}:{artifact}:{version}");
        {
            let poms = self.poms.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(pom) = poms.get(&key) {
                return Ok(pom.clone());
            }
        }
        let filename = format!("{artifact}-{version}.pom");
        let path = self.ensure_artifact(config, lib, group, artifact, version, &filename)?;
        let content = std::fs::read_to_string(&path).map_err(JavelinError::from)?;
        let pom = parse_pom(&content)?;
        self.poms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, pom.clone());
        Ok(pom)
    }
}

impl Procurer for MavenProcurer {
    fn canonicalize(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<(Lib, CoordSpec)> {
        let version = self.version_of(lib, coord)?;
        let canonical = match coord {
            CoordSpec::Version(_) => CoordSpec::Maven(MavenCoord {
                version: version.to_string(),
                exclusions: Vec::new(),
            }),
            other => other.clone(),
        };
        Ok((lib.clone(), canonical))
    }

    fn dep_id(&self, lib: &Lib, coord: &CoordSpec, _config: &DepsMap) -> JavelinResult<CoordId> {
        Ok(CoordId(self.version_of(lib, coord)?.to_string()))
    }

    fn manifest_type(
        &self,
        _lib: &Lib,
        _coord: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<ManifestInfo> {
        Ok(ManifestInfo {
            kind: ManifestKind::Pom,
            root: None,
        })
    }

    fn coord_deps(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        manifest: ManifestKind,
        config: &DepsMap,
        _dir: &Path,
    ) -> JavelinResult<Vec<(Lib, CoordSpec)>> {
        if manifest != ManifestKind::Pom {
            return Ok(Vec::new());
        }
        let version = self.version_of(lib, coord)?;
        let pom = self.effective_pom(config, lib, version)?;

        let mut children = Vec::new();
        for dep in &pom.dependencies {
            if dep.optional {
                continue;
            }
            let scope = dep.scope.as_deref().unwrap_or("compile");
            if matches!(scope, "test" | "provided" | "system") {
                continue;
            }

            let child_version = dep
                .version
                .clone()
                .or_else(|| {
                    pom.managed_version(&dep.group_id, &dep.artifact_id)
                        .map(|s| s.to_string())
                })
                .unwrap_or_default();
            // An unmanaged, versionless dependency cannot be selected
            if child_version.is_empty() {
                continue;
            }

            let artifact = match dep.classifier {
                Some(ref c) => format!("{}${c}", dep.artifact_id),
                None => dep.artifact_id.clone(),
            };
            let exclusions = dep
                .exclusions
                .iter()
                .map(|e| {
                    Lib::new(
                        e.group_id.clone(),
                        e.artifact_id.clone().unwrap_or_else(|| "*".to_string()),
                    )
                })
                .collect();

            children.push((
                Lib::new(dep.group_id.clone(), artifact),
                CoordSpec::Maven(MavenCoord {
                    version: child_version,
                    exclusions,
                }),
            ));
        }
        Ok(children)
    }

    fn coord_paths(
        &self,
        lib: &Lib,
        coord: &CoordSpec,
        _manifest: ManifestKind,
        config: &DepsMap,
    ) -> JavelinResult<Vec<PathBuf>> {
        let version = self.version_of(lib, coord)?;
        let artifact = lib.artifact_base();
        let filename = match lib.classifier() {
            Some(c) => format!("{artifact}-{version}-{c}.jar"),
            None => format!("{artifact}-{version}.jar"),
        };
        let jar = self.ensure_artifact(config, lib, lib.group(), artifact, version, &filename)?;
        Ok(vec![jar])
    }

    fn compare_versions(
        &self,
        lib: &Lib,
        a: &CoordSpec,
        b: &CoordSpec,
        _config: &DepsMap,
    ) -> JavelinResult<Ordering> {
        let a = MavenVersion::parse(self.version_of(lib, a)?);
        let b = MavenVersion::parse(self.version_of(lib, b)?);
        Ok(a.cmp(&b))
    }

    fn coord_summary(&self, _lib: &Lib, coord: &CoordSpec) -> String {
        match coord {
            CoordSpec::Version(v) => v.clone(),
            CoordSpec::Maven(m) => m.version.clone(),
            other => format!("{other:?}"),
        }
    }
}

/// Download raw bytes, retrying on timeouts and server errors.
/// Returns `Ok(None)` on 404 (not present in this repository).
fn download_bytes(
    client: &reqwest::blocking::Client,
    repo: &Repo,
    url: &str,
) -> JavelinResult<Option<Vec<u8>>> {
    let mut last_err = String::new();

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            std::thread::sleep(RETRY_DELAY * attempt);
        }

        let mut req = client.get(url);
        if let Some(ref user) = repo.username {
            req = req.basic_auth(user, repo.password.as_deref());
        }

        match req.send() {
            Ok(resp) => {
                let status = resp.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if status.is_server_error() {
                    last_err = format!("HTTP {status} from {url}");
                    continue;
                }
                if !status.is_success() {
                    return Err(JavelinError::Network {
                        message: format!("HTTP {status} fetching {url}"),
                    }
                    .into());
                }
                let bytes = resp.bytes().map_err(|e| JavelinError::Network {
                    message: format!("failed to read response from {url}: {e}"),
                })?;
                return Ok(Some(bytes.to_vec()));
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_err = format!("{e}");
                continue;
            }
            Err(e) => {
                return Err(JavelinError::Network {
                    message: format!("request to {url} failed: {e}"),
                }
                .into());
            }
        }
    }

    Err(JavelinError::Network {
        message: format!("failed after {MAX_RETRIES} retries for {url}: {last_err}"),
    }
    .into())
}

fn download_text(
    client: &reqwest::blocking::Client,
    repo: &Repo,
    url: &str,
) -> JavelinResult<Option<String>> {
    Ok(download_bytes(client, repo, url)?
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

/// Verify downloaded data against checksum sidecar files from the repo.
///
/// Tries SHA-256, then SHA-1, then MD5. Warns when no sidecar exists.
fn verify_checksum(
    client: &reqwest::blocking::Client,
    repo: &Repo,
    file_url: &str,
    data: &[u8],
) -> JavelinResult<()> {
    if let Some(expected) = download_text(client, repo, &format!("{file_url}.sha256"))? {
        return check(&hex_digest::<Sha256>(data), extract_hash(&expected), "SHA-256", file_url);
    }
    if let Some(expected) = download_text(client, repo, &format!("{file_url}.sha1"))? {
        return check(&hex_digest::<Sha1>(data), extract_hash(&expected), "SHA-1", file_url);
    }
    if let Some(expected) = download_text(client, repo, &format!("{file_url}.md5"))? {
        return check(&hex_digest::<Md5>(data), extract_hash(&expected), "MD5", file_url);
    }
    tracing::warn!("no checksum sidecar found for {file_url}");
    Ok(())
}

fn check(actual: &str, expected: &str, algo: &str, url: &str) -> JavelinResult<()> {
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(JavelinError::Network {
            message: format!("{algo} mismatch for {url}: expected {expected}, got {actual}"),
        }
        .into())
    }
}

/// The hex hash from a checksum sidecar, which may be `hash` or
/// `hash  filename`.
fn extract_hash(content: &str) -> &str {
    content.split_whitespace().next().unwrap_or("")
}

fn hex_digest<D: Digest>(data: &[u8]) -> String {
    let mut hasher = D::new();
    hasher.update(data);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
