//! The installable server package and its on-disk lifecycle.

use crate::endpoint::{MarketplaceEndpoint, USER_AGENT};
use crate::error::{InstallError, Result};
use pylance_core::{ExtensionId, ExtensionVersion, PackageName};
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use walkdir::WalkDir;

/// File name the downloaded archive is persisted under, inside the
/// versioned install directory, before being unpacked in place.
pub const VSIX_FILE: &str = "extension.vsix";

/// Install lifecycle state.
///
/// Transitions are monotonic within one process:
/// `Uninitialized → Checking → {Ready | Downloading → {Ready | Error}}`.
/// There is no automatic recovery from `Error`; a fresh process start
/// re-enters `Checking`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    /// No check has run yet.
    Uninitialized,
    /// The on-disk existence check is in progress (or the package was
    /// found missing and no install has started yet).
    Checking,
    /// The download/unpack sequence is running.
    Downloading,
    /// The server binary exists at its resolved path.
    Ready,
    /// The install attempt failed; carries the user-facing message.
    Error(String),
}

/// Static description of one installable server package.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    /// Display name of the installing package; storage subdirectory and
    /// message prefix.
    pub package_name: PackageName,
    /// Vendor-qualified marketplace identifier.
    pub extension_id: ExtensionId,
    /// Version to download.
    pub extension_version: ExtensionVersion,
    /// Path of the server entry point relative to the unpacked archive,
    /// e.g. `extension/dist/server.bundle.js`.
    pub server_binary_path: PathBuf,
    /// Root directory all packages install under.
    pub storage_root: PathBuf,
    /// Directory the bundled resource dirs are copied from, usually the
    /// installing package's own directory.
    pub resource_source: Option<PathBuf>,
    /// Relative directories under `resource_source` that must be visible
    /// to the server, copied into the install directory before the
    /// download begins.
    pub resource_dirs: Vec<String>,
}

impl ResourceSpec {
    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| InstallError::InvalidSpec {
            reason: reason.to_string(),
        };

        if self.package_name.as_str().is_empty() {
            return Err(invalid("package name is empty"));
        }
        if self.extension_version.as_str().is_empty() {
            return Err(invalid("extension version is empty"));
        }
        if self.server_binary_path.as_os_str().is_empty() {
            return Err(invalid("server binary path is empty"));
        }
        if !self
            .server_binary_path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(invalid(
                "server binary path must be relative and stay inside the install directory",
            ));
        }
        Ok(())
    }
}

/// One installable server package: paths, install state, and the
/// download/unpack routine.
///
/// A single instance exists per process, owned by the plugin controller.
/// The existence check is memoized, so double `setup()` from competing
/// host lifecycle hooks can never schedule a second download.
#[derive(Debug)]
pub struct ServerResource {
    spec: ResourceSpec,
    endpoint: MarketplaceEndpoint,
    state: Mutex<InstallState>,
    /// Memoized `needs_installation` answer; the disk is touched at most
    /// once per instance.
    checked: OnceLock<bool>,
}

impl ServerResource {
    /// Creates a resource against the public marketplace.
    ///
    /// # Errors
    ///
    /// [`InstallError::InvalidSpec`] when the specification is unusable.
    pub fn new(spec: ResourceSpec) -> Result<Self> {
        Self::with_endpoint(spec, MarketplaceEndpoint::default())
    }

    /// Creates a resource against a custom gallery endpoint.
    ///
    /// # Errors
    ///
    /// [`InstallError::InvalidSpec`] when the specification is unusable.
    pub fn with_endpoint(spec: ResourceSpec, endpoint: MarketplaceEndpoint) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            spec,
            endpoint,
            state: Mutex::new(InstallState::Uninitialized),
            checked: OnceLock::new(),
        })
    }

    /// Returns the static specification.
    #[must_use]
    pub fn spec(&self) -> &ResourceSpec {
        &self.spec
    }

    /// Returns the package display name.
    #[must_use]
    pub fn package_name(&self) -> &PackageName {
        &self.spec.package_name
    }

    /// Returns `<storage-root>/<package-name>`.
    #[must_use]
    pub fn package_storage(&self) -> PathBuf {
        self.spec
            .storage_root
            .join(self.spec.package_name.as_str())
    }

    /// Returns `<storage-root>/<package-name>/<extension-id>~<version>`.
    #[must_use]
    pub fn server_directory(&self) -> PathBuf {
        self.package_storage().join(format!(
            "{}~{}",
            self.spec.extension_id, self.spec.extension_version
        ))
    }

    /// Returns the absolute path the server entry point resolves to once
    /// the archive is unpacked.
    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        self.server_directory().join(&self.spec.server_binary_path)
    }

    /// Returns the current install state.
    #[must_use]
    pub fn state(&self) -> InstallState {
        self.lock_state().clone()
    }

    /// Returns `true` once the server binary is known to exist.
    #[must_use]
    pub fn ready(&self) -> bool {
        matches!(self.state(), InstallState::Ready)
    }

    /// Returns the install error message, if the install failed.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self.state() {
            InstallState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Returns whether the package still has to be downloaded.
    ///
    /// Idempotent and memoized: the on-disk existence check runs at most
    /// once per instance, and every later call returns the cached answer
    /// without touching the file system. Finding the binary already in
    /// place transitions straight to [`InstallState::Ready`].
    pub fn needs_installation(&self) -> bool {
        *self.checked.get_or_init(|| {
            self.set_state(InstallState::Checking);
            let installed = self.binary_path().is_file();
            if installed {
                tracing::debug!(
                    "{}: server already installed at {}",
                    self.spec.package_name,
                    self.server_directory().display()
                );
                self.set_state(InstallState::Ready);
            }
            !installed
        })
    }

    /// Downloads and unpacks the package, recording the outcome in the
    /// install state.
    ///
    /// Deletes any pre-existing install directory for this exact version
    /// first so the unpack starts clean, and copies the bundled resource
    /// dirs in before the network step so a server that scans its own
    /// directory tree during first boot sees them.
    ///
    /// # Errors
    ///
    /// See [`InstallError`]; the same error is also rendered into
    /// [`InstallState::Error`] with the package-name prefix.
    pub async fn install_or_update(&self) -> Result<()> {
        let result = self.install_inner().await;
        match &result {
            Ok(()) => {
                self.set_state(InstallState::Ready);
                tracing::info!(
                    "{}: server installed in {}",
                    self.spec.package_name,
                    self.server_directory().display()
                );
            }
            Err(error) => {
                let message = format!("{}: {error}", self.spec.package_name);
                tracing::error!("{message}");
                self.set_state(InstallState::Error(message));
            }
        }
        result
    }

    /// Schedules [`Self::install_or_update`] onto the async runtime with
    /// zero delay and returns immediately.
    ///
    /// The spawned task owns a clone of the `Arc`; failures are recorded
    /// in the install state and logged, never propagated.
    pub fn install_in_background(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let resource = Arc::clone(self);
        tokio::spawn(async move {
            // install_or_update already logged and recorded the outcome
            let _ = resource.install_or_update().await;
        })
    }

    /// Deletes the whole package storage tree.
    ///
    /// # Errors
    ///
    /// Propagates file-system errors from the removal.
    pub fn uninstall(&self) -> std::io::Result<()> {
        let storage = self.package_storage();
        if storage.is_dir() {
            fs::remove_dir_all(&storage)?;
            tracing::info!(
                "{}: removed {}",
                self.spec.package_name,
                storage.display()
            );
        }
        Ok(())
    }

    async fn install_inner(&self) -> Result<()> {
        let server_directory = self.server_directory();

        // a clean unpack requires a clean directory
        let _ = fs::remove_dir_all(&server_directory);
        fs::create_dir_all(&server_directory)?;

        self.copy_resource_dirs(&server_directory)?;

        self.set_state(InstallState::Downloading);
        tracing::info!(
            "{}: installing server in {}",
            self.spec.package_name,
            server_directory.display()
        );

        let payload = self.download_package().await?;

        let vsix_path = server_directory.join(VSIX_FILE);
        fs::write(&vsix_path, &payload)?;

        let reader = std::io::Cursor::new(payload);
        zip::ZipArchive::new(reader)?.extract(&server_directory)?;

        let binary_path = self.binary_path();
        if binary_path.is_file() {
            Ok(())
        } else {
            Err(InstallError::Verification { path: binary_path })
        }
    }

    /// Fetches the `.vsix` archive, stripping the gzip transport envelope
    /// when the gallery applies one.
    async fn download_package(&self) -> Result<Vec<u8>> {
        let url = self
            .endpoint
            .download_url(&self.spec.extension_id, &self.spec.extension_version);
        tracing::debug!("{}: GET {url}", self.spec.package_name);

        let response = reqwest::Client::new()
            .get(&url)
            .header(
                reqwest::header::REFERER,
                self.endpoint.item_url(&self.spec.extension_id),
            )
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT_ENCODING, "gzip, deflate")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallError::Http {
                status: status.as_u16(),
            });
        }

        let gzipped = response
            .headers()
            .get(reqwest::header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("gzip"));
        let declared = response.content_length();

        // the transport layer usually rejects a short read on its own;
        // this check covers transports that hand back a truncated body
        let body = response.bytes().await?;
        if let Some(expected) = declared {
            let actual = body.len() as u64;
            if actual < expected {
                return Err(InstallError::Incomplete { expected, actual });
            }
        }

        if gzipped {
            let mut payload = Vec::new();
            flate2::read::GzDecoder::new(body.as_ref()).read_to_end(&mut payload)?;
            Ok(payload)
        } else {
            Ok(body.to_vec())
        }
    }

    /// Copies the bundled resource directories into the install directory.
    ///
    /// Runs before the download so the directories are visible even while
    /// the network step is still pending; not atomic with its success.
    fn copy_resource_dirs(&self, server_directory: &Path) -> Result<()> {
        let Some(source) = &self.spec.resource_source else {
            return Ok(());
        };

        for dir in &self.spec.resource_dirs {
            let src = source.join(dir);
            if !src.is_dir() {
                tracing::warn!(
                    "{}: bundled resource dir missing, skipped: {}",
                    self.spec.package_name,
                    src.display()
                );
                continue;
            }

            let dst = server_directory.join(dir);
            let _ = fs::remove_dir_all(&dst);

            for entry in WalkDir::new(&src) {
                let entry = entry.map_err(std::io::Error::other)?;
                let relative = entry
                    .path()
                    .strip_prefix(&src)
                    .map_err(std::io::Error::other)?;
                let target = dst.join(relative);

                if entry.file_type().is_dir() {
                    fs::create_dir_all(&target)?;
                } else {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::copy(entry.path(), &target)?;
                }
            }
            tracing::debug!(
                "{}: copied resource dir {} into {}",
                self.spec.package_name,
                dir,
                dst.display()
            );
        }
        Ok(())
    }

    fn set_state(&self, state: InstallState) {
        *self.lock_state() = state;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, InstallState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec(storage_root: &Path) -> ResourceSpec {
        ResourceSpec {
            package_name: PackageName::new("LSP-pylance"),
            extension_id: ExtensionId::parse("ms-python.vscode-pylance").unwrap(),
            extension_version: ExtensionVersion::new("2021.1.4"),
            server_binary_path: PathBuf::from("extension/dist/server.bundle.js"),
            storage_root: storage_root.to_path_buf(),
            resource_source: None,
            resource_dirs: vec![],
        }
    }

    #[test]
    fn resolves_versioned_layout() {
        let temp = TempDir::new().unwrap();
        let resource = ServerResource::new(spec(temp.path())).unwrap();

        assert_eq!(
            resource.server_directory(),
            temp.path()
                .join("LSP-pylance")
                .join("ms-python.vscode-pylance~2021.1.4")
        );
        assert_eq!(
            resource.binary_path(),
            resource
                .server_directory()
                .join("extension/dist/server.bundle.js")
        );
    }

    #[test]
    fn rejects_absolute_binary_path() {
        let temp = TempDir::new().unwrap();
        let mut spec = spec(temp.path());
        spec.server_binary_path = PathBuf::from("/etc/passwd");
        assert!(matches!(
            ServerResource::new(spec),
            Err(InstallError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn rejects_parent_traversal_in_binary_path() {
        let temp = TempDir::new().unwrap();
        let mut spec = spec(temp.path());
        spec.server_binary_path = PathBuf::from("../outside.js");
        assert!(matches!(
            ServerResource::new(spec),
            Err(InstallError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn needs_installation_true_for_empty_storage() {
        let temp = TempDir::new().unwrap();
        let resource = ServerResource::new(spec(temp.path())).unwrap();
        assert!(resource.needs_installation());
        assert_eq!(resource.state(), InstallState::Checking);
    }

    #[test]
    fn needs_installation_false_when_binary_present() {
        let temp = TempDir::new().unwrap();
        let resource = ServerResource::new(spec(temp.path())).unwrap();

        let binary = resource.binary_path();
        fs::create_dir_all(binary.parent().unwrap()).unwrap();
        fs::write(&binary, "// bundle").unwrap();

        assert!(!resource.needs_installation());
        assert!(resource.ready());
    }

    #[test]
    fn needs_installation_is_memoized() {
        let temp = TempDir::new().unwrap();
        let resource = ServerResource::new(spec(temp.path())).unwrap();

        assert!(resource.needs_installation());

        // materializing the binary afterwards must not change the answer:
        // the check ran once and is cached for the process lifetime
        let binary = resource.binary_path();
        fs::create_dir_all(binary.parent().unwrap()).unwrap();
        fs::write(&binary, "// bundle").unwrap();

        assert!(resource.needs_installation());
    }

    #[test]
    fn uninstall_removes_package_storage() {
        let temp = TempDir::new().unwrap();
        let resource = ServerResource::new(spec(temp.path())).unwrap();

        let binary = resource.binary_path();
        fs::create_dir_all(binary.parent().unwrap()).unwrap();
        fs::write(&binary, "// bundle").unwrap();

        resource.uninstall().unwrap();
        assert!(!resource.package_storage().exists());
    }
}
