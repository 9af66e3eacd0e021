//! Pack lifecycle orchestration.
//!
//! [`PackLifecycleManager`] owns the in-memory index of packs, drives
//! reload/install/update/delete, serialises operations per pack name and
//! notifies listeners of every state change. Disk is the source of truth:
//! [`PackLifecycleManager::reload`] can always rebuild the index.

mod auto_update;
mod events;
mod guard;
pub mod state;

pub use auto_update::{AutoUpdateHandle, AutoUpdateSettings};
pub use state::{Operation, PackEvent, PackState, PackStatus};

use crate::core::path::{
    ensure_dir, is_hidden, is_valid_pack_name, pack_config_file, pack_dir, packs_dir, temp_dir,
};
use crate::core::{ManagerError, ManagerErrorKind, StickerError, StickerResult};
use crate::di::HubProvider;
use crate::package::checksum::checksums_match;
use crate::package::config::{PackConfig, PackConfigStore};
use crate::package::hub::{HubPackInfo, HubPackReference};
use crate::package::manifest::PackManifest;
use crate::package::pack::Pack;
use crate::package::rollback::recover_orphans;
use crate::package::updater::PackUpdater;
use events::Listeners;
use guard::InFlight;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of an update (or install-or-update) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The pack was not installed before.
    Installed { version: String },
    /// A new payload replaced the installed one.
    Updated { from: String, to: String },
    /// Nothing to do; the installed payload matches the hub.
    UpToDate { version: String },
}

/// Result of a dry-run update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    Available { from: String, to: String },
    UpToDate { version: String },
}

/// What a reload found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct PackEntry {
    manifest: Option<PackManifest>,
    status: PackStatus,
}

/// Orchestrates the lifecycle of every pack under one base directory.
pub struct PackLifecycleManager {
    base_dir: PathBuf,
    hub: Arc<dyn HubProvider>,
    updater: PackUpdater,
    index: RwLock<HashMap<String, PackEntry>>,
    /// Bumped on every index write for a name; only touched while the
    /// index write lock is held.
    generations: Mutex<HashMap<String, u64>>,
    configs: RwLock<PackConfigStore>,
    listeners: Listeners,
    in_flight: InFlight,
    reload_lock: tokio::sync::Mutex<()>,
    shutdown: CancellationToken,
    auto_update: Mutex<Option<AutoUpdateHandle>>,
}

impl PackLifecycleManager {
    /// Create a manager over `base_dir`.
    ///
    /// Creates the directory layout, finishes any swap a crash interrupted,
    /// clears the staging area and loads the pack config store. The index
    /// stays empty until [`reload`](Self::reload).
    pub fn new(
        base_dir: impl Into<PathBuf>,
        hub: Arc<dyn HubProvider>,
        updater: PackUpdater,
    ) -> StickerResult<Self> {
        let base_dir = base_dir.into();
        let packs = packs_dir(&base_dir);
        ensure_dir(&packs)?;

        for name in recover_orphans(&packs)? {
            info!(pack = %name, "Recovered pack from interrupted install");
        }
        let staging = temp_dir(&base_dir);
        if staging.exists() {
            if let Err(e) = fs::remove_dir_all(&staging) {
                warn!(path = %staging.display(), error = %e, "Failed to clear staging area");
            }
        }

        let configs = PackConfigStore::load(&pack_config_file(&base_dir))?;

        Ok(Self {
            base_dir,
            hub,
            updater,
            index: RwLock::new(HashMap::new()),
            generations: Mutex::new(HashMap::new()),
            configs: RwLock::new(configs),
            listeners: Listeners::default(),
            in_flight: InFlight::default(),
            reload_lock: tokio::sync::Mutex::new(()),
            shutdown: CancellationToken::new(),
            auto_update: Mutex::new(None),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Register a state change listener. Listeners run synchronously, in
    /// registration order, on the task that changed the state.
    pub fn on_pack_state_change<F>(&self, listener: F)
    where
        F: Fn(&PackEvent) + Send + Sync + 'static,
    {
        self.listeners.register(listener);
    }

    // ----- readers -------------------------------------------------------

    /// Names of every pack in the index, including failed ones, sorted.
    pub fn list_packs(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_index().keys().cloned().collect();
        names.sort();
        names
    }

    /// Manifests of all valid packs, sorted by name.
    pub fn list_manifests(&self) -> Vec<PackManifest> {
        let mut manifests: Vec<PackManifest> = self
            .read_index()
            .values()
            .filter_map(|e| e.manifest.clone())
            .collect();
        manifests.sort_by(|a, b| a.name.cmp(&b.name));
        manifests
    }

    pub fn get_manifest(&self, name: &str) -> Option<PackManifest> {
        self.read_index().get(name).and_then(|e| e.manifest.clone())
    }

    pub fn pack_state(&self, name: &str) -> Option<PackState> {
        self.read_index().get(name).map(|e| e.status.state())
    }

    /// Error of the last failed operation, while the pack is in `Error`.
    pub fn pack_error(&self, name: &str) -> Option<String> {
        self.read_index()
            .get(name)
            .and_then(|e| e.status.error().map(str::to_string))
    }

    /// Whether an install/update/delete is running for `name`.
    pub fn is_busy(&self, name: &str) -> bool {
        self.in_flight.contains(name)
    }

    pub fn get_config(&self, name: &str) -> Option<PackConfig> {
        self.read_configs().get(name).cloned()
    }

    /// Packs without a config entry count as enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.read_configs().is_enabled(name)
    }

    /// Set a pack's enabled flag and persist the config store.
    pub fn set_pack_enabled(&self, name: &str, enabled: bool) -> StickerResult<()> {
        let manifest = self
            .get_manifest(name)
            .ok_or_else(|| ManagerError::not_found(name))?;

        let mut configs = self.write_configs();
        let mut config = configs
            .get(name)
            .cloned()
            .unwrap_or_else(|| PackConfig::from_manifest(&manifest));
        config.enabled = enabled;
        configs.insert(config);
        configs.save()?;

        info!(pack = %name, enabled, "Updated pack config");
        Ok(())
    }

    // ----- hub -----------------------------------------------------------

    /// The hub catalog, cached unless `force_refresh`.
    pub async fn fetch_hub_packs(&self, force_refresh: bool) -> StickerResult<Vec<HubPackInfo>> {
        self.hub.fetch_packs(force_refresh).await
    }

    /// The GitHub-backed hub index. Never cached.
    pub async fn fetch_hub_index(&self) -> StickerResult<Vec<HubPackReference>> {
        self.hub.fetch_hub_index().await
    }

    /// Whether `update_pack(name, force)` would download a new payload.
    ///
    /// Read-only: takes no operation slot and emits no events. Fails with
    /// `NotFound` for packs that are not installed and propagates hub
    /// errors, including a pack missing from the catalog.
    pub async fn check_update(&self, name: &str, force: bool) -> StickerResult<UpdateCheck> {
        validate_name(name)?;
        self.check_cancelled(name)?;

        let current = self
            .get_manifest(name)
            .ok_or_else(|| ManagerError::not_found(name))?;
        let info = self
            .cancellable(name, self.hub.fetch_pack_info(name, false))
            .await?;

        if update_needed(&current, &info, force) {
            Ok(UpdateCheck::Available {
                from: current.version,
                to: info.version,
            })
        } else {
            Ok(UpdateCheck::UpToDate {
                version: current.version,
            })
        }
    }

    // ----- reload --------------------------------------------------------

    /// Rescan `<base>/packs` and rebuild the index.
    ///
    /// Reloads are serialised. Each pack emits `Loading` then `Loaded` or
    /// `Error`; a broken pack never fails the reload. Packs with an
    /// operation in flight, or touched by one while the scan ran, keep
    /// their current entry and config.
    pub async fn reload(&self) -> StickerResult<ReloadReport> {
        let _serial = self.reload_lock.lock().await;
        self.check_cancelled("*")?;

        let before = self.lock_generations().clone();
        let base_dir = self.base_dir.clone();
        let (scanned, configs) = tokio::task::spawn_blocking(move || {
            let scanned = scan_packs(&packs_dir(&base_dir))?;
            let configs = PackConfigStore::load(&pack_config_file(&base_dir));
            Ok::<_, StickerError>((scanned, configs))
        })
        .await
        .map_err(join_error)??;
        self.check_cancelled("*")?;

        // Anything written to the index since `before` is newer than the scan.
        // Both stores are merged under their write locks, configs first.
        let (report, events) = {
            let mut current_configs = self.write_configs();
            let mut index = self.write_index();
            let generations = self.lock_generations();
            let changed: HashSet<String> = generations
                .iter()
                .filter(|(name, generation)| before.get(*name) != Some(*generation))
                .map(|(name, _)| name.clone())
                .chain(self.in_flight.snapshot())
                .collect();

            match configs {
                Ok(mut loaded) => {
                    for name in &changed {
                        match current_configs.get(name) {
                            Some(config) => loaded.insert(config.clone()),
                            None => {
                                loaded.remove(name);
                            }
                        }
                    }
                    *current_configs = loaded;
                }
                Err(e) => warn!(error = %e, "Keeping previous pack config, reload failed"),
            }

            merge_scan(&mut index, scanned, |name| changed.contains(name))
        };

        for event in &events {
            self.listeners.emit(event);
        }

        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "Reloaded packs"
        );
        Ok(report)
    }

    // ----- install / update ---------------------------------------------

    /// Install a pack that is not installed yet.
    pub async fn install_pack(&self, hub_info: &HubPackInfo) -> StickerResult<PackManifest> {
        let name = hub_info.name.as_str();
        validate_name(name)?;
        let _guard = self.in_flight.try_acquire(name)?;
        self.check_cancelled(name)?;

        if self.get_manifest(name).is_some() || pack_dir(&self.base_dir, name).exists() {
            return Err(ManagerError::new(
                ManagerErrorKind::AlreadyExists,
                format!("pack '{}' is already installed", name),
            )
            .into());
        }

        self.install_locked(hub_info).await
    }

    /// Install a pack listed in the hub index by its slug.
    ///
    /// The slug becomes the pack name. Its catalog entry is built from the
    /// `metadata.json` in the pack's GitHub source directory.
    pub async fn install_from_hub(&self, slug: &str) -> StickerResult<PackManifest> {
        validate_name(slug)?;
        self.check_cancelled(slug)?;

        let index = self.cancellable(slug, self.hub.fetch_hub_index()).await?;
        let reference = index
            .into_iter()
            .find(|r| r.slug == slug)
            .ok_or_else(|| {
                ManagerError::new(
                    ManagerErrorKind::NotFound,
                    format!("pack '{}' is not in the hub index", slug),
                )
            })?;
        let info = self
            .cancellable(slug, self.hub.resolve_reference(&reference))
            .await?;
        debug!(pack = %slug, url = %info.url, "Resolved hub index entry");

        self.install_pack(&info).await
    }

    /// Install the pack if missing, otherwise update it from `hub_info`.
    pub async fn install_or_update(
        &self,
        hub_info: &HubPackInfo,
        force: bool,
    ) -> StickerResult<UpdateOutcome> {
        let name = hub_info.name.as_str();
        validate_name(name)?;
        let _guard = self.in_flight.try_acquire(name)?;
        self.check_cancelled(name)?;

        match self.get_manifest(name) {
            Some(current) => {
                self.update_locked(name, current, Some(hub_info.clone()), force)
                    .await
            }
            None => {
                let manifest = self.install_locked(hub_info).await?;
                Ok(UpdateOutcome::Installed {
                    version: manifest.version,
                })
            }
        }
    }

    /// Update an installed pack to the hub's current payload.
    ///
    /// Updates when the versions differ, when both sides publish a checksum
    /// and they differ, or when `force` is set. Otherwise the pack ends in
    /// `Updated` with [`UpdateOutcome::UpToDate`]. The pack config is left
    /// untouched.
    pub async fn update_pack(&self, name: &str, force: bool) -> StickerResult<UpdateOutcome> {
        validate_name(name)?;
        let _guard = self.in_flight.try_acquire(name)?;
        self.check_cancelled(name)?;

        let current = self
            .get_manifest(name)
            .ok_or_else(|| ManagerError::not_found(name))?;
        self.update_locked(name, current, None, force).await
    }

    /// Update every enabled pack in turn. Failures are collected, not
    /// returned early.
    pub async fn update_all(&self, force: bool) -> Vec<(String, StickerResult<UpdateOutcome>)> {
        let names: Vec<String> = self
            .list_manifests()
            .into_iter()
            .map(|m| m.name)
            .filter(|name| self.is_enabled(name))
            .collect();

        let mut results = Vec::with_capacity(names.len());
        for name in names {
            let result = self.update_pack(&name, force).await;
            results.push((name, result));
        }
        results
    }

    async fn install_locked(&self, hub_info: &HubPackInfo) -> StickerResult<PackManifest> {
        let name = hub_info.name.as_str();
        self.set_status(name, PackStatus::begin(Operation::Install), None);

        match self.apply_archive(hub_info, None).await {
            Ok(manifest) => {
                self.ensure_config(&manifest);
                let status = PackStatus::begin(Operation::Install).succeed();
                self.set_status(name, status, Some(manifest.clone()));
                info!(pack = %name, version = %manifest.version, "Pack installed");
                Ok(manifest)
            }
            Err(e) => {
                self.set_status(name, PackStatus::begin(Operation::Install).fail(e.to_string()), None);
                Err(e)
            }
        }
    }

    async fn update_locked(
        &self,
        name: &str,
        current: PackManifest,
        hub_info: Option<HubPackInfo>,
        force: bool,
    ) -> StickerResult<UpdateOutcome> {
        self.set_status(name, PackStatus::begin(Operation::Update), None);

        match self.run_update(name, &current, hub_info, force).await {
            Ok((outcome, manifest)) => {
                let status = PackStatus::begin(Operation::Update).succeed();
                self.set_status(name, status, manifest);
                Ok(outcome)
            }
            Err(e) => {
                self.set_status(name, PackStatus::begin(Operation::Update).fail(e.to_string()), None);
                Err(e)
            }
        }
    }

    async fn run_update(
        &self,
        name: &str,
        current: &PackManifest,
        hub_info: Option<HubPackInfo>,
        force: bool,
    ) -> StickerResult<(UpdateOutcome, Option<PackManifest>)> {
        let info = match hub_info {
            Some(info) => info,
            None => {
                self.cancellable(name, self.hub.fetch_pack_info(name, false))
                    .await?
            }
        };
        self.check_cancelled(name)?;

        if !update_needed(current, &info, force) {
            debug!(pack = %name, version = %current.version, "Pack is up to date");
            return Ok((
                UpdateOutcome::UpToDate {
                    version: current.version.clone(),
                },
                None,
            ));
        }

        let manifest = self.apply_archive(&info, Some(current)).await?;
        info!(pack = %name, from = %current.version, to = %manifest.version, "Pack updated");
        Ok((
            UpdateOutcome::Updated {
                from: current.version.clone(),
                to: manifest.version.clone(),
            },
            Some(manifest),
        ))
    }

    /// Download, verify, extract, stage and swap in a hub payload, then
    /// re-read the installed pack.
    async fn apply_archive(
        &self,
        info: &HubPackInfo,
        previous: Option<&PackManifest>,
    ) -> StickerResult<PackManifest> {
        let name = info.name.clone();
        let staging_root = temp_dir(&self.base_dir);
        tokio::fs::create_dir_all(&staging_root).await?;
        let work = tempfile::Builder::new()
            .prefix(&format!("{}-", name))
            .tempdir_in(&staging_root)?;

        let archive = work.path().join("archive.zip");
        let bytes = self
            .cancellable(&name, self.hub.download_pack(&info.url, &archive))
            .await?;
        debug!(pack = %name, bytes, "Downloaded archive");
        self.check_cancelled(&name)?;

        let updater = self.updater;
        let info = info.clone();
        let previous = previous.cloned();
        let install_dir = pack_dir(&self.base_dir, &name);
        let token = self.shutdown.clone();

        // `work` moves into the closure and is dropped with it, removing the
        // archive and any staging leftovers
        tokio::task::spawn_blocking(move || {
            let checksum = match &info.checksum {
                Some(expected) => {
                    updater.verify_checksum(&archive, expected)?;
                    expected.clone()
                }
                None => updater.checksum(&archive)?,
            };

            let staged = updater.extract_pack(&archive, &work.path().join("staging"))?;
            updater.stage_manifest(&staged, &info, Some(&checksum), previous.as_ref())?;
            updater.install_pack(&staged, &install_dir, || {
                if token.is_cancelled() {
                    Err(ManagerError::cancelled(&info.name).into())
                } else {
                    Ok(())
                }
            })?;

            Pack::new(&install_dir).load()
        })
        .await
        .map_err(join_error)?
    }

    // ----- delete --------------------------------------------------------

    /// Remove a pack from disk, the index and the config store.
    ///
    /// When the pack directory is gone but its tombstone could not be fully
    /// deleted, the pack is still dropped; the `Deleted` event carries the
    /// error and the error is returned.
    pub async fn delete_pack(&self, name: &str) -> StickerResult<()> {
        validate_name(name)?;
        let _guard = self.in_flight.try_acquire(name)?;
        self.check_cancelled(name)?;

        let install_dir = pack_dir(&self.base_dir, name);
        let known = self.read_index().contains_key(name);
        if !known && !install_dir.exists() {
            return Err(ManagerError::not_found(name).into());
        }

        self.set_status(name, PackStatus::begin(Operation::Delete), None);

        let updater = self.updater;
        let dir = install_dir.clone();
        let result = tokio::task::spawn_blocking(move || updater.remove_pack(&dir))
            .await
            .map_err(join_error)
            .and_then(|r| r);

        if let Err(e) = &result {
            if install_dir.exists() {
                let status = PackStatus::begin(Operation::Delete).fail(e.to_string());
                self.set_status(name, status, None);
                return result;
            }
        }

        {
            let mut index = self.write_index();
            index.remove(name);
            self.bump_generation(name);
        }
        self.remove_config(name);

        let error = result.as_ref().err().map(|e| e.to_string());
        self.listeners.emit(&PackEvent {
            pack_name: name.to_string(),
            state: PackState::Deleted,
            error,
        });
        info!(pack = %name, "Pack deleted");
        result
    }

    // ----- background ----------------------------------------------------

    /// Cancel background work and in-flight operations, then wait for the
    /// auto-update task to finish. Operations past their final rename run
    /// to completion; later calls fail with `Cancelled`.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let handle = self
            .auto_update
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.join().await;
        }
        info!("Pack manager shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// One background pass: reload, then optionally update every enabled
    /// pack.
    pub(crate) async fn run_update_pass(&self, update_packs: bool, force: bool) {
        if let Err(e) = self.reload().await {
            warn!(error = %e, "Background reload failed");
        }
        if !update_packs {
            return;
        }

        let results = self.update_all(force).await;
        let mut updated = 0;
        for (name, result) in &results {
            match result {
                Ok(UpdateOutcome::Updated { .. }) | Ok(UpdateOutcome::Installed { .. }) => {
                    updated += 1
                }
                Ok(UpdateOutcome::UpToDate { .. }) => {}
                Err(e) => warn!(pack = %name, error = %e, "Background update failed"),
            }
        }
        info!(checked = results.len(), updated, "Background update pass finished");
    }

    // ----- internals -----------------------------------------------------

    fn check_cancelled(&self, name: &str) -> StickerResult<()> {
        if self.shutdown.is_cancelled() {
            return Err(ManagerError::cancelled(name).into());
        }
        Ok(())
    }

    /// Run a hub request, abandoning it as soon as shutdown starts.
    async fn cancellable<T>(
        &self,
        name: &str,
        request: impl Future<Output = StickerResult<T>>,
    ) -> StickerResult<T> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(ManagerError::cancelled(name).into()),
            result = request => result,
        }
    }

    /// Store a new status (and manifest, when given) then notify listeners.
    fn set_status(&self, name: &str, status: PackStatus, manifest: Option<PackManifest>) {
        let event = PackEvent::from_status(name, &status);
        {
            let mut index = self.write_index();
            let entry = index.entry(name.to_string()).or_insert_with(|| PackEntry {
                manifest: None,
                status: status.clone(),
            });
            entry.status = status;
            if manifest.is_some() {
                entry.manifest = manifest;
            }
            self.bump_generation(name);
        }
        self.listeners.emit(&event);
    }

    /// Caller holds the index write lock.
    fn bump_generation(&self, name: &str) {
        *self.lock_generations().entry(name.to_string()).or_default() += 1;
    }

    fn lock_generations(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.generations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a default config entry for a new pack. Best-effort: the pack
    /// is already installed and packs without an entry count as enabled.
    fn ensure_config(&self, manifest: &PackManifest) {
        let mut configs = self.write_configs();
        if configs.contains(&manifest.name) {
            return;
        }
        configs.insert(PackConfig::from_manifest(manifest));
        if let Err(e) = configs.save() {
            warn!(pack = %manifest.name, error = %e, "Failed to save pack config");
        }
    }

    /// Drop a deleted pack's config entry. Best-effort, like `ensure_config`.
    fn remove_config(&self, name: &str) {
        let mut configs = self.write_configs();
        if configs.remove(name).is_some() {
            if let Err(e) = configs.save() {
                warn!(pack = %name, error = %e, "Failed to save pack config");
            }
        }
    }

    fn read_index(&self) -> RwLockReadGuard<'_, HashMap<String, PackEntry>> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_index(&self) -> RwLockWriteGuard<'_, HashMap<String, PackEntry>> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_configs(&self) -> RwLockReadGuard<'_, PackConfigStore> {
        self.configs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_configs(&self) -> RwLockWriteGuard<'_, PackConfigStore> {
        self.configs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether `remote` should replace the installed `local` payload.
pub fn update_needed(local: &PackManifest, remote: &HubPackInfo, force: bool) -> bool {
    if force || local.version != remote.version {
        return true;
    }
    match (&local.checksum, &remote.checksum) {
        (Some(ours), Some(theirs)) => !checksums_match(ours, theirs),
        _ => false,
    }
}

fn validate_name(name: &str) -> StickerResult<()> {
    if is_valid_pack_name(name) {
        Ok(())
    } else {
        Err(ManagerError::new(
            ManagerErrorKind::InvalidName,
            format!("'{}' is not a valid pack name", name),
        )
        .into())
    }
}

/// Replace `index` with the scan results, except for names where
/// `changed` holds: those keep their current entry, or stay absent.
/// Returns the report and the events for the adopted names.
fn merge_scan(
    index: &mut HashMap<String, PackEntry>,
    scanned: Vec<(String, StickerResult<PackManifest>)>,
    changed: impl Fn(&str) -> bool,
) -> (ReloadReport, Vec<PackEvent>) {
    let mut report = ReloadReport::default();
    let mut events = Vec::with_capacity(scanned.len() * 2);
    let mut entries: HashMap<String, PackEntry> =
        index.drain().filter(|(name, _)| changed(name)).collect();

    for (name, result) in scanned {
        if changed(&name) {
            continue;
        }
        let loading = PackStatus::begin(Operation::Load);
        events.push(PackEvent::from_status(&name, &loading));

        let entry = match result {
            Ok(manifest) => {
                report.loaded.push(name.clone());
                PackEntry {
                    manifest: Some(manifest),
                    status: loading.succeed(),
                }
            }
            Err(e) => {
                warn!(pack = %name, error = %e, "Failed to load pack");
                report.failed.push((name.clone(), e.to_string()));
                PackEntry {
                    manifest: None,
                    status: loading.fail(e.to_string()),
                }
            }
        };
        events.push(PackEvent::from_status(&name, &entry.status));
        entries.insert(name, entry);
    }

    *index = entries;
    (report, events)
}

/// Load every visible pack directory, sorted by name.
fn scan_packs(packs: &Path) -> StickerResult<Vec<(String, StickerResult<PackManifest>)>> {
    ensure_dir(packs)?;

    let mut found = Vec::new();
    for entry in fs::read_dir(packs)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry in packs directory");
                continue;
            }
        };
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %entry.path().display(), "Skipping non UTF-8 pack directory");
            continue;
        };
        if is_hidden(&name) || !entry.path().is_dir() {
            continue;
        }
        found.push((name, Pack::new(entry.path()).load()));
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found)
}

fn join_error(e: tokio::task::JoinError) -> StickerError {
    StickerError::Io(std::io::Error::other(e))
}
