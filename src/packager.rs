//! The packaging run: stage, archive, release.

use crate::archive::{self, PendingArchive};
use crate::error::Result;
use crate::layout::ReleaseLayout;
use crate::lock::PackageLock;
use crate::manifest::SourceEntry;
use crate::staging::{self, VersionedStaging};
use crate::utils::fs;
use crate::version::ReleaseVersion;
use crate::{PackageConfig, PackageReport};

/// What a run would do, computed without touching the filesystem
#[derive(Debug, Clone)]
pub struct PackagePlan {
    /// Paths the run reads and writes
    pub layout: ReleaseLayout,
    /// Resolved sources, in copy order
    pub sources: Vec<SourceEntry>,
}

/// Resolve the layout and every source for `version`.
///
/// Fails on the first missing source; nothing is mutated.
pub fn plan(config: &PackageConfig, version: &ReleaseVersion) -> Result<PackagePlan> {
    let layout = ReleaseLayout::new(&config.project_root, version);
    let sources = config.manifest.resolve(&layout.root)?;
    Ok(PackagePlan { layout, sources })
}

/// Package `version`: stage the manifest into `output/`, archive it as
/// `codeformer_v<version>.zip` and move the archive into `release/`.
///
/// The run is all-or-nothing with respect to `release/`: any failure leaves the
/// previous content of `release/` untouched and removes the partial archive.
pub async fn package(config: &PackageConfig, version: &ReleaseVersion) -> Result<PackageReport> {
    let layout = ReleaseLayout::new(&config.project_root, version);
    let _lock = PackageLock::acquire(&layout.lock_file, config.lock_timeout).await?;

    let PackagePlan { layout, sources } = plan(config, version)?;
    log::info!(
        "Packaging {} from {} ({} sources)",
        layout.artifact_name(),
        layout.root.display(),
        sources.len()
    );

    staging::reset(&layout.staging_dir).await?;
    let staged = staging::populate(&layout.staging_dir, &sources).await?;

    let pending = PendingArchive::new(&layout.root_archive);
    let versioned = VersionedStaging::enter(&layout.staging_dir, &layout.versioned_dir).await?;
    let summary = archive::write_zip(versioned.path(), pending.path(), layout.artifact_name()).await?;
    let staging_dir = versioned.restore().await?;

    fs::create_dir_all(&layout.release_dir).await?;
    fs::move_file(pending.path(), &layout.release_archive).await?;
    pending.disarm();

    log::info!(
        "Released {} ({} entries, {} bytes)",
        layout.release_archive.display(),
        summary.entries,
        summary.size_bytes
    );

    Ok(PackageReport {
        version: version.clone(),
        release_archive: layout.release_archive,
        staging_dir,
        sources_staged: staged.sources,
        archive_entries: summary.entries,
        archive_size_bytes: summary.size_bytes,
    })
}

