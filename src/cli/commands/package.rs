//! Package command implementation.

use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::project::{ProjectRoot, RootOrigin};
use crate::version::ReleaseVersion;
use crate::{PackageConfig, packager};

/// Execute a packaging run
pub(super) async fn execute_package(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let version = ReleaseVersion::parse(&args.version)?;
    let root = resolve_root(args, config)?;

    let package_config = PackageConfig {
        lock_timeout: args.lock_timeout(),
        ..PackageConfig::new(root.path())
    };

    config.progress_println(&format!("Packaging codeformer_v{version}..."));
    let report = packager::package(&package_config, &version).await?;

    config.success_println(&format!(
        "Release artifact: {}",
        report.release_archive.display()
    ));
    config.indent(&format!(
        "{} sources, {} archive entries, {} bytes",
        report.sources_staged, report.archive_entries, report.archive_size_bytes
    ));
    config.indent(&format!("Staged copy kept at {}", report.staging_dir.display()));

    Ok(())
}

/// Resolve the project root and say where it came from
pub(super) fn resolve_root(args: &Args, config: &RuntimeConfig) -> Result<ProjectRoot> {
    let root = ProjectRoot::resolve(args.project_root.as_deref())?;
    let origin = match root.origin() {
        RootOrigin::Explicit => "from --project-root",
        RootOrigin::Executable => "found above executable",
    };
    config.println(&format!("📁 Project root: {} ({origin})", root.path().display()));
    Ok(root)
}
