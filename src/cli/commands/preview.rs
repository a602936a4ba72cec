//! Preview command implementation.
//!
//! Shows what a packaging run would do without touching the filesystem.

use super::package::resolve_root;
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::manifest::SourceKind;
use crate::version::ReleaseVersion;
use crate::{PackageConfig, packager};

/// Execute preview (`--dry-run`)
pub(super) async fn execute_preview(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let version = ReleaseVersion::parse(&args.version)?;
    let root = resolve_root(args, config)?;
    let plan = packager::plan(&PackageConfig::new(root.path()), &version)?;

    let _ = config.output().section(&format!("Dry run: {}", plan.layout.artifact_name()));

    config.println(&format!("Sources ({}):", plan.sources.len()));
    for source in &plan.sources {
        let suffix = match source.kind {
            SourceKind::Directory => "/",
            SourceKind::File => "",
        };
        config.indent(&format!("• {}{}", source.name, suffix));
    }

    config.println(&format!("Staging:  {}", plan.layout.staging_dir.display()));
    config.println(&format!("Archive:  {}", plan.layout.root_archive.display()));
    config.println(&format!("Release:  {}", plan.layout.release_archive.display()));

    if plan.layout.release_archive.exists() {
        config.warning_println("An artifact with this version already exists and would be replaced");
    }

    config.success_println("Dry run complete, nothing was changed");
    Ok(())
}
