//! Command line argument parsing and validation.
//!
//! One positional version string; everything else has a default.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Package the CodeFormer tree into a versioned release archive
#[derive(Parser, Debug)]
#[command(
    name = "codeformer_release",
    version,
    about = "Package the CodeFormer tree into a versioned release archive",
    long_about = "Stage hack/, basicsr/, facelib/, options/, scripts/, the Makefile and root *.py
files into output/, archive them as codeformer_v<VERSION>.zip and move the archive
into release/.

Usage:
  codeformer_release 1.0.2
  codeformer_release 1.0.2 --project-root /path/to/CodeFormer
  codeformer_release 1.0.2 --dry-run"
)]
pub struct Args {
    /// Release version: letters, digits, '.' and '-'
    #[arg(id = "release_version", index = 1, value_name = "VERSION")]
    pub version: String,

    /// Project root (default: nearest ancestor of this executable containing basicsr/ and Makefile)
    #[arg(long, value_name = "PATH")]
    pub project_root: Option<PathBuf>,

    /// Show what would be packaged without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// How long to wait for a concurrent packaging run, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub lock_timeout_ms: u64,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Lock timeout as a duration
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Name of the command being run, for messages
    pub fn command_name(&self) -> &'static str {
        if self.dry_run { "preview" } else { "package" }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false)
    }
}

impl RuntimeConfig {
    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print progress message
    pub fn progress_println(&self, message: &str) {
        let _ = self.output.progress(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}
