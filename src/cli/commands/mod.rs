//! Command execution.
//!
//! Errors are reported here with recovery suggestions and mapped to exit code 1.

mod package;
mod preview;

use crate::cli::{Args, RuntimeConfig};
use crate::error::{ReleaseError, Result};

use package::execute_package;
use preview::execute_preview;

/// Execute the command selected by the parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    let config = RuntimeConfig::from(&args);

    let result = if args.dry_run {
        execute_preview(&args, &config).await
    } else {
        execute_package(&args, &config).await
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            report_failure(&config, args.command_name(), &e);
            Ok(1)
        }
    }
}

fn report_failure(config: &RuntimeConfig, command: &str, error: &ReleaseError) {
    log::debug!("{command} failed: {error:?}");
    config.error_println(&format!("Command '{}' failed: {}", command, error));

    let suggestions = error.recovery_suggestions();
    if !suggestions.is_empty() {
        config.println("\n💡 Recovery suggestions:");
        for suggestion in suggestions {
            config.println(&format!("  • {}", suggestion));
        }
    }
}
