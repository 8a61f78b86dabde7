use std::path::Path;

use tracing::warn;

use crate::command::{CommandRunner, CommandSpec};

/// Best-effort resolution of the current commit hash for build
/// metadata. Deploys can run outside a checkout, so any failure
/// degrades to an empty string with a warning instead of aborting.
pub fn commit_hash(runner: &dyn CommandRunner, cwd: &Path) -> String {
    let spec = CommandSpec::new("git", ["rev-parse", "HEAD"]).cwd(cwd);

    match runner.run(&spec) {
        Ok(proc) => proc.stdout.replace('\n', ""),
        Err(e) => {
            warn!("could not determine git commit hash ({e}); defaulting to empty string");
            String::new()
        }
    }
}
