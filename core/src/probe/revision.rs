//! Revision probe: which branch a service's working copy has checked out.
//!
//! Best effort only. Services without a directory are `Untracked` and the
//! runner is never invoked for them; every failure of the query is logged
//! and reported as `Unknown`.

use std::sync::Arc;

use crate::infrastructure::runner::CommandRunner;
use crate::types::service::{Revision, ServiceDescriptor};

const BRANCH_COMMAND: &str = "git branch --no-color";


/// Resolves revisions through a swappable [`CommandRunner`].
#[derive(Clone)]
pub struct RevisionProbe {
    runner: Arc<dyn CommandRunner>,
}


impl RevisionProbe {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        RevisionProbe { runner }
    }

    /// Query the current branch of `service`.
    pub fn revision(&self, service: &ServiceDescriptor) -> Revision {
        let Some(dir) = service.directory.as_deref() else {
            return Revision::Untracked;
        };

        match self.runner.run(BRANCH_COMMAND, dir) {
            Ok(output) => match parse_current_branch(&output) {
                Some(label) => Revision::Known(label),
                None => {
                    tracing::warn!(
                        service = %service.name,
                        dir = %dir.display(),
                        "no current branch in git output"
                    );
                    Revision::Unknown
                }
            },
            Err(e) => {
                tracing::warn!(
                    service = %service.name,
                    dir = %dir.display(),
                    error = %e,
                    "cannot read git branch"
                );
                Revision::Unknown
            }
        }
    }
}


/// Extract the starred entry from `git branch` output.
///
/// `* main` becomes `main`; `* (HEAD detached at 1a2b3c)` becomes
/// `detached@1a2b3c`. Returns `None` when no line is starred.
pub fn parse_current_branch(output: &str) -> Option<String> {
    let line = output
        .lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("* "))?
        .trim();

    let label = match line
        .strip_prefix("(HEAD detached at ")
        .or_else(|| line.strip_prefix("(HEAD detached from "))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(rev) => format!("detached@{}", rev.trim()),
        None => line.to_string(),
    };

    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}
