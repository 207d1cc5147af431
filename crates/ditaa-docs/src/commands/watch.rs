//! `ditaa-docs watch` command implementation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use clap::Args;
use ditaa_builder::{BuildConfig, BuildReport, SiteBuilder};
use ditaa_diagrams::BuildSession;
use notify::{RecursiveMode, Watcher};

use super::BuildArgs;
use crate::error::CliError;
use crate::output::Output;

/// Quiet period after the last change before a rebuild starts.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    #[command(flatten)]
    pub build: BuildArgs,
}

impl WatchArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.build.load_config()?;
        let builder = SiteBuilder::new(BuildConfig::from(&config));
        let source_dir = absolute(&builder.config().source_dir);
        let output_dir = absolute(&builder.config().output_dir);

        let (tx, rx) = mpsc::channel();
        let ignored = output_dir.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            forward_changes(res, &ignored, &tx);
        })?;
        watcher.watch(&source_dir, RecursiveMode::Recursive)?;

        output.highlight(&format!(
            "Watching {} for changes (Ctrl+C to stop)",
            source_dir.display()
        ));

        let mut watched = BTreeSet::new();
        loop {
            // Fresh session: a missing renderer is reported again on every pass
            let mut session = BuildSession::new();
            match builder.build(&mut session) {
                Ok(report) => {
                    output.report(&report, &output_dir);
                    watch_dependencies(&mut watcher, &mut watched, &report, &source_dir);
                }
                Err(e) => output.error(&format!("Error: {e}")),
            }

            let Some(changed) = wait_for_changes(&rx) else {
                return Ok(());
            };
            output.info(&format!("Changed: {}, rebuilding", changed.display()));
        }
    }
}

/// Forward relevant notify events to the build loop.
fn forward_changes(
    res: Result<notify::Event, notify::Error>,
    ignored: &Path,
    tx: &mpsc::Sender<PathBuf>,
) {
    let Ok(event) = res else { return };
    if !matches!(
        event.kind,
        notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
    ) {
        return;
    }
    for path in event.paths {
        if is_relevant(&path, ignored) {
            let _ = tx.send(path);
        }
    }
}

/// Whether a changed path should trigger a rebuild.
///
/// Changes inside the output directory (written by the build itself) and to
/// hidden files are ignored.
fn is_relevant(path: &Path, output_dir: &Path) -> bool {
    if path.starts_with(output_dir) {
        return false;
    }
    !path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

/// Block until a change arrives, then wait until changes stop for
/// [`DEBOUNCE`]. Returns the first changed path, or `None` if the watcher
/// is gone.
fn wait_for_changes(rx: &mpsc::Receiver<PathBuf>) -> Option<PathBuf> {
    let first = rx.recv().ok()?;
    loop {
        match rx.recv_timeout(DEBOUNCE) {
            Ok(_) => {}
            Err(mpsc::RecvTimeoutError::Timeout) => return Some(first),
            Err(mpsc::RecvTimeoutError::Disconnected) => return None,
        }
    }
}

/// Watch dependencies that live outside the source directory.
fn watch_dependencies(
    watcher: &mut impl Watcher,
    watched: &mut BTreeSet<PathBuf>,
    report: &BuildReport,
    source_dir: &Path,
) {
    for dep in &report.dependencies {
        if dep.starts_with(source_dir) || watched.contains(dep) || !dep.exists() {
            continue;
        }
        match watcher.watch(dep, RecursiveMode::NonRecursive) {
            Ok(()) => {
                watched.insert(dep.clone());
            }
            Err(e) => tracing::warn!(path = %dep.display(), "cannot watch dependency: {e}"),
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
