//! Seams between the panel and the host it administers.
//!
//! All privileged work crosses these traits: reading and replacing the
//! protected backing files, and spawning the backup tool. Every operation
//! is independently failable; the panel never holds locks across them.

pub mod local;

use crate::panel::result_error::result::Result;
use std::path::Path;

/// Incremental receiver for a running command's output lines.
pub type OutputSink<'a> = &'a mut dyn FnMut(&str);

pub trait FileBridge {
    fn read_file(&self, path: &Path) -> Result<String>;

    /// Replaces the file's content wholesale. Atomic-replace semantics;
    /// `elevated` requests a privileged write.
    fn replace_file(&self, path: &Path, text: &str, elevated: bool) -> Result<()>;
}

pub trait ProcessBridge {
    /// Runs `argv` to completion, feeding output lines into `sink` as they
    /// arrive. Fails on spawn failure or nonzero exit.
    fn run_command(&self, argv: &[&str], elevated: bool, sink: OutputSink) -> Result<()>;

    /// Whether `name` resolves to an executable on the host.
    fn probe_binary(&self, name: &str) -> bool {
        self.run_command(&["which", name], false, &mut |_| {}).is_ok()
    }

    /// Whether privileged execution works without interaction.
    fn probe_privilege(&self) -> bool;
}
