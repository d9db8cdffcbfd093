use crate::panel::bridge::{FileBridge, OutputSink, ProcessBridge};
use crate::panel::result_error::error::Error;
use crate::panel::result_error::result::Result;
use crate::panel::result_error::WithMsg;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

/// Bridge implementation for running directly on the administered host.
/// Elevation is a `sudo` prefix.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalBridge;

impl FileBridge for LocalBridge {
    fn read_file(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(Error::from)
            .with_msg(format!("Failed to read {path:?}"))
    }

    fn replace_file(&self, path: &Path, text: &str, elevated: bool) -> Result<()> {
        if elevated {
            return self.replace_file_elevated(path, text);
        }

        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(Error::from)
            .with_msg(format!("Failed to create temp file next to {path:?}"))?;
        tmp.write_all(text.as_bytes())?;
        tmp.persist(path)
            .map(|_| ())
            .map_err(|e| Error::from(e.error))
            .with_msg(format!("Failed to replace {path:?}"))
    }
}

impl LocalBridge {
    fn replace_file_elevated(&self, path: &Path, text: &str) -> Result<()> {
        tracing::info!("Writing {path:?} with elevated privilege");
        let mut child = Command::new("sudo")
            .arg("tee")
            .arg("--")
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(Error::from)
            .with_msg(format!("Failed to spawn privileged write for {path:?}"))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::command_failed(
                format!("sudo tee -- {}", path.display()),
                status.code(),
            ))
        }
    }
}

impl ProcessBridge for LocalBridge {
    fn run_command(&self, argv: &[&str], elevated: bool, sink: OutputSink) -> Result<()> {
        let full: Vec<&str> = if elevated {
            std::iter::once("sudo").chain(argv.iter().copied()).collect()
        } else {
            argv.to_vec()
        };
        let rendered = full.join(" ");
        tracing::info!("Running {rendered:?}");

        let mut child = Command::new(full[0])
            .args(&full[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(Error::from)
            .with_msg(format!("Failed to spawn {rendered:?}"))?;

        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                sink(&line?);
            }
        }

        let output = child.wait_with_output()?;
        if !output.stderr.is_empty() {
            let stderr = String::from_utf8(output.stderr)?;
            for line in stderr.lines() {
                sink(line);
            }
        }

        if output.status.success() {
            Ok(())
        } else {
            tracing::warn!("Command {rendered:?} exited with {:?}", output.status.code());
            Err(Error::command_failed(rendered, output.status.code()))
        }
    }

    fn probe_privilege(&self) -> bool {
        self.run_command(&["sudo", "-n", "true"], false, &mut |_| {})
            .is_ok()
    }
}
