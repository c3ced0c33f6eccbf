use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// A spawned target binary that is killed and reaped when dropped.
pub struct TargetProcess(pub Child);

#[derive(Debug, Clone, PartialEq)]
pub struct TargetOutput {
    pub stdout: String,
    pub exit_code: Option<i32>,
}

impl TargetOutput {
    /// Last printed line without the prompt in front of it.
    pub fn verdict(&self) -> &str {
        let last = self.stdout.lines().last().unwrap_or("");
        last.rsplit(": ").next().unwrap_or(last).trim()
    }
}

impl TargetProcess {
    pub fn spawn(path: &Path) -> std::io::Result<Self> {
        let child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(TargetProcess(child))
    }

    /// Writes one answer line, closes stdin and collects everything the
    /// target printed until it exits.
    pub fn answer(mut self, candidate: &[u8]) -> std::io::Result<TargetOutput> {
        if let Some(mut stdin) = self.0.stdin.take() {
            stdin.write_all(candidate)?;
            stdin.write_all(b"\n")?;
            stdin.flush()?;
        }

        let mut raw = Vec::new();
        if let Some(mut stdout) = self.0.stdout.take() {
            stdout.read_to_end(&mut raw)?;
        }
        let status = self.0.wait()?;

        Ok(TargetOutput {
            stdout: String::from_utf8_lossy(&raw).into_owned(),
            exit_code: status.code(),
        })
    }
}

impl Drop for TargetProcess {
    fn drop(&mut self) {
        if let Ok(Some(_)) = self.0.try_wait() {
            return;
        }
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}
