use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, trace};

use crate::{CommandOutput, GenerationError};

/// Runs generator processes to completion
pub struct ProcessSpawner;

impl ProcessSpawner {
    /// Run `binary` with `args` and collect its output.
    ///
    /// The child is killed when `timeout` elapses first.
    pub async fn spawn(
        binary: &Path,
        args: &[&str],
        working_dir: Option<&Path>,
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, GenerationError> {
        let start = Instant::now();
        debug!(
            binary = %binary.display(),
            arg_count = args.len(),
            ?timeout,
            "Spawning generator process"
        );

        let mut cmd = Command::new(binary);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn()?;
        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| GenerationError::Timeout(limit))??,
            None => child.wait_with_output().await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
        if !stderr.is_empty() {
            trace!(stderr = %stderr, "Generator process stderr");
        }

        let exit_code = output.status.code().unwrap_or(-1);
        let duration = start.elapsed();
        debug!(
            exit_code,
            duration_ms = duration.as_millis(),
            "Generator process completed"
        );

        Ok(CommandOutput::new(stdout, stderr, exit_code, duration))
    }
}
