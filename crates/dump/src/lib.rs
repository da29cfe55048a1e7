use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, Instrument};

/// Program invoked when no other is configured.
pub const DEFAULT_DUMP_PROGRAM: &str = "mongodump";

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}")]
    Exit { program: String, status: ExitStatus },
}

/// Produces a database dump for `host` into the directory `out`.
#[async_trait::async_trait]
pub trait Dumper: Send + Sync {
    async fn dump(&self, host: &str, out: &Path) -> Result<(), DumpError>;
}

/// Runs an external dump tool as `<program> [base args] --host <host> --out <out>`.
///
/// The tool owns creation of `out`. Its stdout and stderr are logged line by
/// line while it runs.
#[derive(Debug, Clone)]
pub struct MongoDump {
    program: OsString,
    base_args: Vec<OsString>,
}

impl MongoDump {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
        }
    }

    /// Arguments placed before `--host`, e.g. `-c <script>` when the program is a shell.
    pub fn with_base_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl Default for MongoDump {
    fn default() -> Self {
        Self::new(DEFAULT_DUMP_PROGRAM)
    }
}

#[async_trait::async_trait]
impl Dumper for MongoDump {
    async fn dump(&self, host: &str, out: &Path) -> Result<(), DumpError> {
        let program = self.program_name();
        debug!(%program, host, out = %out.display(), "starting dump");

        let mut child = Command::new(&self.program)
            .args(&self.base_args)
            .arg("--host")
            .arg(host)
            .arg("--out")
            .arg(out)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| DumpError::Spawn {
                program: program.clone(),
                source,
            })?;

        let readers: Vec<JoinHandle<()>> = [
            child.stdout.take().map(|pipe| stream_lines(pipe, "stdout")),
            child.stderr.take().map(|pipe| stream_lines(pipe, "stderr")),
        ]
        .into_iter()
        .flatten()
        .collect();

        let status = child.wait().await.map_err(|source| DumpError::Wait {
            program: program.clone(),
            source,
        })?;

        for reader in readers {
            // Readers are best-effort; a panicked reader only loses log lines.
            let _ = reader.await;
        }

        if !status.success() {
            return Err(DumpError::Exit { program, status });
        }

        info!("Backup completed successfully");
        Ok(())
    }
}

/// Logs every line of `stream` as it arrives. Stops quietly at end of stream or on a read error.
fn stream_lines<R>(stream: R, name: &'static str) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            info!(stream = name, "{line}");
        }
    }
    .in_current_span())
}
