use std::fs::File;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;

pub trait Launcher {
    /// Starts `argv[0]` with the remaining arguments and returns immediately.
    fn launch(&self, argv: &[String]);
}

/// Runs programs detached, with stdout and stderr sent to a sink (normally
/// /dev/null) so they stay out of the window manager's log.
#[derive(Debug)]
pub struct ProcessLauncher {
    sink: PathBuf,
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::with_sink("/dev/null")
    }
}

impl ProcessLauncher {
    pub fn with_sink(sink: impl Into<PathBuf>) -> Self {
        Self { sink: sink.into() }
    }

    fn open_sink(&self) -> Option<(Stdio, Stdio)> {
        let opened = File::options()
            .append(true)
            .open(&self.sink)
            .and_then(|out| Ok((out.try_clone()?, out)));
        match opened {
            Ok((err, out)) => Some((Stdio::from(out), Stdio::from(err))),
            Err(e) => {
                log::warn!(
                    "Failed to open {:?} ({}), child output inherited",
                    self.sink,
                    e
                );
                None
            }
        }
    }

    /// The command for `argv`, or `None` when there is no program to run.
    fn command(&self, argv: &[String]) -> Option<Command> {
        let (program, args) = argv.split_first()?;
        let mut command = Command::new(program);
        command.args(args);
        if let Some((stdout, stderr)) = self.open_sink() {
            command.stdout(stdout).stderr(stderr);
        }
        Some(command)
    }

    fn spawn(&self, argv: &[String]) -> Option<Child> {
        let Some(mut command) = self.command(argv) else {
            log::warn!("Refusing to spawn an empty command");
            return None;
        };
        match command.spawn() {
            Ok(child) => {
                log::info!("Spawned {} (pid {})", argv.join(" "), child.id());
                Some(child)
            }
            Err(e) => {
                log::error!("Failed to spawn {}: {}", argv[0], e);
                None
            }
        }
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, argv: &[String]) {
        if let Some(mut child) = self.spawn(argv) {
            // Reap the child so it doesn't linger as a zombie.
            thread::spawn(move || {
                let _ = child.wait();
            });
        }
    }
}
