//! `NetworkGate` adapters.

use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use focuslock_core::config::NetworkConfig;
use focuslock_core::network::NetworkGate;

enum GateJob {
    Run {
        action: &'static str,
        argv: Vec<String>,
    },
    /// Acknowledged once every job queued before it has run.
    Barrier(Sender<()>),
}

/// Toggles network access by running platform commands
/// (`nmcli networking off|on` on Linux by default).
///
/// Commands are queued to a single worker thread and run one after another
/// in the order issued, so a `disable` can never land after a later
/// `enable`. Outcomes are only logged. Dropping the gate closes the queue;
/// the worker finishes what is already queued and exits.
pub struct SystemNetworkGate {
    disable_command: Vec<String>,
    enable_command: Vec<String>,
    jobs: Mutex<Option<Sender<GateJob>>>,
}

impl SystemNetworkGate {
    pub fn new(disable_command: Vec<String>, enable_command: Vec<String>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("network-gate".to_string())
            .spawn(move || run_worker(receiver));
        let jobs = match spawned {
            Ok(_) => Some(sender),
            Err(e) => {
                tracing::error!("[NetworkGate] Failed to start network command worker: {}", e);
                None
            }
        };

        Self {
            disable_command,
            enable_command,
            jobs: Mutex::new(jobs),
        }
    }

    fn submit(&self, job: GateJob) -> bool {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match jobs.as_ref() {
            Some(sender) => sender.send(job).is_ok(),
            None => false,
        }
    }

    fn queue(&self, action: &'static str, argv: &[String]) {
        if argv.is_empty() {
            tracing::warn!(
                "[NetworkGate] No command configured to {} the network",
                action
            );
            return;
        }
        let queued = self.submit(GateJob::Run {
            action,
            argv: argv.to_vec(),
        });
        if !queued {
            tracing::warn!(
                "[NetworkGate] Network command worker is gone; cannot {} the network",
                action
            );
        }
    }
}

impl NetworkGate for SystemNetworkGate {
    fn disable(&self) {
        self.queue("disable", &self.disable_command);
    }

    fn enable(&self) {
        self.queue("enable", &self.enable_command);
    }

    fn settle(&self, timeout: Duration) -> bool {
        let (ack, done) = mpsc::channel();
        if !self.submit(GateJob::Barrier(ack)) {
            return true;
        }
        match done.recv_timeout(timeout) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    "[NetworkGate] Network commands still running after {:?}",
                    timeout
                );
                false
            }
        }
    }
}

fn run_worker(jobs: Receiver<GateJob>) {
    for job in jobs {
        match job {
            GateJob::Run { action, argv } => run_command(action, &argv),
            GateJob::Barrier(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("[NetworkGate] Network command worker stopped");
}

fn run_command(action: &str, argv: &[String]) {
    let Some((program, args)) = argv.split_first() else {
        return;
    };
    let command_line = argv.join(" ");
    tracing::info!(
        "[NetworkGate] Running `{}` to {} the network",
        command_line,
        action
    );

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match status {
        Ok(status) if status.success() => {
            tracing::debug!("[NetworkGate] `{}` finished", command_line);
        }
        Ok(status) => {
            tracing::warn!("[NetworkGate] `{}` exited with {}", command_line, status);
        }
        Err(e) => {
            tracing::warn!("[NetworkGate] Failed to run `{}`: {}", command_line, e);
        }
    }
}

/// Gate that never touches the machine. Used when network control is
/// turned off in the configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNetworkGate;

impl NetworkGate for NoopNetworkGate {
    fn disable(&self) {
        tracing::info!("[NetworkGate] Network control disabled; not cutting network access");
    }

    fn enable(&self) {
        tracing::debug!("[NetworkGate] Network control disabled; nothing to restore");
    }
}

/// Builds the gate described by the configuration.
pub fn network_gate_from_config(config: &NetworkConfig) -> Arc<dyn NetworkGate> {
    if config.enabled {
        Arc::new(SystemNetworkGate::new(
            config.disable_command.clone(),
            config.enable_command.clone(),
        ))
    } else {
        Arc::new(NoopNetworkGate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLE: Duration = Duration::from_secs(10);

    #[test]
    fn test_empty_command_is_ignored() {
        let gate = SystemNetworkGate::new(Vec::new(), Vec::new());
        gate.disable();
        gate.enable();
        assert!(gate.settle(SETTLE));
    }

    #[test]
    fn test_missing_program_keeps_worker_alive() {
        let gate = SystemNetworkGate::new(
            vec!["focuslock-definitely-missing-binary".to_string()],
            vec!["focuslock-definitely-missing-binary".to_string()],
        );
        gate.disable();
        gate.enable();
        assert!(gate.settle(SETTLE));
        gate.disable();
        assert!(gate.settle(SETTLE));
    }

    #[test]
    fn test_noop_gate_settles_immediately() {
        let disabled = NetworkConfig {
            enabled: false,
            ..NetworkConfig::default()
        };
        let gate = network_gate_from_config(&disabled);
        gate.disable();
        gate.enable();
        assert!(gate.settle(Duration::ZERO));
    }

    #[cfg(unix)]
    #[test]
    fn test_commands_apply_in_issue_order() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let state = temp_dir.path().join("network");
        let sh = |script: String| vec!["sh".to_string(), "-c".to_string(), script];

        let gate = SystemNetworkGate::new(
            sh(format!("sleep 0.3; echo off > '{}'", state.display())),
            sh(format!("echo on > '{}'", state.display())),
        );
        gate.disable();
        gate.enable();
        assert!(gate.settle(SETTLE));

        let last = std::fs::read_to_string(&state).unwrap();
        assert_eq!(last.trim(), "on");
    }

    #[cfg(unix)]
    #[test]
    fn test_settle_waits_for_queued_commands() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let marker = temp_dir.path().join("restored");
        let gate = SystemNetworkGate::new(
            vec!["sh".to_string(), "-c".to_string(), "sleep 0.2".to_string()],
            vec!["touch".to_string(), marker.display().to_string()],
        );
        gate.disable();
        gate.enable();
        assert!(gate.settle(SETTLE));
        assert!(marker.exists());
    }
}
