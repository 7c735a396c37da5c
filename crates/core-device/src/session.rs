use std::time::Duration;

use core_ebb::{Command, EbbClient, SerialLink};
use core_error::Result;
use core_stepper::StepperSettings;
use tracing::info;

use crate::lock::DeviceLock;
use crate::ports;

const PROBE_BAUD_TIMEOUT: Duration = Duration::from_millis(500);
const IDLE_POLL_PERIOD: Duration = Duration::from_millis(20);
const IDLE_MAX_ATTEMPTS: u32 = 200;

/// Everything needed to open a device session: where the lock file
/// lives, which port to prefer, and the profile-derived stepper settings
/// to validate before any motion is attempted.
pub struct SessionOptions {
    pub lock_path: std::path::PathBuf,
    pub alias: Option<String>,
    pub settings: StepperSettings,
    pub command_timeout: Duration,
    pub min_command_interval: Duration,
}

/// A live, exclusively-held connection to the controller. Every
/// constructor step's resource (lock, serial handle) is released on
/// every exit path: the lock by `DeviceLock`'s `Drop`, the serial
/// connection by `SerialLink`'s own `Drop` once the client goes out of
/// scope.
pub struct DeviceSession {
    _lock: DeviceLock,
    client: EbbClient<SerialLink>,
    port: String,
}

impl DeviceSession {
    pub fn open(options: SessionOptions) -> Result<Self> {
        options.settings.validate()?;

        let lock = DeviceLock::acquire(&options.lock_path)?;

        let candidates = ports::enumerate_ports()?;
        let port = match &options.alias {
            Some(alias) => ports::select_by_alias(&candidates, alias)?,
            None => ports::select_responsive(&candidates, probe)?,
        };

        let link = SerialLink::open(&port, PROBE_BAUD_TIMEOUT)?;
        let mut client = EbbClient::new(link, options.min_command_interval, options.command_timeout);
        let version = client.version()?;
        info!(target: "core_device::session", port = %port, version = %version, "connected");

        Ok(Self {
            _lock: lock,
            client,
            port,
        })
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Run a callback against the session's client (step 6 of the
    /// lifecycle); the lock and connection remain held for the
    /// callback's duration regardless of whether it errors.
    pub fn execute<T>(&mut self, f: impl FnOnce(&mut EbbClient<SerialLink>) -> Result<T>) -> Result<T> {
        f(&mut self.client)
    }

    /// Poll `QM` until every motion flag clears, per the fixed
    /// 20 ms / 200-attempt budget; exhaustion is a `Timeout`.
    pub fn wait_idle(&mut self) -> Result<()> {
        self.client.wait_idle(IDLE_POLL_PERIOD, IDLE_MAX_ATTEMPTS)
    }

    pub fn client_mut(&mut self) -> &mut EbbClient<SerialLink> {
        &mut self.client
    }
}

fn probe(path: &str) -> bool {
    let Ok(link) = SerialLink::open(path, PROBE_BAUD_TIMEOUT) else {
        return false;
    };
    let mut client = EbbClient::new(link, Duration::from_millis(0), PROBE_BAUD_TIMEOUT);
    client.exec(&Command::version()).is_ok()
}
