//! Device session lifecycle: exclusive lock acquisition, port
//! enumeration and selection, connection probing, and the bounded
//! idle-wait that callers run after issuing motion.

mod lock;
mod ports;
mod session;

pub use lock::DeviceLock;
pub use ports::{enumerate_ports, select_by_alias, select_responsive};
pub use session::{DeviceSession, SessionOptions};
