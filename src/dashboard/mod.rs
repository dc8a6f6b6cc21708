pub mod clock;
pub mod controller;
pub mod runtime;

pub use clock::{Clock, SystemClock};
pub use controller::{Dashboard, DashboardEvent, DashboardSettings, PollError, Snapshot};
pub use runtime::{Command, DashboardHandle, DashboardTask};
