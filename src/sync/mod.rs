pub mod scheduler;

pub use scheduler::{PollEvent, PollHandle};
