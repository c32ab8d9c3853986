pub mod message_queue;
pub mod stop_signal;
pub mod worker;

pub use message_queue::{MessageQueue, RecvError};
pub use stop_signal::StopSignal;
pub use worker::Worker;
