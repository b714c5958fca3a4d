mod handler;
mod inbound;
mod signal;

pub use handler::SignalHandler;
pub use inbound::InboundEvent;
pub use signal::ActivitySignal;
