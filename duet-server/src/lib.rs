mod config;
mod hub;
mod notifier;
mod registry;
mod room;
mod router;
mod signaling;
mod transport;

pub use config::*;
pub use hub::*;
pub use notifier::*;
pub use registry::*;
pub use room::*;
pub use router::*;
pub use signaling::*;
pub use transport::*;
