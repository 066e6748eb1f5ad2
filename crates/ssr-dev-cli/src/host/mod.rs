//! Dev host: serves the client pipeline's output and hot-update events.
//!
//! Assets are read straight from the client compiler's in-memory file
//! system. Browsers subscribe to build events over Server-Sent Events.

mod middleware;
mod server;
mod state;

pub use middleware::{handle_asset, handle_hot, handle_status};
pub use server::{bind, build_router, serve, HostRoutes, STATUS_PATH};
pub use state::{HostState, HostStatus, SharedState, SnapshotLog};
