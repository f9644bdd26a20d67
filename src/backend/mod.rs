pub mod actor;
pub mod messages;
pub mod session;

pub use actor::BackendActor;
pub use messages::{BackendCommand, BackendEvent};
pub use session::ResolveSession;
