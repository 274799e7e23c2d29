pub mod config;
pub mod error;
pub mod index;
pub mod io;
pub mod paths;
pub mod recorder;
pub mod registry;
pub mod types;

pub use config::ActorConfig;
pub use error::{ActorError, Result};
pub use index::{IndexError, IndexSink, JsonlSink, MemorySink, NoopSink};
pub use recorder::{ActionRecorder, IndexOutcome, Receipt};
pub use registry::ActionRegistry;
pub use types::{ActionDefinition, ActionOccurrence, Snapshot};
