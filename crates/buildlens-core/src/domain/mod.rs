//! Domain model (ids, task records, environment, reports, errors).

pub mod environment;
pub mod errors;
pub mod ids;
pub mod report;
pub mod state;
pub mod task;

pub use self::environment::{CustomProperties, Environment, Plugin, Switches};
pub use self::errors::{ConfigError, ErrorKind, PublishError};
pub use self::ids::{BuildId, Id, IdMarker};
pub use self::report::{ExecutionReport, UNDEFINED};
pub use self::state::TaskState;
pub use self::task::{TaskPath, TaskRecord};
