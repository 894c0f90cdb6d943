pub mod coordinator;
pub mod sensor;
pub mod setup;
pub mod todo_list;

pub use coordinator::{CoordinatorState, PollingCoordinator};
pub use sensor::OpenTasksSensor;
pub use setup::{SetupError, SetupInfo, validate_setup};
pub use todo_list::{TodoItem, TodoList};
