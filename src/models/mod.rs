pub mod bucket;
pub mod plan;
pub mod task;

pub use bucket::{BucketInfo, BucketListing, BucketMatch, BucketRef};
pub use plan::Plan;
pub use task::{
    DEFAULT_PRIORITY, NewTaskRequest, OpenTask, TaskCreated, TaskDeleted, TaskSnapshot, TaskUpdated,
    UpdateTaskRequest,
};
