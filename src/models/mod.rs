pub mod options;
pub mod task;

pub use options::{CaptureOptions, OutputKind, ResponseFormat, Viewport};
pub use task::{generate_task_id, Job, JobStatus, Task};
