pub mod date;
pub mod task;
pub mod user;

pub use date::parse_strict_date;
pub use task::{
    CreateTaskInput, ReplaceSubtasksInput, Subtask, SubtaskInput, Task, TaskStatus,
    UpdateTaskInput,
};
pub use user::{NewUser, PublicUser, User};
