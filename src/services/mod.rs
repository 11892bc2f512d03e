pub mod deadline;
pub mod gemini;
pub mod notifier;
pub mod scheduler;
pub mod stats;
pub mod task_extraction;
pub mod telegram;
