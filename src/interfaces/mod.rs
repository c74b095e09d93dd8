pub mod gateway;
pub mod queue;
pub mod scheduler;
