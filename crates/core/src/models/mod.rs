pub mod appointment;
pub mod free_schedule;
pub mod session;
