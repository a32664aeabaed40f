pub mod calendar;
pub mod deadline;
pub mod rollover;
pub mod store;
