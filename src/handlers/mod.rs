pub mod calendar;
pub mod general;
pub mod periods;
