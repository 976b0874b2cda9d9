pub mod dashboard;
pub mod device;
pub mod event;
pub mod event_kind;
pub mod tag;
pub mod time_block;
