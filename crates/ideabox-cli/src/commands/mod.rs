pub mod add;
pub mod attach;
pub mod common;
pub mod delete;
pub mod list;
pub mod search;
pub mod status;
pub mod sync;
pub mod tags;
