pub mod limiters;
pub mod tokener;
pub mod uploaders;
