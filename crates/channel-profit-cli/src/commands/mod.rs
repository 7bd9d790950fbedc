pub mod compare;
pub mod format;
pub mod session;
