pub(crate) mod config;
pub(crate) mod storage;
pub(crate) mod time;
