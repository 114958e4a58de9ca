pub mod observable;
pub mod session;
pub mod storage;
