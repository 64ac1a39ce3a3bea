pub mod demo;
pub mod did;
pub mod init;
pub mod verify;
