pub mod associations;
pub mod init;
