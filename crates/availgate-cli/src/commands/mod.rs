pub mod check;
pub mod explain;
pub mod init_config;
pub mod lookup;
pub mod resolve;
