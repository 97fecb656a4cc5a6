#![allow(dead_code)]

pub mod ftp_server;
pub mod helpers;
