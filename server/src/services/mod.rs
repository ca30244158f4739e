//! Generation services: quota, gate, pipeline, live sessions and download
//! naming.

pub mod download;
pub mod gate;
pub mod notification;
pub mod pipeline;
pub mod quota;
pub mod session;
