use cellgrid_sheet::{UploadPolicy, DEFAULT_MAX_UPLOAD_BYTES};
use clap::Parser;
use std::net::SocketAddr;

/// cellgrid-server - spreadsheet import, export and analysis over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "cellgrid-server")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "CELLGRID_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "CELLGRID_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::default().with_max_bytes(self.max_upload_bytes)
    }
}
