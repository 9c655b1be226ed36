#![warn(rust_2018_idioms)]

pub use rtp;
pub use sdp;

pub use error::Error;

pub mod error;
pub mod ice_transport;
pub mod jitter_buffer;
pub mod media_stream;
pub mod peer_connection;
pub mod rtp_transceiver;

pub(crate) mod util;

pub(crate) const UNSPECIFIED_STR: &str = "Unspecified";
