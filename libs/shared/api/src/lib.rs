pub mod client;
pub mod connectivity;

pub use client::ApiClient;
pub use connectivity::{AlwaysOnline, ConnectivityFlag, ConnectivitySignal};
