// Package http holds the hyper client shared by every outbound adapter.

pub mod client;
pub mod request;


pub use client::{create_client, HyperClient};
pub use request::{send, HttpResponse, RequestError};
