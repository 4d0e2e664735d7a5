pub mod cli;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod hosts;
pub mod iface;
pub mod link;
pub mod listeners;
pub mod net;
pub mod probers;
pub mod resolve;
pub mod subnet;
pub mod tui;
pub mod vendor;
pub mod web;
