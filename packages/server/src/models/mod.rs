pub mod plugin;
pub mod pusher;
pub mod webhook;
