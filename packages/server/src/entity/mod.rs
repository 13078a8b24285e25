pub mod plugin;
pub mod pusher;
