pub mod github;
pub mod plugin;
pub mod pusher;
