pub mod events;
pub mod mount;
pub mod settings;
pub mod state;
