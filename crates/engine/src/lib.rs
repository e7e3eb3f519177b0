pub mod activation;
pub mod coords;
pub mod error;
pub mod events;
pub mod grid;
pub mod navigation;
pub mod store;
