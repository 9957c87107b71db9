pub mod capability;
pub mod entity;
pub mod factory;
pub mod layout;
pub mod scene;
pub mod tick;
