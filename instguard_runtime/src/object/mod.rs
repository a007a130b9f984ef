//! Class, instance and namespace objects.

pub mod class;
pub mod class_body;
pub mod instance;
pub mod mro;
pub mod namespace;
