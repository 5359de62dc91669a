//! The class composer: builds constructible class values out of member
//! sources, wires up ancestor chains and super delegation, and hosts the
//! mixin and plugin machinery.

pub mod build;
pub mod ds;
pub mod naming;
pub mod plugin;
