//! Player physics module
//!
//! Kinematic контроллер без физического движка: acceleration-based velocity,
//! gravity + jump, ground snap на высоте глаз, clamp по границам мира.

pub mod locomotion;

// Re-export основных типов
pub use locomotion::{player_locomotion, step_locomotion, LocomotionPlugin};
