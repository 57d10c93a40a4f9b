//! ECS Components для игровых entity
//!
//! - actor: Health (игрок и враги)
//! - player: Player marker, PlayerMotion, PlayerVitals
//! - enemy: Enemy identity, HitVolumeShape, Wander, EnemyFire

pub mod actor;
pub mod enemy;
pub mod player;

pub use actor::*;
pub use enemy::*;
pub use player::*;
