//! Per-tick input snapshot (resource)
//!
//! Input device abstraction живёт снаружи: сюда приходят уже готовые
//! boolean intents + ориентация камеры, один снимок на тик.

use bevy::math::EulerRot;
use bevy::prelude::*;

/// Команда смены оружия
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponSwitch {
    /// Конкретный слот каталога (out of range → игнор)
    Absolute(usize),
    /// +1 / -1 с wraparound по размеру каталога
    Relative(i32),
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub sprint: bool,
    /// Trigger удерживается
    pub firing: bool,
    /// Горизонтальный угол камеры (рад), влияет на движение и прицел
    pub yaw: f32,
    /// Вертикальный угол камеры (рад), только прицел
    pub pitch: f32,
    pub reload: bool,
    pub switch: Option<WeaponSwitch>,
    /// Следующий cosmetic skin текущего оружия
    pub cycle_skin: bool,
}

impl PlayerInput {
    /// Направление взгляда (yaw + pitch), forward = -Z
    pub fn aim_direction(&self) -> Vec3 {
        let pitch = self.pitch.clamp(-89f32.to_radians(), 89f32.to_radians());
        Quat::from_euler(EulerRot::YXZ, self.yaw, pitch, 0.0) * Vec3::NEG_Z
    }

    /// Horizontal intent в локальных осях (x = right, z = back), not normalized
    pub fn move_intent(&self) -> Vec3 {
        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;
        Vec3::new(axis(self.right, self.left), 0.0, axis(self.back, self.forward))
    }
}
