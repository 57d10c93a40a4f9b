//! Presentation events (ECS → HUD/FX collaborator)
//!
//! Fire-and-forget: симуляция только эмитит, рендер/HUD живут снаружи.
//! Системы пишут `PresentationEvent` через EventWriter, в конце тика
//! `collect_presentation_events` складывает их в outbox, а `Simulation::tick`
//! отдаёт outbox во внешний `PresentationSink`.

use bevy::prelude::*;

use crate::components::EnemyId;

#[derive(Event, Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    /// Успешный выстрел игрока
    MuzzleFlash { slot: usize },
    /// Попадание по врагу
    HitMarker { point: Vec3 },
    /// Попадание в геометрию мира (или cosmetic near-miss без normal)
    Impact { point: Vec3, normal: Option<Vec3> },
    EnemyHealthChanged { enemy: EnemyId, fraction: f32 },
    PlayerHealthChanged { fraction: f32 },
    /// Патроны для HUD (после выстрела, перезарядки, смены оружия)
    AmmoChanged { slot: usize, magazine: u32, reserve: u32 },
    StatusMessage { text: String },
}

impl PresentationEvent {
    pub fn status(text: impl Into<String>) -> Self {
        Self::StatusMessage { text: text.into() }
    }
}

/// Внешний получатель событий (HUD, FX, тестовый recorder)
pub trait PresentationSink {
    fn emit(&mut self, event: &PresentationEvent);
}

impl PresentationSink for Vec<PresentationEvent> {
    fn emit(&mut self, event: &PresentationEvent) {
        self.push(event.clone());
    }
}

/// Sink который всё выбрасывает
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl PresentationSink for DiscardSink {
    fn emit(&mut self, _event: &PresentationEvent) {}
}

/// Sink → logger (headless бинарь)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl PresentationSink for LogSink {
    fn emit(&mut self, event: &PresentationEvent) {
        match event {
            PresentationEvent::StatusMessage { text } => crate::logger::log_info(&format!("HUD: {}", text)),
            other => crate::logger::log(&format!("FX: {:?}", other)),
        }
    }
}

/// События текущего тика (resource)
#[derive(Resource, Debug, Default)]
pub struct PresentationOutbox {
    pub events: Vec<PresentationEvent>,
}

impl PresentationOutbox {
    pub fn drain(&mut self) -> Vec<PresentationEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Система: EventReader → outbox (последняя в тике)
pub fn collect_presentation_events(
    mut events: EventReader<PresentationEvent>,
    mut outbox: ResMut<PresentationOutbox>,
) {
    outbox.events.extend(events.read().cloned());
}
