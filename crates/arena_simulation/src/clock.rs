//! Frame clock: ограничение delta одного тика
//!
//! Медленный или зависший кадр не должен давать гигантский шаг симуляции
//! (туннелирование сквозь пол, пропуск нескольких wander циклов за раз).

use std::time::{Duration, Instant};

/// Clamp сырого frame delta до `max_delta`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    pub max_delta: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            max_delta: Duration::from_millis(50),
        }
    }
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self { max_delta }
    }

    pub fn clamp(&self, raw_delta: Duration) -> Duration {
        raw_delta.min(self.max_delta)
    }
}

/// Wall-clock источник delta (только для headless бинаря)
#[derive(Debug)]
pub struct WallClock {
    last: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self { last: Instant::now() }
    }

    /// Время с прошлого вызова
    pub fn sample(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;
        delta
    }
}
