//! Scheduled one-shot tasks (reload completion, respawn, enemy replacement)
//!
//! Очередь упорядочена по времени, дренируется один раз в начале тика:
//! задача с `due <= now` выполняется до логики самого тика.
//! Отмены нет - переключение оружия не отменяет идущую перезарядку.

use bevy::prelude::*;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

/// Отложенная задача
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Завершить перезарядку оружия в слоте `slot`
    ReloadComplete { slot: usize },
    /// Восстановить игрока после смерти
    RespawnPlayer,
    /// Создать нового врага на замену убитому
    SpawnEnemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledEntry {
    due: Duration,
    sequence: u64,
    task: ScheduledTask,
}

impl Ord for ScheduledEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for ScheduledEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap задач (resource)
#[derive(Resource, Debug, Default)]
pub struct ScheduledTasks {
    heap: BinaryHeap<Reverse<ScheduledEntry>>,
    next_sequence: u64,
}

impl ScheduledTasks {
    pub fn schedule(&mut self, due: Duration, task: ScheduledTask) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(ScheduledEntry { due, sequence, task }));
    }

    /// Следующая задача с `due <= now` (ties - в порядке постановки)
    pub fn pop_due(&mut self, now: Duration) -> Option<ScheduledTask> {
        match self.heap.peek() {
            Some(Reverse(entry)) if entry.due <= now => {
                self.heap.pop().map(|Reverse(entry)| entry.task)
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, task: ScheduledTask) -> bool {
        self.heap.iter().any(|Reverse(entry)| entry.task == task)
    }
}
