use std::collections::VecDeque;

use meta_core::EntitySnapshot;
use serde::Serialize;

/// Read-only state of a simulation after a completed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    /// Frame number, starting at 1 for the first completed frame.
    pub frame: u64,
    /// Step of the frame just completed, in seconds.
    pub dt: f64,
    /// Total simulated seconds.
    pub elapsed: f64,
    /// Every entity, in registry order.
    pub entities: Vec<EntitySnapshot>,
}

impl FrameSnapshot {
    /// The snapshot of the named entity.
    pub fn entity(&self, name: &str) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Something a running simulation presents its frames to.
///
/// Surfaces receive a snapshot after each frame completes and never see
/// the live registry.
pub trait RenderSurface: std::fmt::Debug {
    /// Identifier scripts are started against.
    fn id(&self) -> &str;

    /// Called once per completed frame.
    fn present(&mut self, frame: &FrameSnapshot);

    /// Support downcasting to concrete types.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Support downcasting to concrete types.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

/// A surface that keeps the most recent frames it was shown.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    id: String,
    frames: VecDeque<FrameSnapshot>,
    capacity: usize,
    presented: u64,
}

impl RecordingSurface {
    /// Keep every frame.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_capacity(id, 0)
    }

    /// Keep at most `capacity` frames, dropping the oldest. 0 = unlimited.
    pub fn with_capacity(id: impl Into<String>, capacity: usize) -> Self {
        Self {
            id: id.into(),
            frames: VecDeque::new(),
            capacity,
            presented: 0,
        }
    }

    /// Retained frames, oldest first.
    pub fn frames(&self) -> &VecDeque<FrameSnapshot> {
        &self.frames
    }

    /// The most recently presented frame still retained.
    pub fn last(&self) -> Option<&FrameSnapshot> {
        self.frames.back()
    }

    /// Frames presented since creation, including dropped ones.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Drop every retained frame. The presented count is kept.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn id(&self) -> &str {
        &self.id
    }

    fn present(&mut self, frame: &FrameSnapshot) {
        self.presented += 1;
        if self.capacity > 0 && self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame.clone());
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
