//! Input model: pointer and trigger events as delivered to a render view.
//!
//! Coordinates are canvas-local CSS pixels with the origin at the top-left
//! corner of the view's canvas. The host layer fills these from DOM events
//! (see [`crate::engine`]) or from scripted input.

#[cfg(test)]
#[path = "event_test.rs"]
mod event_test;

use serde::{Deserialize, Serialize};

/// A point in canvas-local pixels or in device (NDC) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    /// Pointer moved with no button held.
    Hover,
    /// A button went down.
    Down,
    /// Pointer moved while a gesture is in progress.
    Move,
    /// A button was released.
    Up,
    /// The platform cancelled the pointer (lost capture, touch interrupted).
    Cancel,
    /// Wheel or trackpad scroll. The scroll amount travels in `movement.y`.
    Wheel,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    /// Left mouse button (or single-finger touch).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Class of device that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    #[default]
    Mouse,
    Pen,
    Touch,
    /// Tracked or handheld controller (the usual source of trigger events).
    Controller,
    Unknown,
}

/// Originating device of an event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDescriptor {
    pub kind: DeviceKind,
    /// Platform pointer or controller id.
    pub id: i32,
}

fn default_true() -> bool {
    true
}

fn default_pointer_count() -> u32 {
    1
}

/// A pointer event in canvas-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Position relative to the view's canvas.
    pub local: Point,
    /// Movement since the previous pointer event, in pixels.
    #[serde(default)]
    pub movement: Point,
    #[serde(default)]
    pub button: Button,
    /// Event comes from the primary pointer of its device.
    #[serde(default = "default_true")]
    pub primary: bool,
    /// Pointer is over the view's canvas element.
    #[serde(default = "default_true")]
    pub inside: bool,
    /// Number of pointers currently down (touch).
    #[serde(default = "default_pointer_count")]
    pub pointer_count: u32,
    /// Positions of every active pointer, primary first.
    #[serde(default)]
    pub positions: Vec<Point>,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub device: DeviceDescriptor,
}

impl PointerEvent {
    /// A single primary mouse pointer event at `local`.
    #[must_use]
    pub fn new(kind: PointerKind, local: Point) -> Self {
        Self {
            kind,
            local,
            movement: Point::default(),
            button: Button::Primary,
            primary: true,
            inside: true,
            pointer_count: 1,
            positions: vec![local],
            modifiers: Modifiers::default(),
            device: DeviceDescriptor::default(),
        }
    }

    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn with_movement(mut self, dx: f64, dy: f64) -> Self {
        self.movement = Point::new(dx, dy);
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Replace the active-pointer list; the pointer count follows it.
    #[must_use]
    pub fn with_positions(mut self, positions: Vec<Point>) -> Self {
        self.pointer_count = u32::try_from(positions.len()).unwrap_or(u32::MAX);
        self.positions = positions;
        self
    }

    #[must_use]
    pub fn with_device(mut self, device: DeviceDescriptor) -> Self {
        self.device = device;
        self
    }

    /// Primary button pressed on the primary pointer: the start of a pick gesture.
    #[must_use]
    pub fn is_primary_down(&self) -> bool {
        self.kind == PointerKind::Down && self.primary && self.button == Button::Primary
    }
}

/// Phase of a trigger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Press,
    Release,
    /// Analog value changed without crossing the press threshold.
    Change,
}

/// A trigger (select) event from a controller, aimed at a canvas location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub kind: TriggerKind,
    pub local: Point,
    /// Analog trigger value in `[0, 1]`.
    #[serde(default)]
    pub value: f64,
    #[serde(default = "default_true")]
    pub primary: bool,
    #[serde(default = "default_true")]
    pub inside: bool,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub device: DeviceDescriptor,
}

impl TriggerEvent {
    #[must_use]
    pub fn new(kind: TriggerKind, local: Point) -> Self {
        let value = if kind == TriggerKind::Press { 1.0 } else { 0.0 };
        Self {
            kind,
            local,
            value,
            primary: true,
            inside: true,
            modifiers: Modifiers::default(),
            device: DeviceDescriptor { kind: DeviceKind::Controller, id: 0 },
        }
    }
}

/// Either kind of routable input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Pointer(PointerEvent),
    Trigger(TriggerEvent),
}

impl InputEvent {
    /// Canvas-local position of the event.
    #[must_use]
    pub fn local(&self) -> Point {
        match self {
            Self::Pointer(ev) => ev.local,
            Self::Trigger(ev) => ev.local,
        }
    }

    #[must_use]
    pub fn device(&self) -> &DeviceDescriptor {
        match self {
            Self::Pointer(ev) => &ev.device,
            Self::Trigger(ev) => &ev.device,
        }
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::Pointer(ev) => ev.modifiers,
            Self::Trigger(ev) => ev.modifiers,
        }
    }
}
