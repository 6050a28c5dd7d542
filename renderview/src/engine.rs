//! Browser glue: binds a [`RenderView`] and a [`SceneSystem`] to a canvas
//! element and translates DOM input into the routing model.
//!
//! The translation helpers ([`PointerTracker`], [`button_from_dom`],
//! [`device_kind_from_pointer_type`], [`wheel_delta_px`]) are plain functions
//! over primitive values so they can be tested without a browser.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::BTreeMap;

use tracing::warn;
use wasm_bindgen::JsValue;
use web_sys::{HtmlCanvasElement, HtmlElement, MouseEvent, WheelEvent};

use crate::event::{Button, DeviceDescriptor, DeviceKind, Modifiers, Point, PointerEvent, PointerKind};
use crate::pick::Picker;
use crate::render::Renderer;
use crate::sprite::{DomSpriteLayer, SpriteOverlay};
use crate::system::SceneSystem;
use crate::view::RenderView;

/// Pixels per line for `DOM_DELTA_LINE` wheel events.
const WHEEL_LINE_PX: f64 = 16.0;

/// Phase of a raw DOM pointer event, before hover/move disambiguation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomPointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Active pointers by DOM pointer id, in press order.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    active: BTreeMap<i32, (u64, Point)>,
    seq: u64,
}

impl PointerTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a DOM pointer event and return its routing kind together with
    /// the positions of every pointer down at that moment (oldest first).
    /// A move with no pointer down is a hover.
    pub fn track(&mut self, phase: DomPointerPhase, id: i32, at: Point) -> (PointerKind, Vec<Point>) {
        let kind = match phase {
            DomPointerPhase::Down => {
                self.seq += 1;
                self.active.insert(id, (self.seq, at));
                PointerKind::Down
            }
            DomPointerPhase::Move => match self.active.get_mut(&id) {
                Some(entry) => {
                    entry.1 = at;
                    PointerKind::Move
                }
                None => PointerKind::Hover,
            },
            DomPointerPhase::Up | DomPointerPhase::Cancel => {
                let positions = self.positions();
                self.active.remove(&id);
                let kind = if phase == DomPointerPhase::Up { PointerKind::Up } else { PointerKind::Cancel };
                return (kind, if positions.is_empty() { vec![at] } else { positions });
            }
        };
        let positions = self.positions();
        (kind, if positions.is_empty() { vec![at] } else { positions })
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    fn positions(&self) -> Vec<Point> {
        let mut entries: Vec<(u64, Point)> = self.active.values().copied().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, p)| p).collect()
    }
}

/// `MouseEvent.button` to [`Button`]. Back/forward buttons count as primary.
#[must_use]
pub fn button_from_dom(button: i16) -> Button {
    match button {
        1 => Button::Middle,
        2 => Button::Secondary,
        _ => Button::Primary,
    }
}

#[must_use]
pub fn device_kind_from_pointer_type(pointer_type: &str) -> DeviceKind {
    match pointer_type {
        "mouse" => DeviceKind::Mouse,
        "pen" => DeviceKind::Pen,
        "touch" => DeviceKind::Touch,
        _ => DeviceKind::Unknown,
    }
}

/// Wheel delta in pixels for a `WheelEvent.deltaMode` (0 pixel, 1 line,
/// 2 page).
#[must_use]
pub fn wheel_delta_px(delta: f64, mode: u32, page_height: f64) -> f64 {
    match mode {
        1 => delta * WHEEL_LINE_PX,
        2 => delta * page_height,
        _ => delta,
    }
}

fn modifiers_of(event: &MouseEvent) -> Modifiers {
    Modifiers {
        shift: event.shift_key(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        meta: event.meta_key(),
    }
}

/// A render view bound to one canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub view: RenderView,
    pub system: SceneSystem,
    sprites: Option<SpriteOverlay<DomSpriteLayer>>,
    pointers: PointerTracker,
}

impl Engine {
    /// Bind a view to `canvas`, attach it to `system`, and size it to the
    /// canvas.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, system: SceneSystem, picker: impl Picker + 'static) -> Self {
        let mut engine = Self {
            canvas,
            view: RenderView::new(picker),
            system,
            sprites: None,
            pointers: PointerTracker::new(),
        };
        engine.view.attach(&mut engine.system);
        engine.resize();
        engine
    }

    /// Overlay sprites in `container`, which should cover the canvas.
    ///
    /// # Errors
    ///
    /// Fails if the container is not in a document.
    pub fn set_sprite_container(&mut self, container: HtmlElement) -> Result<(), JsValue> {
        self.detach_sprites()?;
        self.sprites = Some(SpriteOverlay::new(DomSpriteLayer::new(container)?));
        Ok(())
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Re-read the canvas's CSS size and propagate it to the viewports.
    pub fn resize(&mut self) {
        let width = f64::from(self.canvas.client_width());
        let height = f64::from(self.canvas.client_height());
        self.view.set_canvas_size(width, height);
    }

    // --- Input ---

    /// Route a DOM pointer event. Returns whether a viewport consumed it.
    pub fn on_pointer(&mut self, event: &web_sys::PointerEvent, phase: DomPointerPhase) -> bool {
        let local = Point::new(f64::from(event.offset_x()), f64::from(event.offset_y()));
        let (kind, positions) = self.pointers.track(phase, event.pointer_id(), local);
        let (width, height) = self.view.canvas_size();

        let mut pointer = PointerEvent::new(kind, local)
            .with_button(button_from_dom(event.button()))
            .with_movement(f64::from(event.movement_x()), f64::from(event.movement_y()))
            .with_modifiers(modifiers_of(event))
            .with_primary(event.is_primary())
            .with_positions(positions)
            .with_device(DeviceDescriptor {
                kind: device_kind_from_pointer_type(&event.pointer_type()),
                id: event.pointer_id(),
            });
        pointer.inside = local.x >= 0.0 && local.y >= 0.0 && local.x < width && local.y < height;
        self.view.on_pointer(&mut self.system, pointer)
    }

    /// Route a DOM wheel event as a [`PointerKind::Wheel`].
    pub fn on_wheel(&mut self, event: &WheelEvent) -> bool {
        let local = Point::new(f64::from(event.offset_x()), f64::from(event.offset_y()));
        let (_, height) = self.view.canvas_size();
        let delta = wheel_delta_px(event.delta_y(), event.delta_mode(), height);
        let pointer = PointerEvent::new(PointerKind::Wheel, local)
            .with_movement(0.0, delta)
            .with_modifiers(modifiers_of(event));
        self.view.on_pointer(&mut self.system, pointer)
    }

    /// Drop every tracked pointer, e.g. when the window loses focus.
    pub fn reset_pointers(&mut self) {
        self.pointers.clear();
    }

    // --- Frame ---

    /// Render a frame, then move sprite overlays to their new positions.
    ///
    /// # Errors
    ///
    /// DOM failures while syncing sprites.
    pub fn frame(&mut self, renderer: &mut dyn Renderer, dt: f64) -> Result<bool, JsValue> {
        let drawn = self.view.render(&mut self.system, renderer, dt);
        if let (Some(overlay), Some(scene)) = (self.sprites.as_mut(), self.system.scene_mut()) {
            overlay.sync(scene)?;
        }
        Ok(drawn)
    }

    fn detach_sprites(&mut self) -> Result<(), JsValue> {
        if let Some(overlay) = self.sprites.as_mut() {
            overlay.detach(self.system.scene_mut())?;
        }
        self.sprites = None;
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.view.detach(&mut self.system);
        if let Err(err) = self.detach_sprites() {
            warn!(?err, "sprite teardown failed");
        }
    }
}
