use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::camera::Camera;
use crate::event::{Button, TriggerKind};
use crate::geometry::BoxGeometry;
use crate::pick::PickIndex;
use crate::render::PixelRect;
use crate::scene::{NodeId, Scene};
use crate::system::SceneSystem;
use crate::viewport::{Region, RegionViewport};

// =============================================================
// Helpers
// =============================================================

/// Picker returning whatever index the test last stored.
fn shared_picker() -> (Rc<Cell<PickIndex>>, impl Picker + 'static) {
    let index = Rc::new(Cell::new(BACKGROUND_PICK_INDEX));
    let handle = Rc::clone(&index);
    let picker = move |_: &Scene, _: &Camera, _: &RoutedEvent| -> PickIndex { handle.get() };
    (index, picker)
}

struct Fixture {
    view: RenderView,
    system: SceneSystem,
    pick: Rc<Cell<PickIndex>>,
    left: ViewportId,
    right: ViewportId,
    object: ObjectId,
    component: ComponentId,
    node: NodeId,
}

/// 800×600 canvas split into left and right halves, one box in the scene
/// at pick index 1.
fn fixture() -> Fixture {
    let mut scene = Scene::new();
    let node = scene.add_node("box", None).unwrap();
    let component = scene.add_component(node, BoxGeometry::default()).unwrap();
    let object = scene.object_of(component).unwrap();
    let system = SceneSystem::with_scene(scene, Camera::default());

    let (pick, picker) = shared_picker();
    let mut view = RenderView::new(picker);
    view.set_canvas_size(800.0, 600.0);
    let left = view.add_viewport(RegionViewport::new(Region::new(0.0, 0.0, 0.5, 1.0)));
    let right = view.add_viewport(RegionViewport::new(Region::new(0.5, 0.0, 0.5, 1.0)));
    Fixture { view, system, pick, left, right, object, component, node }
}

fn pointer(kind: PointerKind, x: f64, y: f64) -> PointerEvent {
    PointerEvent::new(kind, Point::new(x, y))
}

#[derive(Default)]
struct RecordingRenderer {
    viewports: Vec<PixelRect>,
    aspects: Vec<f32>,
}

impl Renderer for RecordingRenderer {
    fn set_viewport(&mut self, rect: PixelRect) {
        self.viewports.push(rect);
    }

    fn set_scissor(&mut self, _rect: Option<PixelRect>) {}

    fn render(&mut self, _scene: &Scene, camera: &Camera) {
        self.aspects.push(camera.aspect);
    }
}

/// Viewport that records how many events reached it.
#[derive(Default)]
struct CountingViewport {
    inner: RegionViewport,
    pointers: Rc<Cell<u32>>,
    triggers: Rc<Cell<u32>>,
}

impl Viewport for CountingViewport {
    fn enabled(&self) -> bool {
        self.inner.enabled()
    }

    fn is_point_inside(&self, x: f64, y: f64) -> bool {
        self.inner.is_point_inside(x, y)
    }

    fn device_x(&self, local_x: f64) -> f64 {
        self.inner.device_x(local_x)
    }

    fn device_y(&self, local_y: f64) -> f64 {
        self.inner.device_y(local_y)
    }

    fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.inner.set_canvas_size(width, height);
    }

    fn apply_viewport(&self, renderer: &mut dyn Renderer) {
        self.inner.apply_viewport(renderer);
    }

    fn frame_camera(&self, camera: &mut Camera) {
        self.inner.frame_camera(camera);
    }

    fn on_pointer(&mut self, _event: &mut RoutedEvent) {
        self.pointers.set(self.pointers.get() + 1);
    }

    fn on_trigger(&mut self, _event: &mut RoutedEvent) {
        self.triggers.set(self.triggers.get() + 1);
    }
}

// =============================================================
// route_event
// =============================================================

#[test]
fn hit_test_selects_the_viewport_under_the_point() {
    let mut f = fixture();
    let ev = f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Hover, 600.0, 300.0)), true, false);
    let ev = ev.unwrap();
    assert_eq!(ev.viewport, f.right);
    assert_eq!(ev.view, f.view.id());
    assert_eq!(ev.device, Point::new(0.0, 0.0));
    assert!(!ev.is_propagation_stopped());
    assert_eq!(f.view.gesture().viewport(), Some(f.right));
}

#[test]
fn hit_test_outside_every_viewport_produces_nothing() {
    let mut f = fixture();
    f.view.set_canvas_size(800.0, 600.0);
    let ev = f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Hover, 900.0, 10.0)), true, false);
    assert!(ev.is_none());
    assert_eq!(f.view.gesture().viewport(), None);
}

#[test]
fn first_registered_viewport_wins_overlaps() {
    let mut f = fixture();
    let overlay = f.view.add_viewport(RegionViewport::default());
    let ev = f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Hover, 10.0, 10.0)), true, false);
    assert_eq!(ev.unwrap().viewport, f.left);
    assert_ne!(f.left, overlay);
}

#[test]
fn disabled_viewports_are_skipped() {
    let mut f = fixture();
    let overlay = f.view.add_viewport(RegionViewport::default());
    f.view.viewport_as_mut::<RegionViewport>(f.left).unwrap().set_enabled(false);
    let ev = f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Hover, 10.0, 10.0)), true, false);
    assert_eq!(ev.unwrap().viewport, overlay);
}

#[test]
fn no_hit_test_and_no_prior_viewport_produces_nothing() {
    let mut f = fixture();
    let ev = f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Move, 10.0, 10.0)), false, false);
    assert!(ev.is_none());
}

#[test]
fn pick_resolves_object_component_and_node() {
    let mut f = fixture();
    f.pick.set(1);
    let ev = f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Down, 100.0, 100.0)), true, true);
    let ev = ev.unwrap();
    assert_eq!(ev.object, Some(f.object));
    assert_eq!(ev.component, Some(f.component));
    assert_eq!(ev.node, Some(f.node));
    assert_eq!(f.view.gesture().object(), Some(f.object));
    assert_eq!(f.view.gesture().component(), Some(f.component));
}

#[test]
fn background_pick_clears_object_and_component() {
    let mut f = fixture();
    f.pick.set(1);
    f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Down, 100.0, 100.0)), true, true);
    f.pick.set(BACKGROUND_PICK_INDEX);
    let ev = f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Down, 100.0, 100.0)), true, true);
    let ev = ev.unwrap();
    assert_eq!(ev.object, None);
    assert_eq!(ev.component, None);
    assert_eq!(ev.node, None);
    assert_eq!(f.view.gesture().object(), None);
}

#[test]
fn unknown_pick_index_resolves_to_nothing() {
    let mut f = fixture();
    f.pick.set(77);
    let ev = f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Down, 100.0, 100.0)), true, true);
    let ev = ev.unwrap();
    assert_eq!(ev.viewport, f.left);
    assert_eq!((ev.object, ev.component), (None, None));
}

#[test]
fn pick_without_scene_resolves_to_nothing() {
    let mut f = fixture();
    f.pick.set(1);
    f.system.set_scene(None);
    let ev = f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Down, 100.0, 100.0)), true, true);
    let ev = ev.unwrap();
    assert_eq!(ev.viewport, f.left);
    assert_eq!(ev.object, None);
}

#[test]
fn sticky_move_reuses_viewport_and_object() {
    let mut f = fixture();
    f.pick.set(1);
    f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Down, 100.0, 100.0)), true, true);
    // The pointer has left the object and crossed into the other viewport.
    f.pick.set(BACKGROUND_PICK_INDEX);
    let ev = f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Move, 700.0, 100.0)), false, false);
    let ev = ev.unwrap();
    assert_eq!(ev.viewport, f.left);
    assert_eq!(ev.object, Some(f.object));
    assert_eq!(ev.node, Some(f.node));
    // Device coordinates still come from the owning viewport.
    assert!(ev.device.x > 1.0);
}

#[test]
fn sticky_routing_stops_when_viewport_is_disabled() {
    let mut f = fixture();
    f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Down, 100.0, 100.0)), true, true);
    f.view.viewport_as_mut::<RegionViewport>(f.left).unwrap().set_enabled(false);
    let ev = f.view.route_event(&f.system, InputEvent::Pointer(pointer(PointerKind::Move, 100.0, 100.0)), false, false);
    assert!(ev.is_none());
}

// =============================================================
// Dispatch policy
// =============================================================

#[test]
fn hover_hit_tests_without_picking() {
    let mut f = fixture();
    f.pick.set(1);
    let ev = f.view.dispatch_pointer(&mut f.system, pointer(PointerKind::Hover, 600.0, 100.0)).unwrap();
    assert_eq!(ev.viewport, f.right);
    assert_eq!(ev.object, None);
}

#[test]
fn primary_down_hit_tests_and_picks() {
    let mut f = fixture();
    f.pick.set(1);
    let ev = f.view.dispatch_pointer(&mut f.system, pointer(PointerKind::Down, 600.0, 100.0)).unwrap();
    assert_eq!(ev.viewport, f.right);
    assert_eq!(ev.object, Some(f.object));
}

#[test]
fn secondary_down_is_sticky() {
    let mut f = fixture();
    f.view.dispatch_pointer(&mut f.system, pointer(PointerKind::Hover, 100.0, 100.0));
    f.pick.set(1);
    let ev = f
        .view
        .dispatch_pointer(&mut f.system, pointer(PointerKind::Down, 600.0, 100.0).with_button(Button::Secondary))
        .unwrap();
    assert_eq!(ev.viewport, f.left);
    assert_eq!(ev.object, None);
}

#[test]
fn drag_sequence_stays_on_its_object() {
    let mut f = fixture();
    f.pick.set(1);
    assert!(f.view.on_pointer(&mut f.system, pointer(PointerKind::Down, 100.0, 100.0)));
    f.pick.set(BACKGROUND_PICK_INDEX);
    let moved = f.view.dispatch_pointer(&mut f.system, pointer(PointerKind::Move, 650.0, 100.0)).unwrap();
    let up = f.view.dispatch_pointer(&mut f.system, pointer(PointerKind::Up, 650.0, 100.0)).unwrap();
    for ev in [moved, up] {
        assert_eq!(ev.viewport, f.left);
        assert_eq!(ev.object, Some(f.object));
        assert_eq!(ev.component, Some(f.component));
    }
}

#[test]
fn trigger_always_hit_tests_and_picks() {
    let mut f = fixture();
    f.view.dispatch_pointer(&mut f.system, pointer(PointerKind::Hover, 100.0, 100.0));
    f.pick.set(1);
    let ev = f
        .view
        .dispatch_trigger(&mut f.system, TriggerEvent::new(TriggerKind::Press, Point::new(600.0, 100.0)))
        .unwrap();
    assert_eq!(ev.viewport, f.right);
    assert_eq!(ev.object, Some(f.object));
    assert!(ev.trigger().is_some());
}

#[test]
fn unrouted_events_are_not_consumed() {
    let mut f = fixture();
    assert!(!f.view.on_pointer(&mut f.system, pointer(PointerKind::Hover, -5.0, 10.0)));
    assert!(!f.view.on_trigger(&mut f.system, TriggerEvent::new(TriggerKind::Press, Point::new(801.0, 10.0))));
}

#[test]
fn system_sees_event_before_viewport_and_can_stop_it() {
    let mut f = fixture();
    let pointers = Rc::new(Cell::new(0));
    let triggers = Rc::new(Cell::new(0));
    let counting = CountingViewport {
        inner: RegionViewport::default(),
        pointers: Rc::clone(&pointers),
        triggers: Rc::clone(&triggers),
    };
    let mut view = RenderView::new(|_: &Scene, _: &Camera, _: &RoutedEvent| -> PickIndex { 0 });
    view.add_viewport(counting);
    view.set_canvas_size(100.0, 100.0);

    assert!(view.on_pointer(&mut f.system, pointer(PointerKind::Hover, 10.0, 10.0)));
    assert_eq!(pointers.get(), 1);

    f.system.add_pointer_listener(RoutedEvent::stop_propagation);
    let ev = view.dispatch_pointer(&mut f.system, pointer(PointerKind::Hover, 10.0, 10.0)).unwrap();
    assert!(ev.is_propagation_stopped());
    assert_eq!(pointers.get(), 1);

    assert!(view.on_trigger(&mut f.system, TriggerEvent::new(TriggerKind::Press, Point::new(10.0, 10.0))));
    assert_eq!(triggers.get(), 1);
}

// =============================================================
// Viewport registry
// =============================================================

#[test]
fn removing_unknown_viewport_fails() {
    let mut f = fixture();
    f.view.remove_viewport(f.left).unwrap();
    assert!(matches!(f.view.remove_viewport(f.left), Err(ViewError::ViewportNotFound(id)) if id == f.left));
}

#[test]
fn removal_keeps_remaining_order() {
    let mut f = fixture();
    let third = f.view.add_viewport(RegionViewport::default());
    f.view.remove_viewport(f.right).unwrap();
    assert_eq!(f.view.viewport_ids(), vec![f.left, third]);
    assert!(f.view.viewport(f.right).is_none());
}

#[test]
fn removing_the_active_viewport_resets_the_gesture() {
    let mut f = fixture();
    f.pick.set(1);
    f.view.on_pointer(&mut f.system, pointer(PointerKind::Down, 100.0, 100.0));
    f.view.remove_viewport(f.left).unwrap();
    assert_eq!(*f.view.gesture(), GestureState::default());
    assert!(!f.view.on_pointer(&mut f.system, pointer(PointerKind::Move, 100.0, 100.0)));
}

#[test]
fn removing_another_viewport_keeps_the_gesture() {
    let mut f = fixture();
    f.pick.set(1);
    f.view.on_pointer(&mut f.system, pointer(PointerKind::Down, 100.0, 100.0));
    f.view.remove_viewport(f.right).unwrap();
    assert_eq!(f.view.gesture().viewport(), Some(f.left));
    assert_eq!(f.view.gesture().object(), Some(f.object));
}

#[test]
fn added_viewports_get_the_canvas_size() {
    let mut f = fixture();
    let id = f.view.add_viewport(RegionViewport::default());
    let rect = f.view.viewport_as::<RegionViewport>(id).unwrap().rect();
    assert_eq!(rect, PixelRect::new(0.0, 0.0, 800.0, 600.0));
}

#[test]
fn zero_canvas_yields_no_hits() {
    let mut f = fixture();
    f.view.set_canvas_size(0.0, 0.0);
    assert!(!f.view.on_pointer(&mut f.system, pointer(PointerKind::Hover, 0.0, 0.0)));
}

#[test]
fn attach_and_detach_register_with_the_system() {
    let mut f = fixture();
    f.view.attach(&mut f.system);
    assert_eq!(f.system.attached_views(), &[f.view.id()]);
    f.view.detach(&mut f.system);
    assert!(f.system.attached_views().is_empty());
}

// =============================================================
// Render
// =============================================================

#[test]
fn render_walks_enabled_viewports_in_order() {
    let mut f = fixture();
    f.view.set_canvas_size(800.0, 200.0);
    let mut renderer = RecordingRenderer::default();
    assert!(f.view.render(&mut f.system, &mut renderer, 0.016));
    assert_eq!(
        renderer.viewports,
        vec![PixelRect::new(0.0, 0.0, 400.0, 200.0), PixelRect::new(400.0, 0.0, 400.0, 200.0)]
    );
    assert_eq!(renderer.aspects, vec![2.0, 2.0]);
    assert_eq!(f.system.frames(), 1);
    assert_eq!(f.view.frame(), 1);

    f.view.viewport_as_mut::<RegionViewport>(f.left).unwrap().set_enabled(false);
    let mut renderer = RecordingRenderer::default();
    f.view.render(&mut f.system, &mut renderer, 0.016);
    assert_eq!(renderer.viewports.len(), 1);
}

#[test]
fn render_without_camera_is_skipped() {
    let mut f = fixture();
    f.system.set_camera(None);
    let mut renderer = RecordingRenderer::default();
    assert!(!f.view.render(&mut f.system, &mut renderer, 0.016));
    assert!(renderer.viewports.is_empty());
    assert_eq!(f.system.frames(), 0);
}
