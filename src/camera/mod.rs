//! 2D camera
//!
//! Position, zoom and rotation are driven by direct sets, held directional
//! input or a proportional follow controller. A screen shake offsets the
//! view pivot and can freeze every other kind of movement while it runs.

mod shake;
mod view_scale;

pub use shake::{Shake, ShakeParams};
pub use view_scale::{ViewScale, ViewScaleState};

use std::cell::Cell;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{CoreError, CoreResult};
use crate::normalize_angle;

/// Half extents of the screen in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub half_width: f32,
    pub half_height: f32,
}

impl Viewport {
    pub fn new(half_width: f32, half_height: f32) -> CoreResult<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(half_width) || !valid(half_height) {
            return Err(CoreError::InvalidViewport {
                half_width,
                half_height,
            });
        }
        Ok(Self {
            half_width,
            half_height,
        })
    }

    /// Viewport from full screen dimensions
    pub fn from_size(width: f32, height: f32) -> CoreResult<Self> {
        Self::new(width * 0.5, height * 0.5)
    }
}

/// Use `custom` when it is a positive finite speed, otherwise `default`
pub fn validate_speed(custom: Option<f32>, default: f32) -> f32 {
    match custom {
        None => default,
        Some(speed) if speed.is_finite() && speed > 0.0 => speed,
        Some(speed) => {
            log::warn!("Invalid camera speed {}, using default {}", speed, default);
            default
        }
    }
}

/// Controller speeds (per millisecond)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSpeeds {
    pub movement: f32,
    pub zoom: f32,
    pub rotation: f32,
    pub follow: f32,
}

impl Default for CameraSpeeds {
    fn default() -> Self {
        Self {
            movement: CAMERA_MOVE_SPEED,
            zoom: CAMERA_ZOOM_SPEED,
            rotation: CAMERA_ROTATE_SPEED,
            follow: CAMERA_RETURN_SPEED,
        }
    }
}

impl CameraSpeeds {
    /// Defaults with validated overrides
    pub fn with_overrides(
        movement: Option<f32>,
        zoom: Option<f32>,
        rotation: Option<f32>,
        follow: Option<f32>,
    ) -> Self {
        Self {
            movement: validate_speed(movement, CAMERA_MOVE_SPEED),
            zoom: validate_speed(zoom, CAMERA_ZOOM_SPEED),
            rotation: validate_speed(rotation, CAMERA_ROTATE_SPEED),
            follow: validate_speed(follow, CAMERA_RETURN_SPEED),
        }
    }
}

/// Held movement input in screen space (+y is down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveDirection {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl MoveDirection {
    pub fn vector(self) -> Vec2 {
        match self {
            MoveDirection::None => Vec2::ZERO,
            MoveDirection::Up => Vec2::new(0.0, -1.0),
            MoveDirection::Down => Vec2::new(0.0, 1.0),
            MoveDirection::Left => Vec2::new(-1.0, 0.0),
            MoveDirection::Right => Vec2::new(1.0, 0.0),
            MoveDirection::UpLeft => Vec2::new(-1.0, -1.0),
            MoveDirection::UpRight => Vec2::new(1.0, -1.0),
            MoveDirection::DownLeft => Vec2::new(-1.0, 1.0),
            MoveDirection::DownRight => Vec2::new(1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZoomDirection {
    #[default]
    None,
    In,
    Out,
}

impl ZoomDirection {
    fn sign(self) -> f32 {
        match self {
            ZoomDirection::None => 0.0,
            ZoomDirection::In => 1.0,
            ZoomDirection::Out => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotateDirection {
    #[default]
    None,
    Left,
    Right,
}

impl RotateDirection {
    fn sign(self) -> f32 {
        match self {
            RotateDirection::None => 0.0,
            RotateDirection::Left => -1.0,
            RotateDirection::Right => 1.0,
        }
    }
}

/// Transform a renderer applies to the world layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// World point placed at the layer origin (camera position plus shake)
    pub pivot: Vec2,
    pub scale: f32,
    /// World rotation, opposite to the camera's
    pub rotation: f32,
}

/// Anything that can take the camera's view transform
pub trait ViewTarget {
    fn apply_view(&mut self, view: &ViewTransform);
}

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec2,
    zoom: f32,
    rotation: f32,
    speeds: CameraSpeeds,
    follow: Option<Vec2>,
    move_direction: MoveDirection,
    zoom_direction: ZoomDirection,
    rotate_direction: RotateDirection,
    shake: Shake,
    viewport: Viewport,
    /// (radius², radius), cleared when zoom or viewport change
    view_radius: Cell<Option<(f32, f32)>>,
    last_applied: Option<ViewTransform>,
}

impl Camera {
    pub fn new(viewport: Viewport, speeds: CameraSpeeds) -> CoreResult<Self> {
        let viewport = Viewport::new(viewport.half_width, viewport.half_height)?;
        Ok(Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            rotation: 0.0,
            speeds,
            follow: None,
            move_direction: MoveDirection::None,
            zoom_direction: ZoomDirection::None,
            rotate_direction: RotateDirection::None,
            shake: Shake::new(),
            viewport,
            view_radius: Cell::new(None),
            last_applied: None,
        })
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn speeds(&self) -> CameraSpeeds {
        self.speeds
    }

    // Direct sets are ignored while a freezing shake runs

    pub fn set_position(&mut self, position: Vec2) {
        if self.shake.is_frozen() {
            return;
        }
        self.position = position;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if self.shake.is_frozen() || !zoom.is_finite() {
            return;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.view_radius.set(None);
    }

    pub fn set_rotation(&mut self, angle: f32) {
        if self.shake.is_frozen() || !angle.is_finite() {
            return;
        }
        self.rotation = normalize_angle(angle);
    }

    pub fn set_move_direction(&mut self, direction: MoveDirection) {
        self.move_direction = direction;
    }

    pub fn set_zoom_direction(&mut self, direction: ZoomDirection) {
        self.zoom_direction = direction;
    }

    pub fn set_rotate_direction(&mut self, direction: RotateDirection) {
        self.rotate_direction = direction;
    }

    /// Release all held inputs
    pub fn stop(&mut self) {
        self.move_direction = MoveDirection::None;
        self.zoom_direction = ZoomDirection::None;
        self.rotate_direction = RotateDirection::None;
    }

    /// Follow a world point; the owner refreshes it every tick for moving targets
    pub fn follow(&mut self, target: Vec2) {
        self.follow = Some(target);
    }

    pub fn clear_follow(&mut self) {
        self.follow = None;
    }

    pub fn follow_target(&self) -> Option<Vec2> {
        self.follow
    }

    /// Within `threshold` of the follow target (true without a target)
    pub fn is_on_target(&self, threshold: f32) -> bool {
        match self.follow {
            Some(target) => target.distance_squared(self.position) < threshold * threshold,
            None => true,
        }
    }

    pub fn shake(&mut self, params: ShakeParams) {
        self.shake.start(params);
        if self.shake.is_frozen() {
            self.stop();
        }
    }

    pub fn stop_shake(&mut self) {
        self.shake.stop();
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.is_active()
    }

    pub fn shake_offset(&self) -> Vec2 {
        self.shake.offset()
    }

    /// Apply a new screen size; invalid sizes are ignored
    pub fn screen_resize(&mut self, half_width: f32, half_height: f32) -> bool {
        match Viewport::new(half_width, half_height) {
            Ok(viewport) => {
                self.viewport = viewport;
                self.view_radius.set(None);
                true
            }
            Err(e) => {
                log::warn!("Camera resize ignored: {}", e);
                false
            }
        }
    }

    pub fn tick(&mut self, delta_ms: f32) {
        if !self.shake.is_frozen() {
            self.tick_movement(delta_ms);
        }
        self.shake.update(delta_ms);
    }

    fn tick_movement(&mut self, delta_ms: f32) {
        let input = self.move_direction.vector();
        if input != Vec2::ZERO {
            // Screen-up stays "forward" whatever the rotation
            let world = Vec2::from_angle(self.rotation).rotate(input);
            self.position += world * self.speeds.movement * delta_ms;
        }

        let on_target = self.is_on_target(CAMERA_ON_TARGET_THRESHOLD);
        if let Some(target) = self.follow.filter(|_| !on_target) {
            let distance = target - self.position;
            let gain = self.speeds.follow
                * (distance.length_squared() * CAMERA_FOLLOW_GAIN).min(1.0)
                * delta_ms;
            self.position += distance * gain.clamp(0.0, 1.0);
        }

        if self.zoom_direction != ZoomDirection::None {
            self.zoom += self.zoom_direction.sign() * self.speeds.zoom * self.zoom * delta_ms;
            self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
            self.view_radius.set(None);
        }

        if self.rotate_direction != RotateDirection::None {
            self.rotation = normalize_angle(
                self.rotation + self.rotate_direction.sign() * self.speeds.rotation * delta_ms,
            );
        }
    }

    fn view_radius(&self) -> (f32, f32) {
        if let Some(cached) = self.view_radius.get() {
            return cached;
        }
        let Viewport {
            half_width,
            half_height,
        } = self.viewport;
        let radius_sq =
            (half_width * half_width + half_height * half_height) / (self.zoom * self.zoom);
        let cached = (radius_sq, radius_sq.sqrt());
        self.view_radius.set(Some(cached));
        cached
    }

    /// Whether a world point with on-screen radius `radius` can be seen
    pub fn is_visible(&self, point: Vec2, radius: f32) -> bool {
        let distance_sq = point.distance_squared(self.position);
        let (view_sq, view) = self.view_radius();
        let object = radius * self.zoom;
        distance_sq < view_sq + object * object + 2.0 * view * object
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.position) * self.zoom
            + Vec2::new(self.viewport.half_width, self.viewport.half_height)
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - Vec2::new(self.viewport.half_width, self.viewport.half_height)) / self.zoom
            + self.position
    }

    pub fn view_transform(&self) -> ViewTransform {
        ViewTransform {
            pivot: self.position + self.shake.offset(),
            scale: self.zoom,
            rotation: -self.rotation,
        }
    }

    /// Push the view transform to `target` if it changed since the last sync
    pub fn sync<T: ViewTarget + ?Sized>(&mut self, target: &mut T) -> bool {
        let view = self.view_transform();
        if self.last_applied == Some(view) {
            return false;
        }
        target.apply_view(&view);
        self.last_applied = Some(view);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn camera() -> Camera {
        Camera::new(Viewport::new(400.0, 300.0).unwrap(), CameraSpeeds::default()).unwrap()
    }

    #[derive(Default)]
    struct Layer {
        applied: usize,
        last: Option<ViewTransform>,
    }

    impl ViewTarget for Layer {
        fn apply_view(&mut self, view: &ViewTransform) {
            self.applied += 1;
            self.last = Some(*view);
        }
    }

    #[test]
    fn test_invalid_viewport_is_error() {
        let viewport = Viewport {
            half_width: 0.0,
            half_height: 300.0,
        };
        assert!(matches!(
            Camera::new(viewport, CameraSpeeds::default()),
            Err(CoreError::InvalidViewport { .. })
        ));
        assert!(Viewport::from_size(800.0, f32::NAN).is_err());
    }

    #[test]
    fn test_speed_validation() {
        assert_eq!(validate_speed(None, 0.1), 0.1);
        assert_eq!(validate_speed(Some(0.5), 0.1), 0.5);
        assert_eq!(validate_speed(Some(-2.0), 0.1), 0.1);
        assert_eq!(validate_speed(Some(f32::INFINITY), 0.1), 0.1);
        let speeds = CameraSpeeds::with_overrides(Some(0.0), Some(0.002), None, None);
        assert_eq!(speeds.movement, CAMERA_MOVE_SPEED);
        assert_eq!(speeds.zoom, 0.002);
    }

    #[test]
    fn test_visibility_scenario() {
        let cam = camera();
        assert!(cam.is_visible(Vec2::ZERO, 0.0));
        assert!(!cam.is_visible(Vec2::new(10000.0, 10000.0), 0.0));
        // View radius is 500 at zoom 1
        assert!(cam.is_visible(Vec2::new(499.0, 0.0), 0.0));
        assert!(!cam.is_visible(Vec2::new(501.0, 0.0), 0.0));
        assert!(cam.is_visible(Vec2::new(501.0, 0.0), 2.0));
    }

    #[test]
    fn test_zoom_invalidates_view_radius() {
        let mut cam = camera();
        assert!(!cam.is_visible(Vec2::new(900.0, 0.0), 0.0));
        cam.set_zoom(0.5);
        assert!(cam.is_visible(Vec2::new(900.0, 0.0), 0.0));
        cam.set_zoom(100.0);
        assert_eq!(cam.zoom(), MAX_ZOOM);
    }

    #[test]
    fn test_resize_invalidates_view_radius() {
        let mut cam = camera();
        assert!(!cam.is_visible(Vec2::new(600.0, 0.0), 0.0));
        assert!(cam.screen_resize(800.0, 600.0));
        assert!(cam.is_visible(Vec2::new(600.0, 0.0), 0.0));
        assert!(!cam.screen_resize(-1.0, 600.0));
        assert_eq!(cam.viewport().half_width, 800.0);
    }

    #[test]
    fn test_screen_world_roundtrip() {
        let mut cam = camera();
        cam.set_position(Vec2::new(120.0, -40.0));
        cam.set_zoom(2.5);
        let world = Vec2::new(33.0, 71.0);
        let back = cam.screen_to_world(cam.world_to_screen(world));
        assert!(back.distance(world) < 1e-3);
        assert_eq!(cam.world_to_screen(cam.position()), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_movement_follows_rotation() {
        let mut cam = camera();
        cam.set_rotation(std::f32::consts::FRAC_PI_2);
        cam.set_move_direction(MoveDirection::Up);
        cam.tick(100.0);
        // Screen-up (0,-1) rotated a quarter turn points along +x
        assert!((cam.position().x - 10.0).abs() < 1e-4);
        assert!(cam.position().y.abs() < 1e-4);
    }

    #[test]
    fn test_zoom_and_rotate_accumulate() {
        let mut cam = camera();
        cam.set_zoom_direction(ZoomDirection::In);
        cam.set_rotate_direction(RotateDirection::Left);
        cam.tick(100.0);
        assert!((cam.zoom() - 1.1).abs() < 1e-6);
        assert!((cam.rotation() + 0.1).abs() < 1e-6);
        cam.stop();
        cam.tick(100.0);
        assert!((cam.zoom() - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_large_rotation_wraps() {
        use std::f32::consts::PI;
        let mut cam = camera();
        cam.set_rotation(1.0e9);
        assert!((-PI..PI).contains(&cam.rotation()));

        cam.set_rotation(0.0);
        cam.set_rotate_direction(RotateDirection::Right);
        cam.tick(1.0e9);
        assert!((-PI..PI).contains(&cam.rotation()));
    }

    #[test]
    fn test_freezing_shake_blocks_movement() {
        let mut cam = camera();
        cam.set_move_direction(MoveDirection::Right);
        cam.shake(ShakeParams::new(200.0, 5.0, 4.0, true));
        cam.set_position(Vec2::new(50.0, 50.0));
        cam.tick(16.0);
        assert_eq!(cam.position(), Vec2::ZERO);
        assert!(cam.is_shaking());
        for _ in 0..20 {
            cam.tick(16.0);
        }
        assert!(!cam.is_shaking());
        assert_eq!(cam.shake_offset(), Vec2::ZERO);
        cam.set_position(Vec2::new(50.0, 50.0));
        assert_eq!(cam.position(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_view_transform_and_sync() {
        let mut cam = camera();
        cam.set_position(Vec2::new(10.0, 20.0));
        cam.set_rotation(0.5);
        let mut layer = Layer::default();
        assert!(cam.sync(&mut layer));
        assert!(!cam.sync(&mut layer));
        assert_eq!(layer.applied, 1);
        let view = layer.last.unwrap();
        assert_eq!(view.pivot, Vec2::new(10.0, 20.0));
        assert_eq!(view.rotation, -0.5);
        cam.set_zoom(2.0);
        assert!(cam.sync(&mut layer));
        assert_eq!(layer.applied, 2);
    }

    proptest! {
        #[test]
        fn prop_follow_converges(
            x in -20000.0f32..20000.0,
            y in -20000.0f32..20000.0,
            dt in 1.0f32..100.0,
        ) {
            let mut cam = camera();
            cam.set_position(Vec2::new(x, y));
            let target = Vec2::new(37.0, -12.0);
            cam.follow(target);
            let mut last = cam.position().distance_squared(target);
            let mut ticks = 0;
            while !cam.is_on_target(CAMERA_ON_TARGET_THRESHOLD) {
                cam.tick(dt);
                let d = cam.position().distance_squared(target);
                prop_assert!(d < last);
                last = d;
                ticks += 1;
                prop_assert!(ticks < 20_000);
            }
        }
    }
}
