use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::EulerRot;
use bevy::prelude::*;
use constants::datasets::DatasetPreset;

use crate::engine::render::extraction::OpacityCamera;

/// Orbit camera around a focus point.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl ViewportCamera {
    pub fn looking_at(eye: Vec3, focus_point: Vec3) -> Self {
        let offset = eye - focus_point;
        let distance = offset.length().max(0.1);
        Self {
            focus_point,
            distance,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
        }
    }

    pub fn from_preset(preset: &DatasetPreset) -> Self {
        Self::looking_at(Vec3::from_array(preset.eye), Vec3::from_array(preset.look_at))
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, -self.pitch, 0.0)
    }

    pub fn eye(&self) -> Vec3 {
        self.focus_point + self.rotation() * Vec3::Z * self.distance
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).with_rotation(self.rotation())
    }
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
    }
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<OpacityCamera>>,
    mut viewport_camera: ResMut<ViewportCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    // Mouse motion with right click orbits
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        let yaw_sens = 0.0035;
        let pitch_sens = 0.0030;
        viewport_camera.yaw -= mouse_delta.x * yaw_sens;
        viewport_camera.pitch += mouse_delta.y * pitch_sens;
        viewport_camera.pitch = viewport_camera.pitch.clamp(-1.55, 1.55);
    }

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    // W/S dolly, A/D orbit horizontally
    let mut dolly = -scroll_accum * 0.1;
    if keyboard.pressed(KeyCode::KeyW) {
        dolly -= time.delta_secs();
    }
    if keyboard.pressed(KeyCode::KeyS) {
        dolly += time.delta_secs();
    }
    if keyboard.pressed(KeyCode::KeyA) {
        viewport_camera.yaw -= time.delta_secs();
    }
    if keyboard.pressed(KeyCode::KeyD) {
        viewport_camera.yaw += time.delta_secs();
    }

    // Shift = faster, ctrl = slower
    if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
        dolly *= 3.5;
    }
    if keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) {
        dolly *= 0.25;
    }
    if dolly != 0.0 {
        viewport_camera.distance = (viewport_camera.distance * (1.0 + dolly)).clamp(0.1, 200.0);
    }

    let target = viewport_camera.transform();
    let lerp_speed = (12.0 * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform
        .translation
        .lerp(target.translation, lerp_speed);
    camera_transform.rotation = camera_transform
        .rotation
        .slerp(target.rotation, lerp_speed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_round_trips_through_yaw_and_pitch() {
        let eye = Vec3::new(11.0, 21.0, -25.0);
        let focus = Vec3::splat(10.0);
        let camera = ViewportCamera::looking_at(eye, focus);
        assert!(camera.eye().distance(eye) < 1e-3);

        let forward = camera.transform().forward();
        assert!(forward.dot((focus - eye).normalize()) > 0.999);
    }
}
