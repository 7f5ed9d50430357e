use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec3};
use once_cell::sync::Lazy;

use crate::callable::{FieldRegistry, Reflect};
use crate::error::{ConfigError, FieldError};
use crate::value::Value;

const DEFAULT_FOV: f32 = 45.0;
const DEFAULT_HORIZONTAL_ANGLE: f32 = PI;
const DEFAULT_VERTICAL_ANGLE: f32 = 0.0;
const DEFAULT_SPEED: f32 = 0.1;
const DEFAULT_MOUSE_SPEED: f32 = 0.005;
const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 10.0);

/// How the view matrix is derived.
///
/// The variant changes only through [`Camera::look_at`] (to `Manual`) and
/// the angle setters / [`Camera::compute_view`] (to `Auto`).  Moving the
/// camera keeps whichever variant is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    /// View follows yaw/pitch angles (radians).
    Auto {
        horizontal_angle: f32,
        vertical_angle: f32,
    },
    /// View looks at an explicit target with an explicit up vector.
    Manual { target: Vec3, up: Vec3 },
}

/// Scriptable perspective camera owned by the scene.
///
/// Renderer code only needs [`Camera::build_view_projection_matrix`]; the
/// rest of the surface is exposed to scripts through the `camera` field
/// registry.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    mode: ViewMode,
    // --- projection parameters --------------------------------------------
    /// vertical field of view, degrees
    fov: f32,
    aspect: f32,
    near_clip: f32,
    far_clip: f32,
    // --- movement tuning, read by controllers ------------------------------
    speed: f32,
    mouse_speed: f32,
    // --- derived -------------------------------------------------------------
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Camera with engine defaults for a viewport of the given aspect ratio.
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            position: DEFAULT_POSITION,
            mode: ViewMode::Auto {
                horizontal_angle: DEFAULT_HORIZONTAL_ANGLE,
                vertical_angle: DEFAULT_VERTICAL_ANGLE,
            },
            fov: DEFAULT_FOV,
            aspect,
            near_clip: 0.1,
            far_clip: 1000.0,
            speed: DEFAULT_SPEED,
            mouse_speed: DEFAULT_MOUSE_SPEED,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.compute_view();
        camera.compute_projection();
        camera
    }

    /// Builds a camera from an authored node.
    ///
    /// Recognised keys: `fov` (clamped to 15..=90), `horizontal_angle`,
    /// `vertical_angle`, `speed`, `mouse_speed`, `position` and `lookat`
    /// (a map of `position`, `target` and `up` triples that selects the
    /// manual view mode).
    pub fn from_config(node: &Value, aspect: f32) -> Result<Self, ConfigError> {
        let mut camera = Self::new(aspect);
        let (mut h, mut v) = (DEFAULT_HORIZONTAL_ANGLE, DEFAULT_VERTICAL_ANGLE);

        if let Some(fov) = decimal_key(node, "fov")? {
            camera.fov = fov.clamp(15.0, 90.0);
        }
        if let Some(angle) = decimal_key(node, "horizontal_angle")? {
            h = angle;
        }
        if let Some(angle) = decimal_key(node, "vertical_angle")? {
            v = angle;
        }
        if let Some(speed) = decimal_key(node, "speed")? {
            camera.speed = speed;
        }
        if let Some(speed) = decimal_key(node, "mouse_speed")? {
            camera.mouse_speed = speed;
        }
        if let Some(position) = node.get("position") {
            camera.position = position
                .expect_vec3("position")
                .map_err(|_| ConfigError::malformed("position", "a list of 3 decimals", position))?;
        }

        match node.get("lookat") {
            Some(la) => {
                let triple = |key: &'static str| {
                    la.get(key).and_then(|t| t.expect_vec3(key).ok()).ok_or_else(|| {
                        ConfigError::malformed(
                            "lookat",
                            "a map having 'position', 'target' and 'up' as tuples",
                            la,
                        )
                    })
                };
                let (position, target, up) =
                    (triple("position")?, triple("target")?, triple("up")?);
                camera.look_at(position, target, up);
            }
            None => camera.set_angles(h, v),
        }
        camera.compute_projection();
        Ok(camera)
    }

    /// Serialises the state worth persisting; defaults are omitted.
    pub fn write(&self) -> Value {
        let mut out = Value::map();
        if self.fov != DEFAULT_FOV {
            out = out.with("fov", self.fov);
        }
        let (h, v) = self.angles();
        if h != DEFAULT_HORIZONTAL_ANGLE {
            out = out.with("horizontal_angle", h);
        }
        if v != DEFAULT_VERTICAL_ANGLE {
            out = out.with("vertical_angle", v);
        }
        if self.speed != DEFAULT_SPEED {
            out = out.with("speed", self.speed);
        }
        if self.mouse_speed != DEFAULT_MOUSE_SPEED {
            out = out.with("mouse_speed", self.mouse_speed);
        }
        out.with("position", self.position)
    }

    // ── view ────────────────────────────────────────────────────────────────

    /// Switches to manual mode and looks from `position` at `target`.
    pub fn look_at(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        if matches!(self.mode, ViewMode::Auto { .. }) {
            log::debug!("camera: switching to manual view");
        }
        self.position = position;
        self.mode = ViewMode::Manual { target, up };
        self.view = Mat4::look_at_rh(position, target, up);
    }

    /// Switches to auto mode, keeping the current look direction, and
    /// recomputes the view from the angles.
    pub fn compute_view(&mut self) {
        let (h, v) = self.angles();
        self.set_angles(h, v);
    }

    /// Sets both angles (radians); always leaves the camera in auto mode.
    pub fn set_angles(&mut self, horizontal: f32, vertical: f32) {
        if matches!(self.mode, ViewMode::Manual { .. }) {
            log::debug!("camera: switching to automatic view");
        }
        self.mode = ViewMode::Auto {
            horizontal_angle: horizontal,
            vertical_angle: vertical,
        };
        self.view = Mat4::look_at_rh(self.position, self.target(), self.up());
    }

    pub fn set_horizontal_angle(&mut self, angle: f32) {
        let (_, v) = self.angles();
        self.set_angles(angle, v);
    }

    pub fn set_vertical_angle(&mut self, angle: f32) {
        let (h, _) = self.angles();
        self.set_angles(h, angle);
    }

    /// Moves the camera.  In manual mode the target and up vector are held;
    /// in auto mode the view follows the angles from the new position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.view = match self.mode {
            ViewMode::Manual { target, up } => Mat4::look_at_rh(position, target, up),
            ViewMode::Auto { .. } => Mat4::look_at_rh(position, self.target(), self.up()),
        };
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// `(horizontal, vertical)` in radians.  In manual mode they are derived
    /// from the current look direction.
    pub fn angles(&self) -> (f32, f32) {
        match self.mode {
            ViewMode::Auto {
                horizontal_angle,
                vertical_angle,
            } => (horizontal_angle, vertical_angle),
            ViewMode::Manual { .. } => {
                let dir = self.direction();
                (dir.x.atan2(dir.z), dir.y.clamp(-1.0, 1.0).asin())
            }
        }
    }

    pub fn direction(&self) -> Vec3 {
        match self.mode {
            ViewMode::Auto {
                horizontal_angle: h,
                vertical_angle: v,
            } => Vec3::new(v.cos() * h.sin(), v.sin(), v.cos() * h.cos()),
            ViewMode::Manual { target, .. } => (target - self.position).normalize_or_zero(),
        }
    }

    pub fn right(&self) -> Vec3 {
        match self.mode {
            ViewMode::Auto {
                horizontal_angle: h,
                ..
            } => Vec3::new((h - FRAC_PI_2).sin(), 0.0, (h - FRAC_PI_2).cos()),
            ViewMode::Manual { up, .. } => self.direction().cross(up).normalize_or_zero(),
        }
    }

    pub fn up(&self) -> Vec3 {
        match self.mode {
            ViewMode::Auto { .. } => self.right().cross(self.direction()),
            ViewMode::Manual { up, .. } => up,
        }
    }

    pub fn target(&self) -> Vec3 {
        match self.mode {
            ViewMode::Auto { .. } => self.position + self.direction(),
            ViewMode::Manual { target, .. } => target,
        }
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    // ── projection ──────────────────────────────────────────────────────────

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
        self.compute_projection();
    }

    pub fn clip_planes(&self) -> (f32, f32) {
        (self.near_clip, self.far_clip)
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near_clip = near;
        self.far_clip = far;
        self.compute_projection();
    }

    /// Update aspect ratio and recalc projection when viewport dimensions change.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.compute_projection();
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    fn compute_projection(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near_clip, self.far_clip);
    }

    /// Build the combined view-projection matrix from the current parameters.
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view
    }

    // ── movement tuning ─────────────────────────────────────────────────────

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn mouse_speed(&self) -> f32 {
        self.mouse_speed
    }

    pub fn set_mouse_speed(&mut self, speed: f32) {
        self.mouse_speed = speed;
    }
}

fn decimal_key(node: &Value, key: &'static str) -> Result<Option<f32>, ConfigError> {
    match node.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_decimal()
            .map(|d| Some(d as f32))
            .ok_or_else(|| ConfigError::malformed(key, "decimal", v)),
    }
}

fn set_decimal(v: &Value, field: &'static str) -> Result<f32, FieldError> {
    v.expect_decimal(field).map(|d| d as f32)
}

// Indices are part of the script-facing contract; never renumber.
static REGISTRY: Lazy<FieldRegistry<Camera>> = Lazy::new(|| {
    const VEC3: &str = "[decimal,decimal,decimal]";
    let mut r = FieldRegistry::<Camera>::new("camera");
    r.register(
        0,
        "position",
        VEC3,
        |c| c.position.into(),
        Some(|c, v| {
            let p = v.expect_vec3("position")?;
            c.set_position(p);
            Ok(())
        }),
    )
    .register(
        1,
        "speed",
        "decimal",
        |c| c.speed.into(),
        Some(|c, v| {
            c.set_speed(set_decimal(&v, "speed")?);
            Ok(())
        }),
    )
    .register(2, "right", VEC3, |c| c.right().into(), None)
    .register(3, "direction", VEC3, |c| c.direction().into(), None)
    .register(
        4,
        "horizontal_angle",
        "decimal",
        |c| c.angles().0.into(),
        Some(|c, v| {
            c.set_horizontal_angle(set_decimal(&v, "horizontal_angle")?);
            Ok(())
        }),
    )
    .register(
        5,
        "hangle",
        "decimal",
        |c| c.angles().0.into(),
        Some(|c, v| {
            c.set_horizontal_angle(set_decimal(&v, "hangle")?);
            Ok(())
        }),
    )
    .register(
        6,
        "vertical_angle",
        "decimal",
        |c| c.angles().1.into(),
        Some(|c, v| {
            c.set_vertical_angle(set_decimal(&v, "vertical_angle")?);
            Ok(())
        }),
    )
    .register(
        7,
        "vangle",
        "decimal",
        |c| c.angles().1.into(),
        Some(|c, v| {
            c.set_vertical_angle(set_decimal(&v, "vangle")?);
            Ok(())
        }),
    )
    .register(
        8,
        "mouse_speed",
        "decimal",
        |c| c.mouse_speed.into(),
        Some(|c, v| {
            c.set_mouse_speed(set_decimal(&v, "mouse_speed")?);
            Ok(())
        }),
    )
    .register(9, "target", VEC3, |c| c.target().into(), None)
    .register(10, "up", VEC3, |c| c.up().into(), None)
    .register(
        11,
        "fov",
        "decimal",
        |c| c.fov.into(),
        Some(|c, v| {
            c.set_fov(set_decimal(&v, "fov")?);
            Ok(())
        }),
    )
    .register(
        12,
        "clip_planes",
        "[decimal,decimal]",
        |c| Value::List(vec![c.near_clip.into(), c.far_clip.into()]),
        Some(|c, v| {
            const TAG: &str = "[decimal,decimal]";
            let planes = v.expect_list("clip_planes", TAG, 2)?;
            let near = planes[0]
                .as_decimal()
                .ok_or_else(|| FieldError::mismatch("clip_planes", TAG, &v))?;
            let far = planes[1]
                .as_decimal()
                .ok_or_else(|| FieldError::mismatch("clip_planes", TAG, &v))?;
            c.set_clip_planes(near as f32, far as f32);
            Ok(())
        }),
    );
    r
});

impl Reflect for Camera {
    fn registry() -> &'static FieldRegistry<Self> {
        &REGISTRY
    }
}
