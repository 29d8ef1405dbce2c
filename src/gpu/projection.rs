//! Aspect-correct orthographic projection
//!
//! The shorter surface dimension maps to [-1, 1]; the longer one is widened
//! by the aspect ratio so content is never stretched. A fixed camera sits at
//! (0, 0, 3) looking at the origin.

use glam::{Mat4, Vec3};
use glow::HasContext;
use log::{debug, info};

use crate::constants::{CAMERA_EYE, CAMERA_UP, PROJECTION_FAR, PROJECTION_NEAR};

use super::error::GlError;
use super::shader::ShaderProgram;

/// View, projection and their product for one surface size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionState {
    pub width: u32,
    pub height: u32,
    /// Horizontal half-extent of the view volume
    pub half_width: f32,
    /// Vertical half-extent of the view volume
    pub half_height: f32,
    pub projection: Mat4,
    pub view: Mat4,
    /// projection * view (view applies first to a vertex)
    pub view_projection: Mat4,
}

impl ProjectionState {
    pub fn compute(width: u32, height: u32) -> Self {
        let (half_width, half_height) = half_extents(width, height);
        let projection = Mat4::orthographic_rh_gl(
            -half_width,
            half_width,
            -half_height,
            half_height,
            PROJECTION_NEAR,
            PROJECTION_FAR,
        );
        let view = Mat4::look_at_rh(
            Vec3::from_array(CAMERA_EYE),
            Vec3::ZERO,
            Vec3::from_array(CAMERA_UP),
        );
        Self {
            width,
            height,
            half_width,
            half_height,
            projection,
            view,
            view_projection: projection * view,
        }
    }

    /// Column-major matrix ready for `glUniformMatrix4fv`
    pub fn to_cols_array(&self) -> [f32; 16] {
        self.view_projection.to_cols_array()
    }
}

/// Half-extents (x, y) of the view volume for a surface size
pub fn half_extents(width: u32, height: u32) -> (f32, f32) {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    if width > height {
        (w / h, 1.0)
    } else {
        (1.0, h / w)
    }
}

/// Uploads the view-projection matrix to one uniform of one program
///
/// Recomputed only when the surface size changes.
pub struct ProjectionHelper {
    location: glow::UniformLocation,
    current: Option<ProjectionState>,
}

impl ProjectionHelper {
    pub fn new(
        gl: &glow::Context,
        program: &ShaderProgram,
        uniform_name: &str,
    ) -> Result<Self, GlError> {
        let location = program.uniform_location(gl, uniform_name)?;
        Ok(Self {
            location,
            current: None,
        })
    }

    /// Recompute for a new surface size; returns the cached state if unchanged
    pub fn recompute(&mut self, width: u32, height: u32) -> (ProjectionState, bool) {
        if let Some(state) = self.current {
            if state.width == width && state.height == height {
                return (state, false);
            }
        }
        let state = ProjectionState::compute(width, height);
        self.current = Some(state);
        (state, true)
    }

    /// Recompute and upload if the size changed
    pub fn enable(&mut self, gl: &glow::Context, program: &ShaderProgram, width: u32, height: u32) {
        let (state, changed) = self.recompute(width, height);
        if !changed {
            debug!("Projection unchanged for {}x{}", width, height);
            return;
        }
        program.bind(gl);
        self.apply(gl, &state.to_cols_array());
        info!(
            "Projection updated: {}x{} (half extents {:.3} x {:.3})",
            width, height, state.half_width, state.half_height
        );
    }

    /// Upload a matrix to the bound program
    pub fn apply(&self, gl: &glow::Context, matrix: &[f32; 16]) {
        unsafe {
            gl.uniform_matrix_4_f32_slice(Some(&self.location), false, matrix);
        }
    }

    pub fn current(&self) -> Option<&ProjectionState> {
        self.current.as_ref()
    }
}
