use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use crate::bridge::protocol::{
    ProtocolLayout, HEADER_DIRTY, HEADER_EYE_X, HEADER_EYE_Y, HEADER_EYE_Z,
    FRAME_COUNTER_WRAP, HEADER_FRAME_COUNTER, HEADER_PARTICLE_COUNT, HEADER_PROGRESS,
    HEADER_PROTOCOL_VERSION, INSTANCE_FLOATS, PROTOCOL_VERSION,
};

/// Per-particle instance data read by the renderer.
/// Must match the host protocol: 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Uniform scale.
    pub scale: f32,
    /// Rotation quaternion.
    pub qx: f32,
    pub qy: f32,
    pub qz: f32,
    pub qw: f32,
}

impl ParticleInstance {
    pub const FLOATS: usize = INSTANCE_FLOATS;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn new(position: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            scale,
            qx: rotation.x,
            qy: rotation.y,
            qz: rotation.z,
            qw: rotation.w,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Column-major model matrix for renderers that want 16 floats per instance.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_xyzw(self.qx, self.qy, self.qz, self.qw),
            self.position(),
        )
    }
}

/// All per-frame output in one contiguous f32 block, laid out per `ProtocolLayout`.
/// Sized once at construction; never reallocated.
pub struct ParticleBuffers {
    layout: ProtocolLayout,
    data: Vec<f32>,
    frame: u64,
}

impl ParticleBuffers {
    pub fn new(particle_count: usize) -> Self {
        let layout = ProtocolLayout::new(particle_count);
        let mut data = vec![0.0; layout.buffer_total_floats];
        data[HEADER_PARTICLE_COUNT] = particle_count as f32;
        data[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        Self { layout, data, frame: 0 }
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    pub fn particle_count(&self) -> usize {
        self.layout.particle_count
    }

    /// Write one particle. `i` must be below `particle_count()`.
    #[inline]
    pub fn write(&mut self, i: usize, position: Vec3, color: Vec3, rotation: Quat, scale: f32) {
        let p = self.layout.position_data_offset + i * 3;
        self.data[p..p + 3].copy_from_slice(&position.to_array());
        let c = self.layout.color_data_offset + i * 3;
        self.data[c..c + 3].copy_from_slice(&color.to_array());
        self.instances_mut()[i] = ParticleInstance::new(position, rotation, scale);
    }

    /// Flag the frame as changed. Called once per tick, not per particle.
    pub fn mark_dirty(&mut self, progress: f32, eye: Vec3) {
        self.frame += 1;
        self.data[HEADER_FRAME_COUNTER] = self.header_frame() as f32;
        self.data[HEADER_PROGRESS] = progress;
        self.data[HEADER_DIRTY] = 1.0;
        self.data[HEADER_EYE_X] = eye.x;
        self.data[HEADER_EYE_Y] = eye.y;
        self.data[HEADER_EYE_Z] = eye.z;
    }

    /// Host acknowledges the upload.
    pub fn clear_dirty(&mut self) {
        self.data[HEADER_DIRTY] = 0.0;
    }

    pub fn is_dirty(&self) -> bool {
        self.data[HEADER_DIRTY] != 0.0
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frame counter as published in the header, wrapping at `FRAME_COUNTER_WRAP`.
    pub fn header_frame(&self) -> u32 {
        (self.frame % FRAME_COUNTER_WRAP) as u32
    }

    pub fn positions(&self) -> &[f32] {
        let l = &self.layout;
        &self.data[l.position_data_offset..l.position_data_offset + l.position_data_floats]
    }

    pub fn colors(&self) -> &[f32] {
        let l = &self.layout;
        &self.data[l.color_data_offset..l.color_data_offset + l.color_data_floats]
    }

    pub fn instance_floats(&self) -> &[f32] {
        let l = &self.layout;
        &self.data[l.instance_data_offset..l.instance_data_offset + l.instance_data_floats]
    }

    pub fn instances(&self) -> &[ParticleInstance] {
        bytemuck::cast_slice(self.instance_floats())
    }

    fn instances_mut(&mut self) -> &mut [ParticleInstance] {
        let l = &self.layout;
        let range = l.instance_data_offset..l.instance_data_offset + l.instance_data_floats;
        bytemuck::cast_slice_mut(&mut self.data[range])
    }

    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.positions()[i * 3..i * 3 + 3])
    }

    pub fn color(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.colors()[i * 3..i * 3 + 3])
    }

    /// The whole block, header included.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Raw pointer to the block for shared-memory reads.
    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }
}
