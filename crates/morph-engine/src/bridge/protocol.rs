/// Shared frame buffer layout.
/// Must stay in sync with the host's reader.
///
/// Layout (all values f32 / 4 bytes):
/// ```text
/// [Header: 8 floats]
/// [Positions: N × 3 floats]
/// [Colors: N × 3 floats]
/// [Instances: N × 8 floats]
/// ```
///
/// N is fixed at initialization, so the layout never changes afterwards.

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 8;

/// Header field indices.
pub const HEADER_FRAME_COUNTER: usize = 0;
pub const HEADER_PARTICLE_COUNT: usize = 1;
pub const HEADER_PROGRESS: usize = 2;
pub const HEADER_DIRTY: usize = 3;
pub const HEADER_EYE_X: usize = 4;
pub const HEADER_EYE_Y: usize = 5;
pub const HEADER_EYE_Z: usize = 6;
pub const HEADER_PROTOCOL_VERSION: usize = 7;

/// The header frame counter wraps to 0 here, the largest run of integers
/// an f32 holds exactly. Hosts compare for inequality, not order.
pub const FRAME_COUNTER_WRAP: u64 = 1 << 24;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per position / color entry.
pub const VEC3_FLOATS: usize = 3;

/// Floats per particle instance: x, y, z, scale, qx, qy, qz, qw.
pub const INSTANCE_FLOATS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub particle_count: usize,

    pub position_data_offset: usize,
    pub color_data_offset: usize,
    pub instance_data_offset: usize,

    pub position_data_floats: usize,
    pub color_data_floats: usize,
    pub instance_data_floats: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    pub fn new(particle_count: usize) -> Self {
        let position_data_floats = particle_count * VEC3_FLOATS;
        let color_data_floats = particle_count * VEC3_FLOATS;
        let instance_data_floats = particle_count * INSTANCE_FLOATS;

        let position_data_offset = HEADER_FLOATS;
        let color_data_offset = position_data_offset + position_data_floats;
        let instance_data_offset = color_data_offset + color_data_floats;

        let buffer_total_floats = instance_data_offset + instance_data_floats;

        Self {
            particle_count,
            position_data_offset,
            color_data_offset,
            instance_data_offset,
            position_data_floats,
            color_data_floats,
            instance_data_floats,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }
}
