use proto_shader::core::rendering::render_api::VertexArrayHandle;

/// How vertices in a [VertexSource] are assembled into primitives.
/// Every three vertices make one triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Triangles,
}

/// A vertex array that is ready to be drawn: the buffer and its attribute
/// layout were set up by the driver that created it. The render loop only
/// needs to know how many vertices to submit and how to assemble them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexSource {
    handle: VertexArrayHandle,
    vertex_count: u32,
    primitive: PrimitiveType,
}

impl VertexSource {
    pub fn new(handle: VertexArrayHandle, vertex_count: u32, primitive: PrimitiveType) -> Self {
        VertexSource {
            handle,
            vertex_count,
            primitive,
        }
    }

    pub fn handle(&self) -> VertexArrayHandle {
        self.handle
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn primitive(&self) -> PrimitiveType {
        self.primitive
    }
}
