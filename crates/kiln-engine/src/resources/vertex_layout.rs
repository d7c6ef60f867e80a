use super::buffer::Buffer;
use super::release;
use crate::api::{AttributeKind, BufferId, BufferKind, LayoutId, SharedApi, VertexElement, VertexLayoutDesc};
use crate::device::GraphicsDevice;
use crate::error::RenderError;

/// Binds a vertex buffer (and optional index buffer) to attribute locations.
///
/// Elements are appended until [`configure`](Self::configure); the layout is
/// locked afterwards and any further mutation panics.
pub struct VertexLayout {
    api: SharedApi,
    id: LayoutId,
    vertex_buffer: Option<BufferId>,
    index_buffer: Option<BufferId>,
    stride: u32,
    elements: Vec<VertexElement>,
    configured: bool,
}

impl VertexLayout {
    pub fn new(device: &GraphicsDevice) -> Result<Self, RenderError> {
        let api = device.api().clone();
        let id = api.borrow_mut().create_vertex_layout()?;
        Ok(Self {
            api,
            id,
            vertex_buffer: None,
            index_buffer: None,
            stride: 0,
            elements: Vec::new(),
            configured: false,
        })
    }

    #[inline]
    pub fn id(&self) -> LayoutId {
        self.id
    }

    /// # Panics
    /// If `buffer` is not a vertex buffer, or the layout is configured.
    pub fn set_vertex_buffer(&mut self, buffer: &Buffer) {
        self.assert_open();
        assert!(
            buffer.kind() == BufferKind::Vertex,
            "vertex layout: {:?} is a {:?} buffer, expected Vertex",
            buffer.id(),
            buffer.kind()
        );
        self.vertex_buffer = Some(buffer.id());
    }

    /// # Panics
    /// If `buffer` is not an index buffer, or the layout is configured.
    pub fn set_index_buffer(&mut self, buffer: &Buffer) {
        self.assert_open();
        assert!(
            buffer.kind() == BufferKind::Index,
            "vertex layout: {:?} is a {:?} buffer, expected Index",
            buffer.id(),
            buffer.kind()
        );
        self.index_buffer = Some(buffer.id());
    }

    pub fn set_stride(&mut self, stride: u32) {
        self.assert_open();
        self.stride = stride;
    }

    pub fn add_element(&mut self, location: u32, components: u32, kind: AttributeKind, normalized: bool, offset: u32) {
        self.assert_open();
        self.elements.push(VertexElement {
            location,
            components,
            kind,
            normalized,
            offset,
        });
    }

    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Hands the layout to the backend and locks it.
    pub fn configure(&mut self) -> Result<(), RenderError> {
        self.assert_open();
        let Some(vertex_buffer) = self.vertex_buffer else {
            return Err(RenderError::InvalidArgument("vertex layout has no vertex buffer".into()));
        };
        if self.elements.is_empty() {
            return Err(RenderError::InvalidArgument("vertex layout has no elements".into()));
        }
        let stride = match self.stride {
            0 => self
                .elements
                .iter()
                .map(|e| e.offset + e.components * e.kind.size())
                .max()
                .unwrap_or(0),
            s => s,
        };

        let desc = VertexLayoutDesc {
            vertex_buffer,
            index_buffer: self.index_buffer,
            stride,
            elements: self.elements.clone(),
        };
        self.api.borrow_mut().configure_vertex_layout(self.id, &desc)?;
        self.stride = stride;
        self.configured = true;
        Ok(())
    }

    /// Makes the layout's buffers and attributes current for drawing.
    pub fn use_layout(&self) {
        self.api.borrow_mut().use_vertex_layout(self.id);
    }

    pub fn stop(&self) {
        self.api.borrow_mut().stop_vertex_layout(self.id);
    }

    fn assert_open(&self) {
        assert!(!self.configured, "vertex layout: mutated after configure");
    }
}

impl Drop for VertexLayout {
    fn drop(&mut self) {
        let id = self.id;
        release(&self.api, "vertex layout", |api| api.delete_vertex_layout(id));
    }
}

impl std::fmt::Debug for VertexLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexLayout")
            .field("id", &self.id)
            .field("elements", &self.elements.len())
            .field("configured", &self.configured)
            .finish()
    }
}
