use bytemuck::Pod;

use super::release;
use crate::api::{BufferId, BufferKind, BufferUsage, SharedApi};
use crate::device::GraphicsDevice;
use crate::error::RenderError;

/// A GPU buffer whose kind is fixed at construction.
pub struct Buffer {
    api: SharedApi,
    id: BufferId,
    kind: BufferKind,
    usage: BufferUsage,
    /// Bytes written by the last upload (or allocated at creation).
    len: usize,
}

impl Buffer {
    /// Allocates `size` bytes of uninitialized storage.
    pub fn new(device: &GraphicsDevice, kind: BufferKind, usage: BufferUsage, size: usize) -> Result<Self, RenderError> {
        let api = device.api().clone();
        let id = api.borrow_mut().create_buffer(kind, usage, size)?;
        Ok(Self {
            api,
            id,
            kind,
            usage,
            len: size,
        })
    }

    /// Creates a buffer initialized with `data`.
    pub fn with_data<T: Pod>(
        device: &GraphicsDevice,
        kind: BufferKind,
        usage: BufferUsage,
        data: &[T],
    ) -> Result<Self, RenderError> {
        let mut buffer = Self::new(device, kind, usage, size_of_val(data))?;
        buffer.write(data, true);
        Ok(buffer)
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bind(&self) {
        self.api.borrow_mut().bind_buffer(self.id);
    }

    pub fn unbind(&self) {
        self.api.borrow_mut().unbind_buffer(self.kind);
    }

    /// Uploads `data`. With `update`, data that fits is written in place;
    /// otherwise the storage is reallocated to exactly `data`.
    pub fn write<T: Pod>(&mut self, data: &[T], update: bool) {
        self.write_bytes(bytemuck::cast_slice(data), size_of::<T>(), update);
    }

    pub fn write_bytes(&mut self, bytes: &[u8], element_size: usize, update: bool) {
        self.api.borrow_mut().write_buffer(self.id, bytes, element_size, update);
        self.len = bytes.len();
    }

    pub fn is_valid(&self) -> bool {
        self.api.borrow().is_buffer_valid(self.id)
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        let id = self.id;
        release(&self.api, "buffer", |api| api.delete_buffer(id));
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiCall, FeatureFlags, HeadlessApi};

    fn device() -> (GraphicsDevice, crate::api::CallLog) {
        let api = HeadlessApi::new(FeatureFlags::none());
        let log = api.log();
        (GraphicsDevice::with_api(api, 64, 64), log)
    }

    #[test]
    fn typed_write_uploads_raw_bytes() {
        let (device, log) = device();
        let mut buffer = Buffer::new(&device, BufferKind::Index, BufferUsage::Dynamic, 8).unwrap();
        buffer.write(&[1u16, 2, 3], true);

        assert_eq!(buffer.len(), 6);
        assert!(log.snapshot().contains(&ApiCall::WriteBuffer {
            id: buffer.id(),
            data: vec![1, 0, 2, 0, 3, 0],
            update: true
        }));
    }

    #[test]
    fn drop_deletes_through_backend() {
        let (device, log) = device();
        let buffer = Buffer::new(&device, BufferKind::Vertex, BufferUsage::Static, 4).unwrap();
        let id = buffer.id();
        assert!(buffer.is_valid());
        drop(buffer);
        assert_eq!(log.snapshot().last(), Some(&ApiCall::DeleteBuffer(id)));
    }

    #[test]
    fn uniform_buffers_need_the_feature() {
        let (device, _) = device();
        assert!(matches!(
            Buffer::new(&device, BufferKind::Uniform, BufferUsage::Dynamic, 64),
            Err(RenderError::UnsupportedFeature { .. })
        ));
    }
}
