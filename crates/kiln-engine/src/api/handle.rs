use core::fmt;
use core::num::NonZeroU32;

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Wraps a backend-assigned raw id. Backends obtain these from [`IdAllocator`].
            #[inline]
            pub const fn new(raw: NonZeroU32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

resource_id!(
    /// Opaque backend handle for a 2D texture.
    TextureId
);
resource_id!(
    /// Opaque backend handle for a vertex/index/uniform buffer.
    BufferId
);
resource_id!(
    /// Opaque backend handle for a compiled shader stage.
    ShaderId
);
resource_id!(
    /// Opaque backend handle for a linked shader program.
    ProgramId
);
resource_id!(
    /// Opaque backend handle for an off-screen render target.
    TargetId
);
resource_id!(
    /// Opaque backend handle for a vertex layout.
    LayoutId
);

/// Monotonic id source. Ids are never reused within one backend instance,
/// so a stale id can be detected instead of aliasing a newer resource.
#[derive(Debug, Default)]
pub struct IdAllocator {
    issued: u32,
}

impl IdAllocator {
    pub const fn new() -> Self {
        Self { issued: 0 }
    }

    #[inline]
    pub fn next(&mut self) -> NonZeroU32 {
        let id = NonZeroU32::MIN.saturating_add(self.issued);
        self.issued = self.issued.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next().get(), 1);
        assert_eq!(ids.next().get(), 2);
        assert_eq!(TextureId::new(ids.next()).raw(), 3);
    }

    #[test]
    fn debug_names_the_kind() {
        let id = BufferId::new(NonZeroU32::MIN);
        assert_eq!(format!("{id:?}"), "BufferId(1)");
    }
}
