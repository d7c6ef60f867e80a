use thiserror::Error;

/// Recoverable failures surfaced by the graphics layer.
///
/// State-machine and invariant violations (double `begin_vertices`, stack
/// overflow, wrong buffer kind on a layout, ...) are caller bugs and panic
/// instead of returning one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The requested API kind/version is unknown, compiled out, or not what
    /// the context provides.
    #[error("unsupported graphics API: {0}")]
    UnsupportedApi(String),

    /// A format or capability the driver did not advertise.
    #[error("{subsystem}: unsupported feature `{feature}`")]
    UnsupportedFeature {
        subsystem: &'static str,
        feature: &'static str,
    },

    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("framebuffer incomplete (status 0x{0:04X})")]
    IncompleteFramebuffer(u32),

    /// The native create call itself failed (out of handles, driver error).
    #[error("{subsystem}: resource creation failed: {message}")]
    ResourceCreation {
        subsystem: &'static str,
        message: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown uniform `{0}`")]
    UnknownUniform(String),

    #[error("uniform `{name}` expects {expected} bytes, got {actual}")]
    UniformSizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

impl RenderError {
    #[inline]
    pub(crate) fn unsupported(subsystem: &'static str, feature: &'static str) -> Self {
        Self::UnsupportedFeature { subsystem, feature }
    }

    #[inline]
    pub(crate) fn creation(subsystem: &'static str, message: impl Into<String>) -> Self {
        Self::ResourceCreation {
            subsystem,
            message: message.into(),
        }
    }
}
