//! Built-in sprite program: `mvp` transform, one `tex` sampler, vertex color
//! modulation.

use crate::api::ShaderDialect;

const MODERN_VS: &str = "
in vec3 position;
in vec4 color;
in vec2 texCoord;
uniform mat4 mvp;
out vec4 vColor;
out vec2 vTexCoord;
void main() {
    vColor = color;
    vTexCoord = texCoord;
    gl_Position = mvp * vec4(position, 1.0);
}
";

const MODERN_FS: &str = "
in vec4 vColor;
in vec2 vTexCoord;
uniform sampler2D tex;
out vec4 fragColor;
void main() {
    fragColor = texture(tex, vTexCoord) * vColor;
}
";

const LEGACY_VS: &str = "
attribute vec3 position;
attribute vec4 color;
attribute vec2 texCoord;
uniform mat4 mvp;
varying vec4 vColor;
varying vec2 vTexCoord;
void main() {
    vColor = color;
    vTexCoord = texCoord;
    gl_Position = mvp * vec4(position, 1.0);
}
";

const LEGACY_FS: &str = "
varying vec4 vColor;
varying vec2 vTexCoord;
uniform sampler2D tex;
void main() {
    gl_FragColor = texture2D(tex, vTexCoord) * vColor;
}
";

/// `(vertex, fragment)` sources for `dialect`.
pub fn sprite_sources(dialect: ShaderDialect) -> (String, String) {
    let (vs, fs) = if dialect.is_modern() {
        (MODERN_VS, MODERN_FS)
    } else {
        (LEGACY_VS, LEGACY_FS)
    };
    let precision = match dialect {
        ShaderDialect::GlslEs100 | ShaderDialect::GlslEs300 => "precision mediump float;\n",
        ShaderDialect::Glsl120 | ShaderDialect::Glsl330 => "",
    };
    let directive = dialect.version_directive();
    (
        format!("{directive}\n{vs}"),
        format!("{directive}\n{precision}{fs}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn es_fragment_declares_precision() {
        let (_, fs) = sprite_sources(ShaderDialect::GlslEs100);
        assert!(fs.starts_with("#version 100\nprecision mediump float;"));
        assert!(fs.contains("gl_FragColor"));
    }

    #[test]
    fn core_profile_uses_in_out() {
        let (vs, fs) = sprite_sources(ShaderDialect::Glsl330);
        assert!(vs.starts_with("#version 330 core"));
        assert!(vs.contains("in vec3 position;"));
        assert!(fs.contains("out vec4 fragColor;"));
    }
}
