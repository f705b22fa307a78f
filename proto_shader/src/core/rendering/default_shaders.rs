//! Built-in shader source pairs
use proto_shader::core::rendering::program::ShaderSources;

/// Flat triangle whose color comes from the `ourColor` uniform
pub const UNIFORM_COLOR: ShaderSources<'static> = ShaderSources {
    vertex: "#version 330 core\n\
        layout (location = 0) in vec3 aPos;\n\
        void main()\n\
        {\n\
            gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);\n\
        }\n",
    fragment: "#version 330 core\n\
        out vec4 FragColor;\n\
        uniform vec4 ourColor;\n\
        void main()\n\
        {\n\
            FragColor = ourColor;\n\
        }\n",
};

/// Dark red triangle, the color is handed from the vertex stage to the
/// fragment stage through `vertexColor`. Has no uniforms.
pub const VERTEX_COLOR: ShaderSources<'static> = ShaderSources {
    vertex: "#version 330 core\n\
        layout (location = 0) in vec3 aPos;\n\
        out vec4 vertexColor;\n\
        void main()\n\
        {\n\
            gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);\n\
            vertexColor = vec4(0.5, 0.0, 0.0, 1.0);\n\
        }\n",
    fragment: "#version 330 core\n\
        out vec4 FragColor;\n\
        in vec4 vertexColor;\n\
        void main()\n\
        {\n\
            FragColor = vertexColor;\n\
        }\n",
};

/// Positions of the triangle both presets draw, three `vec3`s
pub const TRIANGLE_VERTICES: [f32; 9] = [
    -0.5, -0.5, 0.0, //
    0.5, -0.5, 0.0, //
    0.0, 0.5, 0.0,
];
