use std::{
    error::Error,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use eframe::glow;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use log::debug;

use super::glutils::ExtraFns;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
}

impl ShaderStage {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "vs" | "vert" => Some(Self::Vertex),
            "tcs" | "tesc" => Some(Self::TessControl),
            "tes" | "tese" => Some(Self::TessEvaluation),
            "gs" | "geom" => Some(Self::Geometry),
            "fs" | "frag" => Some(Self::Fragment),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn gl_enum(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::TessControl => glow::TESS_CONTROL_SHADER,
            Self::TessEvaluation => glow::TESS_EVALUATION_SHADER,
            Self::Geometry => glow::GEOMETRY_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vertex => "Vertex",
            Self::TessControl => "Tessellation control",
            Self::TessEvaluation => "Tessellation evaluation",
            Self::Geometry => "Geometry",
            Self::Fragment => "Fragment",
        };
        write!(f, "{name}")
    }
}

#[allow(dead_code)]
pub enum ShaderUniformTypes<'a> {
    Mat4(&'a Mat4),
    Mat3(&'a Mat3),
    Vec4(&'a Vec4),
    Vec3(&'a Vec3),
    Vec2(&'a Vec2),
    F32(&'a f32),
    U32(&'a u32),
    I32(&'a i32),
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                     Errors Arrising when building a program                                       //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug)]
pub enum ShaderError {
    Io(PathBuf, io::Error),
    UnknownStage(PathBuf),
    NotFound(String),
    Create(String),
    Compile { stage: ShaderStage, log: String },
    Link(String),
    Unsupported(&'static str),
}
impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Could not read shader {}: {e}", path.display()),
            Self::UnknownStage(path) => {
                write!(f, "Unrecognized shader extension: {}", path.display())
            }
            Self::NotFound(what) => write!(f, "Shader not found: {what}"),
            Self::Create(e) => write!(f, "Unable to create shader object: {e}"),
            Self::Compile { stage, log } => write!(f, "{stage} shader failed to compile!\n{log}"),
            Self::Link(log) => write!(f, "Shader program failed to link!\n{log}"),
            Self::Unsupported(entry) => write!(f, "{entry} is not available in this context"),
        }
    }
}
impl Error for ShaderError {}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               Program Creation                                                    //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone)]
#[repr(C)]
pub struct Shader(glow::Program);

impl Shader {
    pub fn from_sources(
        gl: &glow::Context,
        sources: &[(ShaderStage, &str)],
    ) -> Result<Self, ShaderError> {
        use glow::HasContext as _;

        unsafe {
            let program = gl.create_program().map_err(ShaderError::Create)?;

            let mut shaders = Vec::with_capacity(sources.len());
            for &(stage, source) in sources {
                let shader = match gl.create_shader(stage.gl_enum()) {
                    Ok(shader) => shader,
                    Err(e) => {
                        Self::discard(gl, program, &shaders);
                        return Err(ShaderError::Create(e));
                    }
                };
                gl.shader_source(shader, source);
                gl.compile_shader(shader);
                if !gl.get_shader_compile_status(shader) {
                    let log = gl.get_shader_info_log(shader);
                    gl.delete_shader(shader);
                    Self::discard(gl, program, &shaders);
                    return Err(ShaderError::Compile { stage, log });
                }
                gl.attach_shader(program, shader);
                shaders.push(shader);
            }

            gl.link_program(program);
            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                Self::discard(gl, program, &shaders);
                return Err(ShaderError::Link(log));
            }

            for shader in shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }

            Ok(Self(program))
        }
    }

    /// Compiles every file, the stage of each comes from its extension.
    pub fn from_files(gl: &glow::Context, paths: &[PathBuf]) -> Result<Self, ShaderError> {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let stage = ShaderStage::from_path(path)
                .ok_or_else(|| ShaderError::UnknownStage(path.clone()))?;
            let source =
                fs::read_to_string(path).map_err(|e| ShaderError::Io(path.clone(), e))?;
            debug!("{}: {stage} shader", path.display());
            sources.push((stage, source));
        }
        sources.sort_by_key(|(stage, _)| *stage);

        let sources: Vec<_> = sources
            .iter()
            .map(|(stage, source)| (*stage, source.as_str()))
            .collect();
        Self::from_sources(gl, &sources)
    }

    /// Builds the program out of every `<dir>/<stem>.<ext>` file with a known stage extension.
    pub fn from_stem(gl: &glow::Context, dir: &Path, stem: &str) -> Result<Self, ShaderError> {
        let paths = stage_files(dir, stem)?;
        Self::from_files(gl, &paths)
    }

    unsafe fn discard(gl: &glow::Context, program: glow::Program, shaders: &[glow::Shader]) {
        use glow::HasContext as _;

        for &shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }
        gl.delete_program(program);
    }
}

fn stage_files(dir: &Path, stem: &str) -> Result<Vec<PathBuf>, ShaderError> {
    // The directory is taken literally, only the extension is a wildcard
    let pattern = format!(
        "{}/{}.*",
        glob::Pattern::escape(&dir.display().to_string()),
        glob::Pattern::escape(stem)
    );
    let paths: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| ShaderError::NotFound(format!("{pattern} ({e})")))?
        .filter_map(Result::ok)
        .filter(|path| ShaderStage::from_path(path).is_some())
        .collect();

    if paths.is_empty() {
        return Err(ShaderError::NotFound(pattern));
    }
    Ok(paths)
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//                                               Program Usage                                                       //
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

impl Shader {
    pub fn set_uniform(&self, gl: &glow::Context, name: &str, uniform: ShaderUniformTypes) {
        unsafe {
            use glow::HasContext as _;
            let location = gl.get_uniform_location(self.0, name);
            let location = location.as_ref();
            match uniform {
                ShaderUniformTypes::Mat4(uniform) => {
                    gl.uniform_matrix_4_f32_slice(location, false, &uniform.to_cols_array());
                }
                ShaderUniformTypes::Mat3(uniform) => {
                    gl.uniform_matrix_3_f32_slice(location, false, &uniform.to_cols_array());
                }
                ShaderUniformTypes::Vec4(uniform) => {
                    gl.uniform_4_f32_slice(location, &uniform.to_array());
                }
                ShaderUniformTypes::Vec3(uniform) => {
                    gl.uniform_3_f32_slice(location, &uniform.to_array());
                }
                ShaderUniformTypes::Vec2(uniform) => {
                    gl.uniform_2_f32_slice(location, &uniform.to_array());
                }
                ShaderUniformTypes::F32(uniform) => {
                    gl.uniform_1_f32(location, *uniform);
                }
                ShaderUniformTypes::U32(uniform) => {
                    gl.uniform_1_u32(location, *uniform);
                }
                ShaderUniformTypes::I32(uniform) => {
                    gl.uniform_1_i32(location, *uniform);
                }
            }
        }
    }

    /// Looks up the index of a subroutine function declared in `stage`.
    pub fn subroutine_index(
        &self,
        extra: &ExtraFns,
        stage: ShaderStage,
        name: &str,
    ) -> Result<u32, ShaderError> {
        match extra.get_subroutine_index(self.0, stage.gl_enum(), name) {
            None => Err(ShaderError::Unsupported("glGetSubroutineIndex")),
            Some(glow::INVALID_INDEX) => Err(ShaderError::NotFound(format!(
                "subroutine {name} in the {stage} stage"
            ))),
            Some(index) => Ok(index),
        }
    }

    /// Selects one subroutine per active subroutine uniform of `stage`.
    /// The selection is reset by every `use_program`, so call this after it.
    pub fn select_subroutines(
        &self,
        extra: &ExtraFns,
        stage: ShaderStage,
        indices: &[u32],
    ) -> Result<(), ShaderError> {
        if extra.uniform_subroutines(stage.gl_enum(), indices) {
            Ok(())
        } else {
            Err(ShaderError::Unsupported("glUniformSubroutinesuiv"))
        }
    }

    pub fn use_program(&self, gl: &glow::Context) {
        unsafe {
            use glow::HasContext as _;

            gl.use_program(Some(self.0));
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            use glow::HasContext as _;

            gl.delete_program(self.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_from_extension() {
        assert_eq!(ShaderStage::from_extension("vs"), Some(ShaderStage::Vertex));
        assert_eq!(ShaderStage::from_extension("vert"), Some(ShaderStage::Vertex));
        assert_eq!(ShaderStage::from_extension("tcs"), Some(ShaderStage::TessControl));
        assert_eq!(ShaderStage::from_extension("tese"), Some(ShaderStage::TessEvaluation));
        assert_eq!(ShaderStage::from_extension("gs"), Some(ShaderStage::Geometry));
        assert_eq!(ShaderStage::from_extension("frag"), Some(ShaderStage::Fragment));
        assert_eq!(ShaderStage::from_extension("glsl"), None);
        assert_eq!(
            ShaderStage::from_path(Path::new("Shaders/pointsprite.gs")),
            Some(ShaderStage::Geometry)
        );
        assert_eq!(ShaderStage::from_path(Path::new("Shaders/README")), None);
    }

    #[test]
    fn stages_sort_in_pipeline_order() {
        let mut stages = vec![
            ShaderStage::Fragment,
            ShaderStage::TessEvaluation,
            ShaderStage::Vertex,
            ShaderStage::Geometry,
            ShaderStage::TessControl,
        ];
        stages.sort();
        assert_eq!(
            stages,
            [
                ShaderStage::Vertex,
                ShaderStage::TessControl,
                ShaderStage::TessEvaluation,
                ShaderStage::Geometry,
                ShaderStage::Fragment,
            ]
        );
    }

    #[test]
    fn stage_files_skips_unknown_extensions() {
        let dir = std::env::temp_dir().join(format!("gallery-shaders-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for name in ["solid.vs", "solid.fs", "solid.vs~", "solidity.vs"] {
            fs::write(dir.join(name), "").unwrap();
        }

        let mut found = stage_files(&dir, "solid").unwrap();
        found.sort();
        assert_eq!(found, [dir.join("solid.fs"), dir.join("solid.vs")]);

        assert!(matches!(
            stage_files(&dir, "missing"),
            Err(ShaderError::NotFound(_))
        ));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn stage_files_takes_the_directory_literally() {
        let dir = std::env::temp_dir().join(format!("gallery [v2] *?-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("solid.vs"), "").unwrap();

        assert_eq!(stage_files(&dir, "solid").unwrap(), [dir.join("solid.vs")]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn shipped_programs_have_their_stages() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("Shaders");
        let stages = |stem| {
            let mut stages: Vec<_> = stage_files(&dir, stem)
                .unwrap()
                .iter()
                .filter_map(|path| ShaderStage::from_path(path))
                .collect();
            stages.sort();
            stages
        };

        use ShaderStage::*;
        for stem in ["texture", "multitex", "normalmap", "phong", "subroutine", "solid"] {
            assert_eq!(stages(stem), [Vertex, Fragment], "{stem}");
        }
        assert_eq!(stages("pointsprite"), [Vertex, Geometry, Fragment]);
        assert_eq!(
            stages("bezcurve"),
            [Vertex, TessControl, TessEvaluation, Fragment]
        );
    }

    #[test]
    fn compile_error_names_the_stage() {
        let err = ShaderError::Compile {
            stage: ShaderStage::Geometry,
            log: "0:1: syntax error".into(),
        };
        assert_eq!(
            err.to_string(),
            "Geometry shader failed to compile!\n0:1: syntax error"
        );
    }
}
