use std::path::PathBuf;

pub const SHADER_DIR: &str = "Shaders";
pub const MEDIA_DIR: &str = "Media";

pub const SHADER_DIR_VAR: &str = "GALLERY_SHADER_DIR";
pub const MEDIA_DIR_VAR: &str = "GALLERY_MEDIA_DIR";
pub const DEMO_VAR: &str = "GALLERY_DEMO";

/// Where the demos find their shaders and assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub shader_dir: PathBuf,
    pub media_dir: PathBuf,
    /// Name of the demo to open on startup, matched case insensitively.
    pub initial_demo: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |name: &str| lookup(name).filter(|value: &String| !value.trim().is_empty());

        Self {
            shader_dir: lookup(SHADER_DIR_VAR).unwrap_or_else(|| SHADER_DIR.into()).into(),
            media_dir: lookup(MEDIA_DIR_VAR).unwrap_or_else(|| MEDIA_DIR.into()).into(),
            initial_demo: lookup(DEMO_VAR).map(|name| name.trim().to_owned()),
        }
    }

    pub fn media_path(&self, name: &str) -> PathBuf {
        self.media_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_without_variables() {
        let config = Config::default();
        assert_eq!(config.shader_dir, Path::new("Shaders"));
        assert_eq!(config.media_dir, Path::new("Media"));
        assert_eq!(config.initial_demo, None);
        assert_eq!(config.media_path("moss.png"), Path::new("Media/moss.png"));
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_vars(|name| match name {
            SHADER_DIR_VAR => Some("/tmp/glsl".to_owned()),
            DEMO_VAR => Some(" Normal Map ".to_owned()),
            MEDIA_DIR_VAR => Some("   ".to_owned()),
            _ => None,
        });
        assert_eq!(config.shader_dir, Path::new("/tmp/glsl"));
        assert_eq!(config.media_dir, Path::new("Media"));
        assert_eq!(config.initial_demo.as_deref(), Some("Normal Map"));
    }
}
