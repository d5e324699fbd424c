use {
    color_eyre::Report,
    eyre::WrapErr,
    std::path::{Path, PathBuf},
};

const DEFAULT_PATH: &str = "./rig-demo.ron";

/// Shape of the procedural joint chain.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of joints in the chain.
    pub joints: usize,

    /// Distance between consecutive joints.
    pub segment_length: f32,

    /// Bend of every joint in bind pose, relative to its parent.
    pub bend_degrees: f32,

    /// Number of blend steps between rest and bind pose.
    pub blend_steps: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            joints: 4,
            segment_length: 1.0,
            bend_degrees: 30.0,
            blend_steps: 4,
        }
    }
}

impl Config {
    /// Loads config from `RIG_DEMO_CONFIG_PATH` or the default path.
    /// Missing default file is not an error.
    pub fn load_default() -> Result<Self, Report> {
        let config = match std::env::var("RIG_DEMO_CONFIG_PATH") {
            Ok(path) => Self::load(&PathBuf::from(path))?,
            Err(_) => {
                let path = Path::new(DEFAULT_PATH);
                if path.exists() {
                    Self::load(path)?
                } else {
                    tracing::warn!(
                        "Config file '{}' not found, using defaults",
                        DEFAULT_PATH
                    );
                    Config::default()
                }
            }
        };

        eyre::ensure!(config.joints > 0, "Chain must have at least one joint");
        eyre::ensure!(
            config.blend_steps > 0,
            "At least one blend step is required"
        );
        Ok(config)
    }

    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self, Report> {
        let file = std::fs::File::open(path).wrap_err_with(|| {
            format!("Failed to open config file '{}'", path.display())
        })?;

        let config = ron::de::from_reader(file).wrap_err_with(|| {
            format!("Failed to parse config file '{}'", path.display())
        })?;

        Ok(config)
    }
}
