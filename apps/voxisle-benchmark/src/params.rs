//! Command line parameters.

use voxisle_world::{WorldConfig, WorldDims};

/// Run parameters (from CLI or defaults).
#[derive(Debug, Clone)]
pub struct RunParams {
    /// World seed; random when not given.
    pub seed: Option<u64>,
    /// World size in chunks.
    pub dims: WorldDims,
    /// Number of picking rays to cast.
    pub casts: usize,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            seed: None,
            dims: WorldDims::new(8, 2, 8),
            casts: 256,
        }
    }
}

impl RunParams {
    /// Parse parameters from command line arguments.
    pub fn from_args() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    /// Parse parameters from an argument list without the program name.
    /// Unknown flags and unparsable values are ignored.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut params = Self::default();
        let args: Vec<String> = args.into_iter().collect();

        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1);
            let consumed = match args[i].as_str() {
                "--seed" => value.and_then(|v| v.parse().ok()).map(|v| params.seed = Some(v)),
                "--width" => value
                    .and_then(|v| v.parse().ok())
                    .map(|v| params.dims.width = v),
                "--height" => value
                    .and_then(|v| v.parse().ok())
                    .map(|v| params.dims.height = v),
                "--depth" => value
                    .and_then(|v| v.parse().ok())
                    .map(|v| params.dims.depth = v),
                "--casts" => value.and_then(|v| v.parse().ok()).map(|v| params.casts = v),
                _ => None,
            };
            if consumed.is_some() {
                i += 1;
            }
            i += 1;
        }

        params
    }

    /// World configuration for these parameters.
    pub fn world_config(&self) -> WorldConfig {
        let config = match self.seed {
            Some(seed) => WorldConfig::default().with_seed(seed),
            None => WorldConfig::with_random_seed(),
        };
        config.with_dims(self.dims.width, self.dims.height, self.dims.depth)
    }
}
