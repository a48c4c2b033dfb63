use std::path::Path;

use crate::input::InputError;
use crate::input::compress::open_maybe_gz;
use crate::model::EngineParams;

/// Read engine parameters from JSON; omitted keys keep their `default_v1` values.
pub fn load_params(path: &Path) -> Result<EngineParams, InputError> {
    let reader = open_maybe_gz(path)?;
    let params: EngineParams = serde_json::from_reader(reader).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if params.z_saturation <= 0.0 || params.percentile_floor >= params.percentile_ceiling {
        return Err(InputError::Parse {
            path: path.to_path_buf(),
            message: "z_saturation must be positive and percentile_floor below percentile_ceiling"
                .to_string(),
        });
    }
    Ok(params)
}
