use crate::core::{Domain, Point};
use crate::error::{ChartError, ChartResult};

use super::ChartEngineConfig;

pub(super) fn validate_engine_config(config: ChartEngineConfig) -> ChartResult<ChartEngineConfig> {
    config.viewport.validate()?;
    config.x_padding.validate()?;
    if !config.zoom_multiplier.is_finite() || config.zoom_multiplier <= 1.0 {
        return Err(ChartError::InvalidData(
            "zoom multiplier must be finite and > 1".to_owned(),
        ));
    }
    if !config.wheel_pan_end_debounce_ms.is_finite() || config.wheel_pan_end_debounce_ms < 0.0 {
        return Err(ChartError::InvalidData(
            "wheel pan end debounce must be finite and >= 0".to_owned(),
        ));
    }
    config.window_options(false).validate()?;
    Ok(config)
}

pub(super) fn validate_point(point: Point, label: &str) -> ChartResult<Point> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(ChartError::InvalidData(format!("{label} must be finite")));
    }
    Ok(point)
}

pub(super) fn validate_domain(domain: Domain, label: &str) -> ChartResult<Domain> {
    if !domain.is_finite() {
        return Err(ChartError::InvalidData(format!("{label} must be finite")));
    }
    Ok(domain)
}

pub(super) fn validate_zoom_factor(factor: f64) -> ChartResult<f64> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ChartError::InvalidData(
            "zoom factor must be finite and > 0".to_owned(),
        ));
    }
    Ok(factor)
}
