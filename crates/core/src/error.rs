//! Error types for the noise-flow core.

use thiserror::Error;

/// Errors produced by configuration, simulation and output operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A grid extent component was zero, or the grid is too large to allocate.
    #[error("invalid grid extent ({x}, {y}, {z}): every axis must hold at least one cell and the grid must fit in memory")]
    InvalidExtent { x: usize, y: usize, z: usize },

    /// Cell edge length was zero, negative or non-finite.
    #[error("invalid cell size {0}: must be a finite positive number")]
    InvalidCellSize(f32),

    /// A configuration value was outside its valid domain.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A tick was requested with a negative or non-finite delta time.
    #[error("invalid time step {0}: must be finite and non-negative")]
    InvalidTimeStep(f32),

    /// A particle index was outside the particle collection.
    #[error("particle index {index} out of bounds for {len} particles")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A cell coordinate was outside the direction grid.
    #[error("cell ({x}, {y}, {z}) out of bounds for grid extent ({ex}, {ey}, {ez})")]
    CellOutOfBounds {
        x: usize,
        y: usize,
        z: usize,
        ex: usize,
        ey: usize,
        ez: usize,
    },

    /// No engine is registered under the requested name.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A gradient could not be constructed from the given keys.
    #[error("invalid gradient: {0}")]
    InvalidGradient(String),

    /// Writing output (snapshots, reports) failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidParameter`].
    pub fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_extent_lists_all_axes() {
        let err = EngineError::InvalidExtent { x: 4, y: 0, z: 7 };
        let msg = format!("{err}");
        assert!(msg.contains('4'), "missing x in: {msg}");
        assert!(msg.contains('0'), "missing y in: {msg}");
        assert!(msg.contains('7'), "missing z in: {msg}");
    }

    #[test]
    fn invalid_cell_size_includes_value() {
        let msg = EngineError::InvalidCellSize(-2.5).to_string();
        assert!(msg.contains("-2.5"), "missing value in: {msg}");
    }

    #[test]
    fn invalid_param_helper_fills_name_and_reason() {
        let err = EngineError::invalid_param("spawn_radius", "must be non-negative");
        let msg = err.to_string();
        assert!(msg.contains("spawn_radius"));
        assert!(msg.contains("non-negative"));
    }

    #[test]
    fn index_out_of_bounds_includes_index_and_len() {
        let msg = EngineError::IndexOutOfBounds { index: 12, len: 3 }.to_string();
        assert!(msg.contains("12") && msg.contains('3'), "got: {msg}");
    }

    #[test]
    fn cell_out_of_bounds_includes_coordinates_and_extent() {
        let err = EngineError::CellOutOfBounds {
            x: 9,
            y: 1,
            z: 2,
            ex: 8,
            ey: 8,
            ez: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("(9, 1, 2)"), "missing cell in: {msg}");
        assert!(msg.contains("(8, 8, 8)"), "missing extent in: {msg}");
    }

    #[test]
    fn unknown_engine_includes_name() {
        let msg = EngineError::UnknownEngine("lava-lamp".into()).to_string();
        assert!(msg.contains("lava-lamp"));
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
