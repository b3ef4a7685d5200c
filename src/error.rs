/*
 * Error Module
 *
 * Invariant violations of the spatial index. Numeric edge cases in the
 * simulation (empty neighborhoods, zero-length vectors, degenerate angles)
 * never produce errors; they fall back to a defined default instead.
 */

use thiserror::Error;

use crate::boid::BoidId;
use crate::spatial_grid::CellKey;

/// Errors reported by the spatial hash grid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The boid already sits in a cell; it must be deleted before it is inserted again.
    #[error("boid {id:?} is already indexed in cell {cell:?}")]
    AlreadyIndexed { id: BoidId, cell: CellKey },

    /// The boid has no recorded cell.
    #[error("boid {id:?} is not indexed")]
    NotIndexed { id: BoidId },

    /// The recorded cell does not match the boid's position.
    #[error("boid {id:?} is recorded in cell {recorded:?} but its position hashes to {expected:?}")]
    Desynchronized {
        id: BoidId,
        recorded: CellKey,
        expected: CellKey,
    },

    /// A cell holds a handle whose boid does not point back at that cell.
    #[error("cell {cell:?} holds boid {id:?}, which is not recorded there")]
    Orphaned { id: BoidId, cell: CellKey },

    /// The same handle was found more than once in the index.
    #[error("boid {id:?} appears more than once in the index")]
    Duplicated { id: BoidId },
}

/// Errors loading a viewer configuration file.
#[cfg(feature = "viewer")]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
