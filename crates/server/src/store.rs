//! Cell persistence behind the HTTP layer.

use async_trait::async_trait;
use cellgrid_sheet::{ContainerId, SparseCell};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Container {0} not found")]
    NotFound(ContainerId),

    #[error("Container {0} already exists")]
    AlreadyExists(ContainerId),

    #[error("Cell belongs to {found}, not {expected}")]
    ForeignCell {
        expected: ContainerId,
        found: ContainerId,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Where cells live between requests.
///
/// Writes are keyed on (container, row, column) and the last write wins.
/// Bulk writes are all-or-nothing.
#[async_trait]
pub trait CellStore: Send + Sync {
    /// Register an empty container
    async fn create(&self, container: &ContainerId) -> StoreResult<()>;

    /// All cells of a container, ordered by row then column
    async fn list_cells(&self, container: &ContainerId) -> StoreResult<Vec<SparseCell>>;

    /// Insert or overwrite cells; returns how many were written
    async fn upsert_cells(&self, container: &ContainerId, cells: Vec<SparseCell>) -> StoreResult<usize>;

    /// Drop every existing cell and write `cells` in their place
    async fn replace_cells(&self, container: &ContainerId, cells: Vec<SparseCell>) -> StoreResult<usize>;

    /// Remove every cell, keeping the container
    async fn clear(&self, container: &ContainerId) -> StoreResult<()>;
}

type Grid = BTreeMap<(usize, usize), SparseCell>;

/// In-process store; everything is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    containers: RwLock<HashMap<ContainerId, Grid>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_ownership(container: &ContainerId, cells: &[SparseCell]) -> StoreResult<()> {
    match cells.iter().find(|cell| &cell.container != container) {
        Some(cell) => Err(StoreError::ForeignCell {
            expected: container.clone(),
            found: cell.container.clone(),
        }),
        None => Ok(()),
    }
}

fn write_all(grid: &mut Grid, cells: Vec<SparseCell>) -> usize {
    let count = cells.len();
    for cell in cells {
        grid.insert((cell.row_index, cell.column_index), cell);
    }
    count
}

#[async_trait]
impl CellStore for MemoryStore {
    async fn create(&self, container: &ContainerId) -> StoreResult<()> {
        let mut containers = self.containers.write().await;
        if containers.contains_key(container) {
            return Err(StoreError::AlreadyExists(container.clone()));
        }
        containers.insert(container.clone(), Grid::new());
        Ok(())
    }

    async fn list_cells(&self, container: &ContainerId) -> StoreResult<Vec<SparseCell>> {
        let containers = self.containers.read().await;
        let grid = containers
            .get(container)
            .ok_or_else(|| StoreError::NotFound(container.clone()))?;
        Ok(grid.values().cloned().collect())
    }

    async fn upsert_cells(&self, container: &ContainerId, cells: Vec<SparseCell>) -> StoreResult<usize> {
        check_ownership(container, &cells)?;
        let mut containers = self.containers.write().await;
        let grid = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::NotFound(container.clone()))?;
        Ok(write_all(grid, cells))
    }

    async fn replace_cells(&self, container: &ContainerId, cells: Vec<SparseCell>) -> StoreResult<usize> {
        check_ownership(container, &cells)?;
        let mut containers = self.containers.write().await;
        let grid = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::NotFound(container.clone()))?;
        grid.clear();
        Ok(write_all(grid, cells))
    }

    async fn clear(&self, container: &ContainerId) -> StoreResult<()> {
        let mut containers = self.containers.write().await;
        containers
            .get_mut(container)
            .ok_or_else(|| StoreError::NotFound(container.clone()))?
            .clear();
        Ok(())
    }
}
