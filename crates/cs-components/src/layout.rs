//! Process decomposition of the spherical mesh.
//!
//! Ranks are laid out cap by cap. Within a cap the radial (z) index varies
//! fastest, then x, then y:
//!
//! `rank = cap * per_cap + y * nprocx * nprocz + x * nprocz + z`

use crate::error::{ComponentError, ComponentResult};
use cs_inventory::ResolvedProperties;
use serde::Serialize;

/// Position of one process in the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ProcLocation {
    pub cap: usize,
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// Caps times an `nprocx * nprocy * nprocz` grid of processes per cap.
///
/// Products are checked once at construction; every getter is then
/// overflow-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessorLayout {
    caps: usize,
    nprocx: usize,
    nprocy: usize,
    nprocz: usize,
    per_cap: usize,
    total: usize,
}

impl ProcessorLayout {
    pub fn new(caps: usize, nprocx: usize, nprocy: usize, nprocz: usize) -> ComponentResult<Self> {
        if caps == 0 || nprocx == 0 || nprocy == 0 || nprocz == 0 {
            return Err(ComponentError::Layout {
                message: format!(
                    "every dimension must be positive (caps={caps}, nprocx={nprocx}, nprocy={nprocy}, nprocz={nprocz})"
                ),
            });
        }
        let (per_cap, total) = nprocx
            .checked_mul(nprocy)
            .and_then(|n| n.checked_mul(nprocz))
            .and_then(|per_cap| Some((per_cap, per_cap.checked_mul(caps)?)))
            .ok_or_else(|| ComponentError::Layout {
                message: format!(
                    "process count overflows (caps={caps}, nprocx={nprocx}, nprocy={nprocy}, nprocz={nprocz})"
                ),
            })?;
        Ok(Self {
            caps,
            nprocx,
            nprocy,
            nprocz,
            per_cap,
            total,
        })
    }

    /// Read `nproc_surf`, `nprocx`, `nprocy` and `nprocz` from resolved sphere properties.
    pub fn from_properties(props: &ResolvedProperties) -> ComponentResult<Self> {
        let dim = |name: &str| -> ComponentResult<usize> {
            let value = props.get_int(name).ok_or_else(|| ComponentError::Layout {
                message: format!("'{}' has no integer '{name}'", props.component()),
            })?;
            usize::try_from(value).map_err(|_| ComponentError::Layout {
                message: format!("'{name}' = {value} is not a process count"),
            })
        };
        Self::new(dim("nproc_surf")?, dim("nprocx")?, dim("nprocy")?, dim("nprocz")?)
    }

    pub fn caps(&self) -> usize {
        self.caps
    }

    pub fn nprocx(&self) -> usize {
        self.nprocx
    }

    pub fn nprocy(&self) -> usize {
        self.nprocy
    }

    pub fn nprocz(&self) -> usize {
        self.nprocz
    }

    pub fn per_cap(&self) -> usize {
        self.per_cap
    }

    /// Processes covering the surface (one radial layer).
    pub fn surface_procs(&self) -> usize {
        self.total / self.nprocz
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Fail unless `requested` processes is exactly what the layout needs.
    pub fn check_total(&self, requested: usize) -> ComponentResult<()> {
        if requested != self.total() {
            return Err(ComponentError::Layout {
                message: format!(
                    "requested {requested} processes but {} caps x {}x{}x{} needs {}",
                    self.caps,
                    self.nprocx,
                    self.nprocy,
                    self.nprocz,
                    self.total()
                ),
            });
        }
        Ok(())
    }

    pub fn location(&self, rank: usize) -> Option<ProcLocation> {
        if rank >= self.total() {
            return None;
        }
        let within = rank % self.per_cap();
        Some(ProcLocation {
            cap: rank / self.per_cap(),
            z: within % self.nprocz,
            x: (within / self.nprocz) % self.nprocx,
            y: within / (self.nprocz * self.nprocx),
        })
    }

    pub fn rank(&self, loc: ProcLocation) -> Option<usize> {
        if loc.cap >= self.caps || loc.x >= self.nprocx || loc.y >= self.nprocy || loc.z >= self.nprocz
        {
            return None;
        }
        Some(
            loc.cap * self.per_cap()
                + loc.y * self.nprocx * self.nprocz
                + loc.x * self.nprocz
                + loc.z,
        )
    }

    /// Ranks sharing radial layer `z`, ordered by cap, then x, then y.
    pub fn horizontal_group(&self, z: usize) -> Vec<usize> {
        if z >= self.nprocz {
            return Vec::new();
        }
        let mut ranks = Vec::with_capacity(self.surface_procs());
        for cap in 0..self.caps {
            for x in 0..self.nprocx {
                for y in 0..self.nprocy {
                    ranks.extend(self.rank(ProcLocation { cap, x, y, z }));
                }
            }
        }
        ranks
    }

    /// Ranks in the radial column above `(cap, x, y)`, innermost first.
    pub fn vertical_group(&self, cap: usize, x: usize, y: usize) -> Vec<usize> {
        (0..self.nprocz)
            .filter_map(|z| self.rank(ProcLocation { cap, x, y, z }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_rejected() {
        assert!(ProcessorLayout::new(1, 0, 1, 1).is_err());
    }

    #[test]
    fn z_varies_fastest() {
        let layout = ProcessorLayout::new(1, 2, 2, 2).unwrap();
        assert_eq!(
            layout.location(1),
            Some(ProcLocation {
                cap: 0,
                x: 0,
                y: 0,
                z: 1
            })
        );
        assert_eq!(
            layout.location(2),
            Some(ProcLocation {
                cap: 0,
                x: 1,
                y: 0,
                z: 0
            })
        );
        assert_eq!(
            layout.location(4),
            Some(ProcLocation {
                cap: 0,
                x: 0,
                y: 1,
                z: 0
            })
        );
        assert_eq!(layout.location(8), None);
    }

    #[test]
    fn groups_partition_ranks() {
        let layout = ProcessorLayout::new(2, 2, 1, 3).unwrap();
        assert_eq!(layout.horizontal_group(0), vec![0, 3, 6, 9]);
        assert_eq!(layout.vertical_group(1, 1, 0), vec![9, 10, 11]);
        assert!(layout.horizontal_group(3).is_empty());
    }

    #[test]
    fn overflowing_product_rejected() {
        let err = ProcessorLayout::new(12, 1 << 32, 1 << 32, 1).unwrap_err();
        assert!(matches!(err, ComponentError::Layout { .. }));
        assert!(ProcessorLayout::new(usize::MAX, 2, 1, 1).is_err());
        assert_eq!(ProcessorLayout::new(usize::MAX, 1, 1, 1).unwrap().total(), usize::MAX);
    }

    #[test]
    fn check_total_mismatch() {
        let layout = ProcessorLayout::new(12, 2, 2, 2).unwrap();
        assert!(layout.check_total(96).is_ok());
        let err = layout.check_total(8).unwrap_err();
        assert!(err.to_string().contains("96"));
    }
}
