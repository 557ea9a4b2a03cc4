//! Spectral-element spaces: topology, quadrature, vertical structure and precomputed geometry.
use crate::execution::Device;
use crate::geometry::{compute_slab_geometry, LocalGeometry};
use crate::quadrature::SpectralQuadrature;
use crate::topology::Topology;
use crate::vector::{Axes, Axes12, Axis1};
use crate::Real;
use eyre::eyre;
use nalgebra::{Point3, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Range;
use std::sync::Arc;

/// The horizontal dimension of a space, known at compile time.
pub trait HorizontalDim: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    const DIM: usize;
    const NAME: &'static str;
    /// The reference axes spanned by the horizontal elements.
    type Axes: Axes;
}

/// One-dimensional horizontal elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Line;

/// Two-dimensional (quadrilateral) horizontal elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plane;

impl HorizontalDim for Line {
    const DIM: usize = 1;
    const NAME: &'static str = "line";
    type Axes = Axis1;
}

impl HorizontalDim for Plane {
    const DIM: usize = 2;
    const NAME: &'static str = "plane";
    type Axes = Axes12;
}

/// Vertical placement of the levels of an extruded space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Staggering {
    /// One level per cell, located at the cell midpoint.
    CellCenter,
    /// One level per cell face, including top and bottom.
    CellFace,
}

/// Heights of the cell faces of a vertical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalGrid<T: Scalar> {
    faces: Vec<T>,
}

impl<T: Real> VerticalGrid<T> {
    /// Creates a grid from strictly increasing face heights.
    pub fn new(faces: Vec<T>) -> eyre::Result<Self> {
        if faces.len() < 2 {
            return Err(eyre!("A vertical grid needs at least two faces"));
        }
        if faces.windows(2).any(|pair| !(pair[1] > pair[0])) {
            return Err(eyre!("Vertical face heights must be strictly increasing"));
        }
        Ok(Self { faces })
    }

    pub fn uniform(bottom: T, top: T, num_cells: usize) -> eyre::Result<Self> {
        let n = T::from_usize(num_cells).ok_or_else(|| eyre!("Cell count does not fit in scalar type"))?;
        let faces = (0..=num_cells)
            .map(|v| bottom + (top - bottom) * T::from_usize(v).unwrap_or_else(T::zero) / n)
            .collect();
        Self::new(faces)
    }

    pub fn faces(&self) -> &[T] {
        &self.faces
    }

    pub fn num_cells(&self) -> usize {
        self.faces.len() - 1
    }

    pub fn num_levels(&self, staggering: Staggering) -> usize {
        match staggering {
            Staggering::CellCenter => self.num_cells(),
            Staggering::CellFace => self.faces.len(),
        }
    }

    /// Height and thickness associated with the given level.
    ///
    /// Face levels are assigned half of each adjacent cell.
    pub fn level(&self, staggering: Staggering, level: usize) -> (T, T) {
        let f = &self.faces;
        let two = T::one() + T::one();
        match staggering {
            Staggering::CellCenter => ((f[level] + f[level + 1]) / two, f[level + 1] - f[level]),
            Staggering::CellFace => {
                let below = if level > 0 { f[level - 1] } else { f[level] };
                let above = if level + 1 < f.len() { f[level + 1] } else { f[level] };
                (f[level], (above - below) / two)
            }
        }
    }
}

/// Location of a single node.
///
/// `i` and `j` are the node indices within the element along the first and second reference
/// axes, `v` the vertical level and `h` the horizontal element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex {
    pub i: usize,
    pub j: usize,
    pub v: usize,
    pub h: usize,
}

/// One vertical level of one horizontal element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlabIndex {
    pub h: usize,
    pub v: usize,
}

impl SlabIndex {
    pub fn node(&self, i: usize, j: usize) -> NodeIndex {
        NodeIndex { i, j, v: self.v, h: self.h }
    }
}

/// Memory layout of field data.
///
/// Nodes are stored at `((h * num_levels + v) * nq_j + j) * nq + i`, so that every slab and
/// every element column occupies a contiguous range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLayout {
    nq: usize,
    nq_j: usize,
    num_levels: usize,
    num_elements: usize,
}

impl DataLayout {
    pub fn nq(&self) -> usize {
        self.nq
    }

    /// Nodes along the second reference axis, one for line elements.
    pub fn nq_j(&self) -> usize {
        self.nq_j
    }

    pub fn num_levels(&self) -> usize {
        self.num_levels
    }

    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    pub fn slab_len(&self) -> usize {
        self.nq * self.nq_j
    }

    pub fn column_len(&self) -> usize {
        self.slab_len() * self.num_levels
    }

    pub fn len(&self) -> usize {
        self.column_len() * self.num_elements
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_slabs(&self) -> usize {
        self.num_levels * self.num_elements
    }

    pub fn index(&self, node: NodeIndex) -> usize {
        debug_assert!(node.i < self.nq && node.j < self.nq_j);
        debug_assert!(node.v < self.num_levels && node.h < self.num_elements);
        ((node.h * self.num_levels + node.v) * self.nq_j + node.j) * self.nq + node.i
    }

    pub fn slab_range(&self, slab: SlabIndex) -> Range<usize> {
        let start = (slab.h * self.num_levels + slab.v) * self.slab_len();
        start..start + self.slab_len()
    }

    /// The slab stored at the given position in slab order.
    pub fn slab_at(&self, position: usize) -> SlabIndex {
        SlabIndex {
            h: position / self.num_levels,
            v: position % self.num_levels,
        }
    }
}

/// A spectral-element space.
///
/// Spaces are immutable once built and are shared by reference counting. Two spaces are
/// considered the same space only if they are the same allocation, see [`Space::same`].
pub struct Space<T: Real, D: HorizontalDim> {
    topology: Arc<dyn Topology<T, D>>,
    quadrature: SpectralQuadrature<T>,
    vertical: Option<(VerticalGrid<T>, Staggering)>,
    device: Device,
    layout: DataLayout,
    geometry: Vec<LocalGeometry<T>>,
}

impl<T: Real, D: HorizontalDim> Space<T, D> {
    pub fn builder(topology: Arc<dyn Topology<T, D>>, nq: usize) -> SpaceBuilder<T, D> {
        SpaceBuilder::new(topology, nq)
    }

    /// Whether the two handles refer to the same space.
    pub fn same(a: &Arc<Self>, b: &Arc<Self>) -> bool {
        Arc::ptr_eq(a, b)
    }

    pub fn topology(&self) -> &Arc<dyn Topology<T, D>> {
        &self.topology
    }

    /// Whether both spaces are built on the same topology and the same vertical levels.
    ///
    /// Such spaces differ at most in their number of nodes per element and may be connected by
    /// interpolation and restriction.
    pub fn shares_mesh_with(&self, other: &Self) -> bool {
        let same_topology = std::ptr::eq(
            Arc::as_ptr(&self.topology) as *const u8,
            Arc::as_ptr(&other.topology) as *const u8,
        );
        same_topology && self.vertical == other.vertical
    }

    pub fn quadrature(&self) -> &SpectralQuadrature<T> {
        &self.quadrature
    }

    /// Number of nodes per element along each horizontal axis.
    pub fn nq(&self) -> usize {
        self.layout.nq
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn num_elements(&self) -> usize {
        self.layout.num_elements
    }

    pub fn num_levels(&self) -> usize {
        self.layout.num_levels
    }

    pub fn vertical(&self) -> Option<&(VerticalGrid<T>, Staggering)> {
        self.vertical.as_ref()
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn local_geometry(&self, node: NodeIndex) -> &LocalGeometry<T> {
        &self.geometry[self.layout.index(node)]
    }

    pub fn slab_geometry(&self, slab: SlabIndex) -> &[LocalGeometry<T>] {
        &self.geometry[self.layout.slab_range(slab)]
    }

    /// The geometry of all nodes, in data layout order.
    pub fn geometry(&self) -> &[LocalGeometry<T>] {
        &self.geometry
    }
}

impl<T: Real, D: HorizontalDim> Debug for Space<T, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Space")
            .field("topology", &self.topology)
            .field("nq", &self.layout.nq)
            .field("vertical", &self.vertical)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl<T: Real, D: HorizontalDim> Display for Space<T, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} space with {} elements, {} nodes per axis and {} levels at {:p}",
            D::NAME,
            self.layout.num_elements,
            self.layout.nq,
            self.layout.num_levels,
            self
        )
    }
}

type CoordinateMap<T> = Box<dyn Fn(&Point3<T>) -> Point3<T> + Send + Sync>;

/// Configures and constructs a [`Space`].
pub struct SpaceBuilder<T: Real, D: HorizontalDim> {
    topology: Arc<dyn Topology<T, D>>,
    nq: usize,
    vertical: Option<(VerticalGrid<T>, Staggering)>,
    device: Device,
    coordinate_map: Option<CoordinateMap<T>>,
}

impl<T: Real, D: HorizontalDim> SpaceBuilder<T, D> {
    pub fn new(topology: Arc<dyn Topology<T, D>>, nq: usize) -> Self {
        Self {
            topology,
            nq,
            vertical: None,
            device: Device::default(),
            coordinate_map: None,
        }
    }

    /// Extrudes the horizontal mesh along the given vertical grid.
    pub fn with_vertical(mut self, grid: VerticalGrid<T>, staggering: Staggering) -> Self {
        self.vertical = Some((grid, staggering));
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Warps the horizontal coordinates of all nodes with the given map.
    ///
    /// The map is applied after the multilinear element map, so it can be used to build
    /// curvilinear elements.
    pub fn with_coordinate_map(mut self, map: impl Fn(&Point3<T>) -> Point3<T> + Send + Sync + 'static) -> Self {
        self.coordinate_map = Some(Box::new(map));
        self
    }

    pub fn build(self) -> eyre::Result<Arc<Space<T, D>>> {
        let quadrature = SpectralQuadrature::gauss_lobatto(self.nq)?;
        let nq = quadrature.num_points();
        let nq_j = if D::DIM == 2 { nq } else { 1 };
        let num_elements = self.topology.num_elements();
        let num_levels = match &self.vertical {
            Some((grid, staggering)) => grid.num_levels(*staggering),
            None => 1,
        };
        let layout = DataLayout {
            nq,
            nq_j,
            num_levels,
            num_elements,
        };

        let points = quadrature.points();
        let mut geometry = Vec::with_capacity(layout.len());
        for h in 0..num_elements {
            let mut horizontal = Vec::with_capacity(layout.slab_len());
            for j in 0..nq_j {
                for i in 0..nq {
                    let eta = if nq_j > 1 { points[j] } else { T::zero() };
                    let x = self.topology.map_reference_point(h, [points[i], eta]);
                    horizontal.push(match &self.coordinate_map {
                        Some(map) => map(&x),
                        None => x,
                    });
                }
            }

            for v in 0..num_levels {
                let (z, thickness) = match &self.vertical {
                    Some((grid, staggering)) => grid.level(*staggering, v),
                    None => (T::zero(), T::one()),
                };
                let coordinates: Vec<_> = horizontal
                    .iter()
                    .map(|x| Point3::new(x.x, x.y, x.z + z))
                    .collect();
                let slab = compute_slab_geometry(&coordinates, &quadrature, nq_j, thickness)
                    .map_err(|err| eyre!("Invalid geometry in element {}, level {}: {}", h, v, err))?;
                geometry.extend(slab);
            }
        }

        let space = Space {
            topology: self.topology,
            quadrature,
            vertical: self.vertical,
            device: self.device,
            layout,
            geometry,
        };
        log::debug!("Constructed {} ({} nodes)", space, layout.len());
        Ok(Arc::new(space))
    }
}
