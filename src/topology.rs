//! Horizontal element connectivity.
//!
//! A topology describes how the elements of a horizontal mesh are laid out and how their
//! boundary nodes are shared. Operators only ever act element by element; the shared node
//! numbering is needed for direct stiffness summation (see [`crate::dss`]).
use crate::space::{HorizontalDim, Line, Plane};
use crate::Real;
use eyre::eyre;
use nalgebra::{Point3, Scalar};
use numeric_literals::replace_float_literals;
use std::fmt::Debug;

/// Connectivity and corner geometry of a horizontal mesh of line or quadrilateral elements.
pub trait Topology<T: Real, D: HorizontalDim>: Debug + Send + Sync {
    fn num_elements(&self) -> usize;

    /// Corner vertices of the element.
    ///
    /// Line elements have two vertices. Quadrilateral elements have four vertices, ordered
    /// counter-clockwise starting from the corner at reference coordinates `(-1, -1)`.
    fn element_vertices(&self, element: usize) -> Vec<Point3<T>>;

    /// Neighbors of the element across each of its faces, `None` at a domain boundary.
    ///
    /// Faces are ordered `ξ¹ = -1`, `ξ¹ = 1`, followed by `ξ² = -1`, `ξ² = 1` for
    /// quadrilaterals.
    fn neighbors(&self, element: usize) -> Vec<Option<usize>>;

    /// Whether the mesh wraps around along the given horizontal axis (zero-based).
    fn is_periodic(&self, axis: usize) -> bool;

    /// The number of distinct nodes when elements carry `nq` nodes per axis.
    fn num_global_nodes(&self, nq: usize) -> usize;

    /// The global number of local node `(i, j)` of the element.
    fn global_node(&self, element: usize, i: usize, j: usize, nq: usize) -> usize;

    /// Maps a point of the reference element to physical coordinates.
    ///
    /// The default is the multilinear interpolation of the corner vertices.
    fn map_reference_point(&self, element: usize, xi: [T; 2]) -> Point3<T> {
        let vertices = self.element_vertices(element);
        bilinear_map(&vertices, xi)
    }
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn bilinear_map<T: Real>(vertices: &[Point3<T>], xi: [T; 2]) -> Point3<T> {
    let [s, t] = xi;
    match vertices {
        [a, b] => Point3::from(a.coords * ((1.0 - s) * 0.5) + b.coords * ((1.0 + s) * 0.5)),
        [a, b, c, d] => {
            let phi = [
                (1.0 - s) * (1.0 - t) * 0.25,
                (1.0 + s) * (1.0 - t) * 0.25,
                (1.0 + s) * (1.0 + t) * 0.25,
                (1.0 - s) * (1.0 + t) * 0.25,
            ];
            Point3::from(a.coords * phi[0] + b.coords * phi[1] + c.coords * phi[2] + d.coords * phi[3])
        }
        _ => panic!("Elements must have two or four vertices, got {}", vertices.len()),
    }
}

fn global_index_1d(element: usize, i: usize, nq: usize, num_nodes: usize, periodic: bool) -> usize {
    let index = element * (nq - 1) + i;
    if periodic {
        index % num_nodes
    } else {
        index
    }
}

fn num_nodes_1d(num_elements: usize, nq: usize, periodic: bool) -> usize {
    let interior = num_elements * (nq - 1);
    if periodic {
        interior
    } else {
        interior + 1
    }
}

/// A uniform partition of an interval into line elements.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTopology<T: Scalar> {
    x_min: T,
    x_max: T,
    num_elements: usize,
    periodic: bool,
}

impl<T: Real> IntervalTopology<T> {
    pub fn new(x_min: T, x_max: T, num_elements: usize, periodic: bool) -> eyre::Result<Self> {
        if num_elements == 0 {
            return Err(eyre!("An interval must be partitioned into at least one element"));
        }
        if !(x_max > x_min) {
            return Err(eyre!("Interval bounds must satisfy x_min < x_max"));
        }
        Ok(Self {
            x_min,
            x_max,
            num_elements,
            periodic,
        })
    }

    fn element_length(&self) -> T {
        (self.x_max - self.x_min) / T::from_usize(self.num_elements).unwrap_or_else(T::one)
    }
}

impl<T: Real> Topology<T, Line> for IntervalTopology<T> {
    fn num_elements(&self) -> usize {
        self.num_elements
    }

    fn element_vertices(&self, element: usize) -> Vec<Point3<T>> {
        assert!(element < self.num_elements, "Element index out of bounds");
        let h = self.element_length();
        let x0 = self.x_min + h * T::from_usize(element).unwrap_or_else(T::zero);
        vec![Point3::new(x0, T::zero(), T::zero()), Point3::new(x0 + h, T::zero(), T::zero())]
    }

    fn neighbors(&self, element: usize) -> Vec<Option<usize>> {
        let n = self.num_elements;
        let left = match element {
            0 if self.periodic => Some(n - 1),
            0 => None,
            e => Some(e - 1),
        };
        let right = if element + 1 < n {
            Some(element + 1)
        } else if self.periodic {
            Some(0)
        } else {
            None
        };
        vec![left, right]
    }

    fn is_periodic(&self, axis: usize) -> bool {
        axis == 0 && self.periodic
    }

    fn num_global_nodes(&self, nq: usize) -> usize {
        num_nodes_1d(self.num_elements, nq, self.periodic)
    }

    fn global_node(&self, element: usize, i: usize, _j: usize, nq: usize) -> usize {
        global_index_1d(element, i, nq, self.num_global_nodes(nq), self.periodic)
    }
}

/// A uniform partition of an axis-aligned rectangle into `nx x ny` quadrilaterals.
///
/// Element `(ex, ey)` has index `ey * nx + ex`.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleTopology<T: Scalar> {
    min: [T; 2],
    max: [T; 2],
    cells: [usize; 2],
    periodic: [bool; 2],
}

impl<T: Real> RectangleTopology<T> {
    pub fn new(min: [T; 2], max: [T; 2], cells: [usize; 2], periodic: [bool; 2]) -> eyre::Result<Self> {
        if cells.iter().any(|&n| n == 0) {
            return Err(eyre!("A rectangle must be partitioned into at least one element per axis"));
        }
        if !(max[0] > min[0] && max[1] > min[1]) {
            return Err(eyre!("Rectangle bounds must satisfy min < max along both axes"));
        }
        Ok(Self {
            min,
            max,
            cells,
            periodic,
        })
    }

    /// The unit square `[0, 1]^2` with the given number of cells per axis.
    pub fn unit_square(cells: [usize; 2], periodic: [bool; 2]) -> eyre::Result<Self> {
        Self::new([T::zero(), T::zero()], [T::one(), T::one()], cells, periodic)
    }

    pub fn cells_per_axis(&self) -> [usize; 2] {
        self.cells
    }

    fn cell_size(&self, axis: usize) -> T {
        (self.max[axis] - self.min[axis]) / T::from_usize(self.cells[axis]).unwrap_or_else(T::one)
    }

    fn cell_coordinates(&self, element: usize) -> [usize; 2] {
        [element % self.cells[0], element / self.cells[0]]
    }

    fn neighbor_along(&self, cell: [usize; 2], axis: usize, forward: bool) -> Option<usize> {
        let n = self.cells[axis];
        let c = cell[axis];
        let shifted = match (forward, c) {
            (true, c) if c + 1 < n => Some(c + 1),
            (true, _) if self.periodic[axis] => Some(0),
            (false, c) if c > 0 => Some(c - 1),
            (false, _) if self.periodic[axis] => Some(n - 1),
            _ => None,
        }?;
        let mut neighbor = cell;
        neighbor[axis] = shifted;
        Some(neighbor[1] * self.cells[0] + neighbor[0])
    }
}

impl<T: Real> Topology<T, Plane> for RectangleTopology<T> {
    fn num_elements(&self) -> usize {
        self.cells[0] * self.cells[1]
    }

    fn element_vertices(&self, element: usize) -> Vec<Point3<T>> {
        assert!(element < Topology::<T, Plane>::num_elements(self), "Element index out of bounds");
        let [ex, ey] = self.cell_coordinates(element);
        let (hx, hy) = (self.cell_size(0), self.cell_size(1));
        let x0 = self.min[0] + hx * T::from_usize(ex).unwrap_or_else(T::zero);
        let y0 = self.min[1] + hy * T::from_usize(ey).unwrap_or_else(T::zero);
        let z = T::zero();
        vec![
            Point3::new(x0, y0, z),
            Point3::new(x0 + hx, y0, z),
            Point3::new(x0 + hx, y0 + hy, z),
            Point3::new(x0, y0 + hy, z),
        ]
    }

    fn neighbors(&self, element: usize) -> Vec<Option<usize>> {
        let cell = self.cell_coordinates(element);
        vec![
            self.neighbor_along(cell, 0, false),
            self.neighbor_along(cell, 0, true),
            self.neighbor_along(cell, 1, false),
            self.neighbor_along(cell, 1, true),
        ]
    }

    fn is_periodic(&self, axis: usize) -> bool {
        self.periodic.get(axis).copied().unwrap_or(false)
    }

    fn num_global_nodes(&self, nq: usize) -> usize {
        num_nodes_1d(self.cells[0], nq, self.periodic[0]) * num_nodes_1d(self.cells[1], nq, self.periodic[1])
    }

    fn global_node(&self, element: usize, i: usize, j: usize, nq: usize) -> usize {
        let [ex, ey] = self.cell_coordinates(element);
        let nx = num_nodes_1d(self.cells[0], nq, self.periodic[0]);
        let ny = num_nodes_1d(self.cells[1], nq, self.periodic[1]);
        let gx = global_index_1d(ex, i, nq, nx, self.periodic[0]);
        let gy = global_index_1d(ey, j, nq, ny, self.periodic[1]);
        gy * nx + gx
    }
}
