//! Geometry capability layer for the tenon joint engine.
//!
//! The joint pipeline never reimplements a boolean-solid kernel; it consumes
//! one through the [`BrepKernel`] / [`BrepIntrospect`] traits defined here.
//! Any boundary-representation kernel with planar-face queries and
//! union/subtract booleans can sit behind them. [`MockKernel`] is a
//! deterministic test double over axis-aligned rectangular plates, used by
//! every test suite in the workspace.

pub mod geom;
pub mod mock_kernel;
pub mod traits;
pub mod types;

pub use geom::{Plane, PlaneFrame, Polygon, ANGULAR_TOL, LINEAR_TOL};
pub use mock_kernel::MockKernel;
pub use traits::{BrepIntrospect, BrepKernel, KernelSession};
pub use types::{CornerRelief, FaceHandle, KernelError, ReliefKind, SolidHandle, ToolSolid};
