//! Host conversion
//!
//! Turns scene payloads into host-native data:
//! - HostObject / HostValue: what a host stores on its outputs
//! - ConverterRegistry: payload kind -> converter factory
//! - Parameters / ParameterParser: typed per-query conversion overrides

pub mod converters;
pub mod host;
pub mod parameters;
pub mod registry;

pub use converters::{CurvesConverter, MeshConverter};
pub use host::{CurveForm, HostCurve, HostMesh, HostObject, HostValue};
pub use parameters::{ParameterParser, ParameterValue, Parameters};
pub use registry::{ConverterRegistry, ToHostConverter};
