mod dss;
mod execution;
mod interpolate;
mod tensor;
mod value;
mod vector;
