//! Input: raw device frames mapped to the actions the controllers read.
//!
//! # Invariants
//! - Controllers consume [`FrameInput`], never raw device state.
//! - Edge-triggered actions fire on exactly one frame per press.
//! - An unbound action reads as `None`, never as a silent zero.

pub mod action;
pub mod device;
pub mod pointer;
pub mod reader;

pub use action::{ActionMap, ActionName, Binding, InputError};
pub use device::{DeviceFrame, GamepadButton, Key, Stick};
pub use pointer::PointerCapture;
pub use reader::{EdgeDetector, FrameInput, InputReader, LocomotionInput};
