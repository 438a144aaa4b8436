#![deny(unsafe_code)]
//! Audio-reactive modulation for the noise flow field.
//!
//! An [`AudioFrame`] carries eight band energies and an overall amplitude.
//! The [`Modulator`] turns each frame into flow-field knob values (move and
//! rotation speed, per-particle scale) and two sets of per-band colors.
//! [`AudioFlowField`] bundles a field and a modulator behind the `Engine` trait.

pub mod field;
pub mod frame;
pub mod modulator;

pub use field::AudioFlowField;
pub use frame::{AudioFrame, BAND_COUNT};
pub use modulator::{ColorChannel, Modulator, ModulatorConfig};
