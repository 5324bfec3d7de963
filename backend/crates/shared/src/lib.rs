//! Shared Kernel
//!
//! The smallest cross-crate vocabulary:
//! - The unified error type ([`error::app_error::AppError`]) and its classification
//! - Typed identifiers ([`id::Id`])
//!
//! Only things whose meaning is identical in every crate belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
