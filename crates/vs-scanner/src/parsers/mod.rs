//! One module per manifest format (spec.md §4.2). Each exposes a unit
//! struct implementing `ManifestParser`.

pub mod cargo;
pub mod cmake;
pub mod conan;
pub mod foundry;
pub mod gitmodules;
pub mod gomod;
pub mod gradle;
pub mod maven;
pub mod pip;
pub mod pyproject;
pub mod vcpkg;
