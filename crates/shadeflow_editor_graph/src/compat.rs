// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connector compatibility gate.

use crate::node::{Direction, Item};

/// Decides whether a candidate connector pair may be linked.
///
/// Strategies are pure with respect to the graph: the model consults them on
/// every candidate structural connection before committing it, and a negative
/// verdict leaves the model unchanged.
pub trait CompatibilityStrategy {
    /// Whether `from` may drive `to`.
    fn can_connect(&self, from: &Item, to: &Item) -> bool;
}

/// Default strategy for shader fragment graphs.
///
/// Requires an output-to-input pair and value types that are equal, `auto`
/// on either side, or an implicit scalar/vector widening of the same base
/// type (`float` into `float3`, but never the reverse).
#[derive(Debug, Default, Clone, Copy)]
pub struct FragmentCompatibility;

impl CompatibilityStrategy for FragmentCompatibility {
    fn can_connect(&self, from: &Item, to: &Item) -> bool {
        if from.direction != Direction::Output || to.direction != Direction::Input {
            return false;
        }
        types_compatible(&from.type_name, &to.type_name)
    }
}

/// Strategy that accepts every output-to-input pair regardless of type.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysCompatible;

impl CompatibilityStrategy for AlwaysCompatible {
    fn can_connect(&self, _from: &Item, _to: &Item) -> bool {
        true
    }
}

fn types_compatible(from: &str, to: &str) -> bool {
    if from == to || from == "auto" || to == "auto" {
        return true;
    }
    match (split_vector(from), split_vector(to)) {
        (Some((from_base, from_dim)), Some((to_base, to_dim))) => {
            from_base == to_base && from_dim <= to_dim
        }
        _ => false,
    }
}

/// Split a scalar or vector type into base name and dimension:
/// `"float3"` into `("float", 3)`, `"float"` into `("float", 1)`.
/// Matrix types like `"float4x4"` are not vectors and match exactly only.
fn split_vector(type_name: &str) -> Option<(&str, u32)> {
    let base = type_name.trim_end_matches(|c: char| c.is_ascii_digit());
    if base.is_empty() || base.ends_with('x') {
        return None;
    }
    if base.len() == type_name.len() {
        return Some((base, 1));
    }
    type_name[base.len()..].parse().ok().map(|dim| (base, dim))
}
