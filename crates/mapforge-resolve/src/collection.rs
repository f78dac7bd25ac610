//! Collection projection
//!
//! Picks between direct assignment, a primitive array copy and a
//! per-element transform followed by a terminal that materializes the
//! target shape.

use crate::context::ResolveContext;
use crate::conversion::{resolve_conversion, ValueConversion};
use crate::error::ResolveError;
use mapforge_diagnostics::{Diagnostic, DiagnosticKind, Resolved};
use mapforge_schema::{CollectionShape, CollectionType, Location, ShapeCategory, TypeRef};
use serde::{Deserialize, Serialize};

/// How the transformed elements are materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeTerminal {
    /// Allocate the target array at the source length and assign by index
    ArrayFill {
        /// Read the source by index instead of enumerating it
        source_indexed: bool,
    },
    /// Collect the sequence into an array
    ArrayCollect,
    /// Pre-size a list at the source count and add every element
    ListPresized {
        /// Read the source by index instead of enumerating it
        source_indexed: bool,
    },
    /// Collect the sequence into a list
    ListCollect,
    /// Create the collection and add every element
    CollectionAdd {
        /// Pre-size with the source count
        presize: bool,
    },
    /// Lazy transform, never materialized
    Lazy,
    /// Fill an immutable-array builder
    ImmutableBuilder {
        /// Pre-size with the source count
        presize: bool,
    },
}

/// Resolved collection conversion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionProjection {
    /// Reuse the source instance
    Assign,
    /// Copy a primitive array element-wise into a new array
    CopyArray,
    /// Convert every element, then materialize the target shape
    Transform {
        /// Per-element conversion
        element: Box<ValueConversion>,
        /// Materialization
        terminal: ShapeTerminal,
    },
}

/// Terminal for materializing `target` from a `source` sequence
#[must_use]
pub fn terminal_for(source: CollectionShape, target: CollectionShape) -> ShapeTerminal {
    let sized = source.is_sized();
    let source_indexed = source.is_indexable();
    match target.category() {
        ShapeCategory::FixedSize if sized => ShapeTerminal::ArrayFill { source_indexed },
        ShapeCategory::FixedSize => ShapeTerminal::ArrayCollect,
        ShapeCategory::ListLike if sized => ShapeTerminal::ListPresized { source_indexed },
        ShapeCategory::ListLike => ShapeTerminal::ListCollect,
        ShapeCategory::CollectionLike => ShapeTerminal::CollectionAdd { presize: sized },
        ShapeCategory::EnumerableOnly => ShapeTerminal::Lazy,
        ShapeCategory::ImmutableArrayLike => ShapeTerminal::ImmutableBuilder { presize: sized },
    }
}

fn shape_not_found(
    ctx: &ResolveContext<'_>,
    member: &str,
    source: &CollectionType,
    target: &CollectionType,
    reason: &str,
    location: Option<&Location>,
) -> Resolved<Option<CollectionProjection>> {
    let source = ctx.display(&TypeRef::Collection(source.clone()));
    let target = ctx.display(&TypeRef::Collection(target.clone()));
    Resolved::failed(
        None,
        Diagnostic::new(DiagnosticKind::SuitableCollectionShapeNotFound)
            .with("member", member)
            .with("source_type", source)
            .with("target_type", target)
            .with("reason", reason)
            .at(location),
    )
}

/// Resolve the projection between two collection types
///
/// # Errors
/// Returns [`ResolveError::Schema`] for dangling element type ids
pub fn resolve_projection(
    ctx: &ResolveContext<'_>,
    member: &str,
    source: &CollectionType,
    target: &CollectionType,
    location: Option<&Location>,
) -> Result<Resolved<Option<CollectionProjection>>, ResolveError> {
    if !ctx.config.projection_shapes.contains(&target.shape) {
        return Ok(shape_not_found(
            ctx,
            member,
            source,
            target,
            "unsupported_target_shape",
            location,
        ));
    }

    let upcast = target.shape == CollectionShape::Enumerable;
    let (source_element, target_element) = match (source.element(), target.element()) {
        (Some(s), Some(t)) => (s, t),
        (_, None) if upcast || source.shape == target.shape => {
            return Ok(Resolved::ok(Some(CollectionProjection::Assign)));
        }
        (None, Some(_)) => {
            return Ok(shape_not_found(ctx, member, source, target, "untyped_source", location));
        }
        (_, None) => {
            return Ok(shape_not_found(ctx, member, source, target, "untyped_target", location));
        }
    };

    if source_element == target_element {
        if source.shape == target.shape {
            let copy = source.shape == CollectionShape::Array
                && ctx.settings.copy_primitive_arrays
                && source_element.is_primitive();
            let projection = if copy {
                CollectionProjection::CopyArray
            } else {
                CollectionProjection::Assign
            };
            return Ok(Resolved::ok(Some(projection)));
        }
        if upcast {
            return Ok(Resolved::ok(Some(CollectionProjection::Assign)));
        }
    }

    let element = resolve_conversion(ctx, member, source_element, target_element, location)?;
    Ok(element.map(|conversion| {
        conversion.map(|c| CollectionProjection::Transform {
            element: Box::new(c),
            terminal: terminal_for(source.shape, target.shape),
        })
    }))
}
