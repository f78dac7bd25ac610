//! Source access path resolution
//!
//! A target member finds its value through, in order: an explicit path
//! (configuration directive or member-attached rename), a same-named source
//! member, or auto-flattening (`ManagerName` → `Manager.Name`).
//! Zero-argument accessors participate under their own name or with the
//! `Get` prefix dropped.

use crate::context::ResolveContext;
use mapforge_schema::{MemberDescriptor, MemberKind, MemberPath, TypeDescriptor, TypeRef};
use serde::{Deserialize, Serialize};

/// Maximum number of segments an auto-flattened path may have
pub const MAX_FLATTENING_DEPTH: usize = 8;

/// One step of a source path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    /// Member name as declared
    pub name: String,
    /// Property/field or accessor call
    pub kind: MemberKind,
    /// Whether the value read at this step may be null
    pub nullable: bool,
}

/// Resolved access path into the source value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePath {
    /// Steps from the source root
    pub segments: Vec<PathSegment>,
    /// Type of the final value
    pub ty: TypeRef,
}

impl SourcePath {
    /// Dotted member path
    #[must_use]
    pub fn path(&self) -> MemberPath {
        MemberPath::new(self.segments.iter().map(|s| s.name.clone()).collect())
    }

    /// Root member read from the source object
    #[must_use]
    pub fn root(&self) -> Option<&str> {
        self.segments.first().map(|s| s.name.as_str())
    }

    /// Whether any step may yield null
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.segments.iter().any(|s| s.nullable)
    }

    /// Whether the path traverses nested members
    #[inline]
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    fn prepend(mut self, head: PathSegment) -> Self {
        self.segments.insert(0, head);
        self
    }
}

/// Names under which a source member can be addressed
fn member_aliases(member: &MemberDescriptor) -> impl Iterator<Item = &str> {
    let stripped = match member.kind {
        MemberKind::Accessor => member
            .name
            .strip_prefix("Get")
            .filter(|rest| !rest.is_empty()),
        MemberKind::Property => None,
    };
    std::iter::once(member.name.as_str()).chain(stripped)
}

fn segment(ctx: &ResolveContext<'_>, member: &MemberDescriptor) -> PathSegment {
    PathSegment {
        name: member.name.clone(),
        kind: member.kind,
        nullable: ctx.is_nullable(member.nullability, &member.ty),
    }
}

/// Find a readable member of `owner` addressable as `name`
///
/// Exact declared names win over `Get`-stripped accessor aliases.
#[must_use]
pub fn find_member<'t>(
    ctx: &ResolveContext<'_>,
    owner: &'t TypeDescriptor,
    name: &str,
) -> Option<&'t MemberDescriptor> {
    let readable = || owner.members.iter().filter(|m| m.is_readable());
    readable()
        .find(|m| ctx.names_match(&m.name, name))
        .or_else(|| readable().find(|m| member_aliases(m).any(|a| ctx.names_match(a, name))))
}

/// Resolve an explicit dotted path against the source type
///
/// Returns `None` if any segment does not resolve.
#[must_use]
pub fn resolve_explicit(ctx: &ResolveContext<'_>, path: &MemberPath) -> Option<SourcePath> {
    let mut owner = ctx.source;
    let mut segments = Vec::with_capacity(path.len());
    let mut ty = None;

    for (i, name) in path.iter().enumerate() {
        let member = find_member(ctx, owner, name)?;
        segments.push(segment(ctx, member));
        if i + 1 < path.len() {
            owner = ctx.table.get(member.ty.as_named()?).ok()?;
        }
        ty = Some(member.ty.clone());
    }

    Some(SourcePath { segments, ty: ty? })
}

/// Resolve the implicit source of a target member name
///
/// Same name on the source first, auto-flattening second.
#[must_use]
pub fn resolve_implicit(ctx: &ResolveContext<'_>, target_name: &str) -> Option<SourcePath> {
    resolve_in(ctx, ctx.source, target_name, 1)
}

fn resolve_in(
    ctx: &ResolveContext<'_>,
    owner: &TypeDescriptor,
    name: &str,
    depth: usize,
) -> Option<SourcePath> {
    if let Some(member) = find_member(ctx, owner, name) {
        return Some(SourcePath {
            segments: vec![segment(ctx, member)],
            ty: member.ty.clone(),
        });
    }
    if depth >= MAX_FLATTENING_DEPTH {
        return None;
    }
    flatten(ctx, owner, name, depth)
}

/// Try every readable member whose name is a word-boundary prefix of
/// `name`, longest prefix first, and resolve the rest inside it.
fn flatten(
    ctx: &ResolveContext<'_>,
    owner: &TypeDescriptor,
    name: &str,
    depth: usize,
) -> Option<SourcePath> {
    let mut candidates: Vec<(&MemberDescriptor, &str)> = owner
        .members
        .iter()
        .filter(|m| m.is_readable())
        .filter_map(|m| {
            member_aliases(m)
                .filter_map(|alias| split_prefix(ctx, name, alias))
                .next()
                .map(|rest| (m, rest))
        })
        .collect();
    // Longest prefix first; stable, so declaration order breaks ties
    candidates.sort_by_key(|(_, rest)| rest.len());

    candidates.into_iter().find_map(|(member, rest)| {
        let nested = ctx.table.get(member.ty.as_named()?).ok()?;
        if nested.is_enum() {
            return None;
        }
        resolve_in(ctx, nested, rest, depth + 1).map(|tail| tail.prepend(segment(ctx, member)))
    })
}

/// Remainder of `name` after `prefix`, if the split falls on a word boundary
fn split_prefix<'n>(ctx: &ResolveContext<'_>, name: &'n str, prefix: &str) -> Option<&'n str> {
    if prefix.len() >= name.len() || !name.is_char_boundary(prefix.len()) {
        return None;
    }
    let (head, rest) = name.split_at(prefix.len());
    if !ctx.names_match(head, prefix) {
        return None;
    }
    let rest = rest.trim_start_matches('_');
    let first = rest.chars().next()?;
    let boundary = first.is_uppercase() || first.is_ascii_digit() || head.ends_with('_');
    boundary.then_some(rest)
}
