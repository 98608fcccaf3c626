use crate::builder::{Kind, ZodBuilder};
use crate::options::ZodVersion;
use crate::schema::SchemaPath;
use crate::serialization::quote;
use std::cell::Cell;
use std::rc::Rc;

/// Message carried by every `not` refinement.
pub const NOT_MESSAGE: &str = "Invalid input: Should NOT be valid against schema";

impl ZodBuilder {
    /// Ordered disjunction. Duplicate options are kept.
    pub fn union(options: Vec<ZodBuilder>) -> Self {
        Self::new(Kind::Union(options))
    }

    /// Conjunction of `parts`, rendered as a right-nested chain of binary intersections.
    pub fn intersection(parts: Vec<ZodBuilder>) -> Self {
        Self::new(Kind::Intersection(parts))
    }

    pub fn discriminated_union(discriminator: impl Into<String>, options: Vec<ZodBuilder>) -> Self {
        Self::new(Kind::DiscriminatedUnion(DiscriminatedUnion {
            discriminator: discriminator.into(),
            options,
        }))
    }

    /// Accepts anything `negated` rejects.
    pub fn not(negated: ZodBuilder) -> Self {
        Self::new(Kind::Not(Box::new(negated)))
    }

    pub fn lazy(slot: Rc<RefSlot>) -> Self {
        Self::new(Kind::Lazy(slot))
    }

    /// Binds `inner` to the slot's name so lazy references inside it resolve.
    pub fn recursive(slot: Rc<RefSlot>, inner: ZodBuilder) -> Self {
        Self::new(Kind::Recursive(slot, Box::new(inner)))
    }

    /// A use site of `definition`. Each call counts as one use.
    pub fn shared(definition: Rc<SharedDefinition>) -> Self {
        definition.uses.set(definition.uses.get() + 1);
        Self::new(Kind::Shared(definition))
    }

    /// Wraps `body` with the bindings of every definition used more than once.
    /// `definitions` must list dependencies before their dependents.
    pub fn with_definitions(definitions: Vec<Rc<SharedDefinition>>, body: ZodBuilder) -> Self {
        Self::new(Kind::Hoisted(definitions, Box::new(body)))
    }
}

pub(crate) fn render_union(options: &[ZodBuilder], version: ZodVersion) -> String {
    match options {
        [] => "z.never()".to_string(),
        [single] => single.render(version),
        _ => {
            let rendered: Vec<String> = options.iter().map(|o| o.render(version)).collect();
            format!("z.union([{}])", rendered.join(", "))
        }
    }
}

pub(crate) fn render_intersection(parts: &[ZodBuilder], version: ZodVersion) -> String {
    match parts {
        [] => "z.never()".to_string(),
        [single] => single.render(version),
        [first, rest @ ..] => format!(
            "z.intersection({}, {})",
            first.render(version),
            render_intersection(rest, version)
        ),
    }
}

pub(crate) fn render_not(negated: &ZodBuilder, version: ZodVersion) -> String {
    format!(
        "z.any().refine((value) => !{}.safeParse(value).success, {})",
        negated.render(version),
        quote(NOT_MESSAGE)
    )
}

#[derive(Debug, Clone)]
pub struct DiscriminatedUnion {
    discriminator: String,
    options: Vec<ZodBuilder>,
}

impl DiscriminatedUnion {
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    pub(crate) fn render(&self, version: ZodVersion) -> String {
        let options: Vec<String> = self.options.iter().map(|o| o.render(version)).collect();
        format!(
            "z.discriminatedUnion({}, [{}])",
            quote(&self.discriminator),
            options.join(", ")
        )
    }
}

/// Bookkeeping for one reference target while it is being expanded.
///
/// The expansion and every lazy reference created inside it share the slot.
/// `recursive` is set when a reference loops back, which tells the expansion
/// to emit a named binding for the lazy references to point at.
#[derive(Debug)]
pub struct RefSlot {
    target: SchemaPath,
    name: String,
    recursive: Cell<bool>,
}

impl RefSlot {
    pub fn new(target: SchemaPath, name: impl Into<String>) -> Self {
        Self {
            target,
            name: name.into(),
            recursive: Cell::new(false),
        }
    }

    pub fn target(&self) -> &SchemaPath {
        &self.target
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mark_recursive(&self) {
        self.recursive.set(true);
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive.get()
    }

    pub(crate) fn render_lazy(&self) -> String {
        format!("z.lazy(() => {})", self.name)
    }

    pub(crate) fn render_binding(&self, inner: &str) -> String {
        format!(
            "(() => {{ const {name} = {inner}; return {name}; }})()",
            name = self.name
        )
    }
}

/// The expansion of a reference target that does not depend on any enclosing
/// binding, so every reference to the target can share it.
///
/// With a single use it renders in place. With more it is bound once by
/// [`ZodBuilder::with_definitions`] and each use renders as its name.
#[derive(Debug)]
pub struct SharedDefinition {
    name: String,
    builder: ZodBuilder,
    uses: Cell<usize>,
}

impl SharedDefinition {
    pub fn new(name: impl Into<String>, builder: ZodBuilder) -> Self {
        Self {
            name: name.into(),
            builder,
            uses: Cell::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn builder(&self) -> &ZodBuilder {
        &self.builder
    }

    pub fn uses(&self) -> usize {
        self.uses.get()
    }

    pub fn is_hoisted(&self) -> bool {
        self.uses() > 1
    }

    pub(crate) fn render_use(&self, version: ZodVersion) -> String {
        if self.is_hoisted() {
            self.name.clone()
        } else {
            self.builder.render(version)
        }
    }
}

pub(crate) fn render_hoisted(
    definitions: &[Rc<SharedDefinition>],
    body: &ZodBuilder,
    version: ZodVersion,
) -> String {
    let bindings: Vec<String> = definitions
        .iter()
        .filter(|definition| definition.is_hoisted())
        .map(|definition| {
            format!("const {} = {};", definition.name, definition.builder.render(version))
        })
        .collect();
    if bindings.is_empty() {
        return body.render(version);
    }
    format!("(() => {{ {} return {}; }})()", bindings.join(" "), body.render(version))
}
