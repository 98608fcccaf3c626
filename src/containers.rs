use crate::builder::{check_call, Bound, Kind, ZodBuilder};
use crate::options::ZodVersion;
use crate::serialization::quote;

// ============================================================================
// Arrays and tuples
// ============================================================================

#[derive(Debug, Clone)]
pub struct ArraySchema {
    item: Box<ZodBuilder>,
    min: Option<Bound>,
    max: Option<Bound>,
}

impl ArraySchema {
    pub fn new(item: ZodBuilder) -> Self {
        Self {
            item: Box::new(item),
            min: None,
            max: None,
        }
    }

    /// Sets the minimum length. An existing larger minimum is kept.
    #[must_use]
    pub fn min(mut self, value: u64, message: Option<String>) -> Self {
        if self.min.as_ref().map_or(true, |current| value > current.value) {
            self.min = Some(Bound { value, message });
        }
        self
    }

    /// Sets the maximum length. An existing smaller maximum is kept.
    #[must_use]
    pub fn max(mut self, value: u64, message: Option<String>) -> Self {
        if self.max.as_ref().map_or(true, |current| value < current.value) {
            self.max = Some(Bound { value, message });
        }
        self
    }

    pub fn min_bound(&self) -> Option<&Bound> {
        self.min.as_ref()
    }

    pub fn max_bound(&self) -> Option<&Bound> {
        self.max.as_ref()
    }

    pub(crate) fn render(&self, version: ZodVersion) -> String {
        let mut result = format!("z.array({})", self.item.render(version));
        if let Some(bound) = &self.min {
            result.push_str(&check_call(
                "min",
                &bound.value.to_string(),
                bound.message.as_deref(),
                version,
            ));
        }
        if let Some(bound) = &self.max {
            result.push_str(&check_call(
                "max",
                &bound.value.to_string(),
                bound.message.as_deref(),
                version,
            ));
        }
        result
    }
}

impl From<ArraySchema> for ZodBuilder {
    fn from(schema: ArraySchema) -> Self {
        ZodBuilder::new(Kind::Array(schema))
    }
}

/// Fixed-arity sequence, optionally followed by any number of `rest` items.
#[derive(Debug, Clone)]
pub struct TupleSchema {
    items: Vec<ZodBuilder>,
    rest: Option<Box<ZodBuilder>>,
}

impl TupleSchema {
    pub fn new(items: Vec<ZodBuilder>) -> Self {
        Self { items, rest: None }
    }

    #[must_use]
    pub fn rest(mut self, rest: ZodBuilder) -> Self {
        self.rest = Some(Box::new(rest));
        self
    }

    pub(crate) fn render(&self, version: ZodVersion) -> String {
        let items: Vec<String> = self.items.iter().map(|i| i.render(version)).collect();
        let mut result = format!("z.tuple([{}])", items.join(","));
        if let Some(rest) = &self.rest {
            result.push_str(&format!(".rest({})", rest.render(version)));
        }
        result
    }
}

impl From<TupleSchema> for ZodBuilder {
    fn from(schema: TupleSchema) -> Self {
        ZodBuilder::new(Kind::Tuple(schema))
    }
}

// ============================================================================
// Objects and records
// ============================================================================

/// Structural add-ons to an object schema. Unlike the shared modifiers these
/// render in the order they were attached.
#[derive(Debug, Clone)]
pub enum ObjectExtension {
    Strict,
    Loose,
    Catchall(Box<ZodBuilder>),
    SuperRefine(String),
    And(Box<ZodBuilder>),
}

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    properties: Vec<(String, ZodBuilder)>,
    extensions: Vec<ObjectExtension>,
}

impl ObjectSchema {
    /// Properties render in the given order.
    pub fn new(properties: Vec<(String, ZodBuilder)>) -> Self {
        Self {
            properties,
            extensions: Vec::new(),
        }
    }

    pub fn properties(&self) -> &[(String, ZodBuilder)] {
        &self.properties
    }

    pub fn extensions(&self) -> &[ObjectExtension] {
        &self.extensions
    }

    /// Rejects unknown keys.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.extensions.push(ObjectExtension::Strict);
        self
    }

    /// Keeps unknown keys.
    #[must_use]
    pub fn loose(mut self) -> Self {
        self.extensions.push(ObjectExtension::Loose);
        self
    }

    /// Validates unknown keys against `schema`.
    #[must_use]
    pub fn catchall(mut self, schema: ZodBuilder) -> Self {
        self.extensions
            .push(ObjectExtension::Catchall(Box::new(schema)));
        self
    }

    /// Adds a cross-field refinement. `refine_fn` is JavaScript source of a
    /// `(value, ctx) => { ... }` function.
    #[must_use]
    pub fn super_refine(mut self, refine_fn: impl Into<String>) -> Self {
        self.extensions
            .push(ObjectExtension::SuperRefine(refine_fn.into()));
        self
    }

    /// Merges with another schema.
    #[must_use]
    pub fn and(mut self, other: ZodBuilder) -> Self {
        self.extensions.push(ObjectExtension::And(Box::new(other)));
        self
    }

    pub(crate) fn render(&self, version: ZodVersion) -> String {
        let mut result = if self.properties.is_empty() {
            "z.object({})".to_string()
        } else {
            let props: Vec<String> = self
                .properties
                .iter()
                .map(|(key, schema)| format!("{}: {}", quote(key), schema.render(version)))
                .collect();
            format!("z.object({{ {} }})", props.join(", "))
        };

        for extension in &self.extensions {
            match extension {
                ObjectExtension::Strict => result.push_str(".strict()"),
                ObjectExtension::Loose => match version {
                    ZodVersion::V3 => result.push_str(".passthrough()"),
                    ZodVersion::V4 => result.push_str(".loose()"),
                },
                ObjectExtension::Catchall(schema) => {
                    result.push_str(&format!(".catchall({})", schema.render(version)));
                }
                ObjectExtension::SuperRefine(refine_fn) => {
                    result.push_str(&format!(".superRefine({refine_fn})"));
                }
                ObjectExtension::And(other) => {
                    result.push_str(&format!(".and({})", other.render(version)));
                }
            }
        }
        result
    }
}

impl From<ObjectSchema> for ZodBuilder {
    fn from(schema: ObjectSchema) -> Self {
        ZodBuilder::new(Kind::Object(schema))
    }
}

/// Map-like object: every key matches `key`, every value matches `value`.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    key: Box<ZodBuilder>,
    value: Box<ZodBuilder>,
}

impl RecordSchema {
    pub fn new(key: ZodBuilder, value: ZodBuilder) -> Self {
        Self {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub(crate) fn render(&self, version: ZodVersion) -> String {
        format!(
            "z.record({}, {})",
            self.key.render(version),
            self.value.render(version)
        )
    }
}

impl From<RecordSchema> for ZodBuilder {
    fn from(schema: RecordSchema) -> Self {
        ZodBuilder::new(Kind::Record(schema))
    }
}
