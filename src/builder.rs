//! Composable Zod expression builders.
//!
//! A [`ZodBuilder`] pairs a variant tag ([`Kind`]) with the modifiers shared by
//! every variant. Nothing is rendered until [`ZodBuilder::render`] is called on
//! the root; children are rendered as part of their parent's base text.
//!
//! Modifiers are applied in one fixed order whatever order they were attached in:
//! describe, nullable, default, brand, readonly, optional, catch.

use crate::combinators::{self, DiscriminatedUnion, RefSlot, SharedDefinition};
use crate::containers::{ArraySchema, ObjectSchema, RecordSchema, TupleSchema};
use crate::error::BuildError;
use crate::options::ZodVersion;
use crate::serialization::{quote, to_literal, to_value};
use serde::Serialize;
use serde_json::{Number, Value};
use std::rc::Rc;

/// One tag per validator kind.
#[derive(Debug, Clone)]
pub enum Kind {
    Any,
    Unknown,
    Never,
    Null,
    Boolean,
    String(StringSchema),
    Number(NumberSchema),
    Literal(Value),
    Enum(Vec<Value>),
    Array(ArraySchema),
    Tuple(TupleSchema),
    Object(ObjectSchema),
    Record(RecordSchema),
    Union(Vec<ZodBuilder>),
    Intersection(Vec<ZodBuilder>),
    DiscriminatedUnion(DiscriminatedUnion),
    /// Refinement over `z.any()` rejecting whatever the inner schema accepts.
    Not(Box<ZodBuilder>),
    /// Deferred reference to a binding that is still being built.
    Lazy(Rc<RefSlot>),
    /// Local binding for a target that refers back to itself.
    Recursive(Rc<RefSlot>, Box<ZodBuilder>),
    /// One use site of an expansion shared between several references.
    Shared(Rc<SharedDefinition>),
    /// `const` bindings for the shared definitions used more than once, then the body.
    Hoisted(Vec<Rc<SharedDefinition>>, Box<ZodBuilder>),
}

impl Kind {
    /// Unmodified expression text for this variant.
    fn base(&self, version: ZodVersion) -> String {
        match self {
            Kind::Any => "z.any()".to_string(),
            Kind::Unknown => "z.unknown()".to_string(),
            Kind::Never => "z.never()".to_string(),
            Kind::Null => "z.null()".to_string(),
            Kind::Boolean => "z.boolean()".to_string(),
            Kind::String(string) => string.render(version),
            Kind::Number(number) => number.render(version),
            Kind::Literal(value) => format!("z.literal({})", to_literal(value)),
            Kind::Enum(values) => render_enum(values),
            Kind::Array(array) => array.render(version),
            Kind::Tuple(tuple) => tuple.render(version),
            Kind::Object(object) => object.render(version),
            Kind::Record(record) => record.render(version),
            Kind::Union(options) => combinators::render_union(options, version),
            Kind::Intersection(parts) => combinators::render_intersection(parts, version),
            Kind::DiscriminatedUnion(union) => union.render(version),
            Kind::Not(inner) => combinators::render_not(inner, version),
            Kind::Lazy(slot) => slot.render_lazy(),
            Kind::Recursive(slot, inner) => slot.render_binding(&inner.render(version)),
            Kind::Shared(definition) => definition.render_use(version),
            Kind::Hoisted(definitions, body) => combinators::render_hoisted(definitions, body, version),
        }
    }
}

/// Values of the shared modifiers. `None`/`false` means unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifiers {
    pub describe: Option<String>,
    pub nullable: bool,
    pub default: Option<Value>,
    pub brand: Option<String>,
    pub readonly: bool,
    pub optional: bool,
    pub catch: Option<Value>,
}

impl Modifiers {
    fn apply(&self, base: String) -> String {
        let mut result = base;
        if let Some(text) = self.describe.as_deref().filter(|text| !text.is_empty()) {
            result = format!("{result}.describe({})", quote(text));
        }
        if self.nullable {
            result.push_str(".nullable()");
        }
        if let Some(value) = &self.default {
            result = format!("{result}.default({})", to_literal(value));
        }
        if let Some(brand) = self.brand.as_deref().filter(|brand| !brand.is_empty()) {
            result = format!("{result}.brand({})", quote(brand));
        }
        if self.readonly {
            result.push_str(".readonly()");
        }
        if self.optional {
            result.push_str(".optional()");
        }
        if let Some(value) = &self.catch {
            result = format!("{result}.catch({})", to_literal(value));
        }
        result
    }
}

/// A not-yet-rendered Zod expression.
#[derive(Debug, Clone)]
pub struct ZodBuilder {
    kind: Kind,
    modifiers: Modifiers,
}

impl ZodBuilder {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            modifiers: Modifiers::default(),
        }
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    pub fn any() -> Self {
        Self::new(Kind::Any)
    }

    pub fn unknown() -> Self {
        Self::new(Kind::Unknown)
    }

    pub fn never() -> Self {
        Self::new(Kind::Never)
    }

    pub fn null() -> Self {
        Self::new(Kind::Null)
    }

    pub fn boolean() -> Self {
        Self::new(Kind::Boolean)
    }

    pub fn literal(value: Value) -> Self {
        Self::new(Kind::Literal(value))
    }

    pub fn enumeration(values: Vec<Value>) -> Self {
        Self::new(Kind::Enum(values))
    }

    // === Modifiers ===

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.modifiers.optional = true;
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.modifiers.nullable = true;
        self
    }

    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.modifiers.readonly = true;
        self
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.modifiers.describe = Some(description.into());
        self
    }

    #[must_use]
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.modifiers.brand = Some(brand.into());
        self
    }

    /// Attaches a default value.
    ///
    /// # Errors
    /// Returns `BuildError::Unserializable` if `value` cannot be represented as JSON.
    pub fn default<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, BuildError> {
        let value = to_value("default", value)?;
        Ok(self.default_value(value))
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.modifiers.default = Some(value);
        self
    }

    /// Attaches a fallback returned when parsing fails.
    ///
    /// # Errors
    /// Returns `BuildError::Unserializable` if `value` cannot be represented as JSON.
    pub fn catch<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, BuildError> {
        self.modifiers.catch = Some(to_value("catch", value)?);
        Ok(self)
    }

    /// True when the rendered expression carries a `.default(...)` at its outermost level,
    /// including one inside a reference binding.
    pub fn has_default(&self) -> bool {
        if self.modifiers.default.is_some() {
            return true;
        }
        match &self.kind {
            Kind::Recursive(_, inner) => inner.has_default(),
            Kind::Shared(definition) => definition.builder().has_default(),
            _ => false,
        }
    }

    /// Produces the final expression text. Pure: repeated calls return identical text.
    pub fn render(&self, version: ZodVersion) -> String {
        self.modifiers.apply(self.kind.base(version))
    }
}

fn render_enum(values: &[Value]) -> String {
    match values {
        [] => "z.never()".to_string(),
        [single] => format!("z.literal({})", to_literal(single)),
        _ if values.iter().all(Value::is_string) => {
            let items: Vec<String> = values.iter().map(to_literal).collect();
            format!("z.enum([{}])", items.join(", "))
        }
        _ => {
            let items: Vec<String> = values
                .iter()
                .map(|v| format!("z.literal({})", to_literal(v)))
                .collect();
            format!("z.union([{}])", items.join(", "))
        }
    }
}

/// Renders a trailing custom-message argument in the target version's spelling.
pub(crate) fn error_param(version: ZodVersion, message: &str) -> String {
    match version {
        ZodVersion::V3 => format!("{{ message: {} }}", quote(message)),
        ZodVersion::V4 => format!("{{ error: {} }}", quote(message)),
    }
}

/// `.name(arg)` or `.name(arg, { error: "..." })`.
pub(crate) fn check_call(
    name: &str,
    arg: &str,
    message: Option<&str>,
    version: ZodVersion,
) -> String {
    match message {
        Some(message) => format!(".{name}({arg}, {})", error_param(version, message)),
        None => format!(".{name}({arg})"),
    }
}

/// A numeric bound with an optional custom message.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub value: u64,
    pub message: Option<String>,
}

// ============================================================================
// Strings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Url,
    Uuid,
    DateTime,
    Date,
    Time,
    Ipv4,
    Ipv6,
}

impl StringFormat {
    /// Maps a JSON Schema `format` value. Unknown formats map to `None`.
    pub fn from_keyword(format: &str) -> Option<Self> {
        match format {
            "email" => Some(StringFormat::Email),
            "uri" | "url" => Some(StringFormat::Url),
            "uuid" => Some(StringFormat::Uuid),
            "date-time" => Some(StringFormat::DateTime),
            "date" => Some(StringFormat::Date),
            "time" => Some(StringFormat::Time),
            "ipv4" => Some(StringFormat::Ipv4),
            "ipv6" => Some(StringFormat::Ipv6),
            _ => None,
        }
    }

    fn render(self, message: Option<&str>, version: ZodVersion) -> String {
        match version {
            ZodVersion::V4 => {
                let ctor = match self {
                    StringFormat::Email => "z.email",
                    StringFormat::Url => "z.url",
                    StringFormat::Uuid => "z.uuid",
                    StringFormat::DateTime => "z.iso.datetime",
                    StringFormat::Date => "z.iso.date",
                    StringFormat::Time => "z.iso.time",
                    StringFormat::Ipv4 => "z.ipv4",
                    StringFormat::Ipv6 => "z.ipv6",
                };
                match message {
                    Some(message) => format!("{ctor}({})", error_param(version, message)),
                    None => format!("{ctor}()"),
                }
            }
            ZodVersion::V3 => {
                let (method, ip_version) = match self {
                    StringFormat::Email => ("email", None),
                    StringFormat::Url => ("url", None),
                    StringFormat::Uuid => ("uuid", None),
                    StringFormat::DateTime => ("datetime", None),
                    StringFormat::Date => ("date", None),
                    StringFormat::Time => ("time", None),
                    StringFormat::Ipv4 => ("ip", Some("v4")),
                    StringFormat::Ipv6 => ("ip", Some("v6")),
                };
                let args = match (ip_version, message) {
                    (Some(ip), Some(message)) => {
                        format!("{{ version: {}, message: {} }}", quote(ip), quote(message))
                    }
                    (Some(ip), None) => format!("{{ version: {} }}", quote(ip)),
                    (None, Some(message)) => error_param(version, message),
                    (None, None) => String::new(),
                };
                format!("z.string().{method}({args})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StringCheck {
    MinLength(Bound),
    MaxLength(Bound),
    Pattern {
        pattern: String,
        message: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    format: Option<(StringFormat, Option<String>)>,
    checks: Vec<StringCheck>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn format(mut self, format: StringFormat, message: Option<String>) -> Self {
        self.format = Some((format, message));
        self
    }

    #[must_use]
    pub fn min_length(mut self, value: u64, message: Option<String>) -> Self {
        self.checks.push(StringCheck::MinLength(Bound { value, message }));
        self
    }

    #[must_use]
    pub fn max_length(mut self, value: u64, message: Option<String>) -> Self {
        self.checks.push(StringCheck::MaxLength(Bound { value, message }));
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>, message: Option<String>) -> Self {
        self.checks.push(StringCheck::Pattern {
            pattern: pattern.into(),
            message,
        });
        self
    }

    fn render(&self, version: ZodVersion) -> String {
        let mut result = match &self.format {
            Some((format, message)) => format.render(message.as_deref(), version),
            None => "z.string()".to_string(),
        };
        for check in &self.checks {
            let call = match check {
                StringCheck::MinLength(bound) => {
                    check_call("min", &bound.value.to_string(), bound.message.as_deref(), version)
                }
                StringCheck::MaxLength(bound) => {
                    check_call("max", &bound.value.to_string(), bound.message.as_deref(), version)
                }
                StringCheck::Pattern { pattern, message } => check_call(
                    "regex",
                    &format!("new RegExp({})", quote(pattern)),
                    message.as_deref(),
                    version,
                ),
            };
            result.push_str(&call);
        }
        result
    }
}

impl From<StringSchema> for ZodBuilder {
    fn from(schema: StringSchema) -> Self {
        ZodBuilder::new(Kind::String(schema))
    }
}

// ============================================================================
// Numbers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberCheckKind {
    Gt,
    Gte,
    Lt,
    Lte,
    MultipleOf,
}

impl NumberCheckKind {
    fn method(self) -> &'static str {
        match self {
            NumberCheckKind::Gt => "gt",
            NumberCheckKind::Gte => "gte",
            NumberCheckKind::Lt => "lt",
            NumberCheckKind::Lte => "lte",
            NumberCheckKind::MultipleOf => "multipleOf",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberCheck {
    pub kind: NumberCheckKind,
    pub value: Number,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    integer: bool,
    checks: Vec<NumberCheck>,
}

impl NumberSchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    #[must_use]
    pub fn check(mut self, kind: NumberCheckKind, value: Number, message: Option<String>) -> Self {
        self.checks.push(NumberCheck {
            kind,
            value,
            message,
        });
        self
    }

    fn render(&self, version: ZodVersion) -> String {
        let mut result = "z.number()".to_string();
        if self.integer {
            result.push_str(".int()");
        }
        for check in &self.checks {
            let arg = to_literal(&Value::Number(check.value.clone()));
            result.push_str(&check_call(
                check.kind.method(),
                &arg,
                check.message.as_deref(),
                version,
            ));
        }
        result
    }
}

impl From<NumberSchema> for ZodBuilder {
    fn from(schema: NumberSchema) -> Self {
        ZodBuilder::new(Kind::Number(schema))
    }
}
