use crate::builder::{StringSchema, ZodBuilder};
use crate::combinators::{RefSlot, SharedDefinition};
use crate::containers::{ArraySchema, ObjectSchema, RecordSchema, TupleSchema};
use crate::error::ResolveError;
use crate::options::Options;
use crate::primitives::{error_message, malformed, non_negative_integer, parse_number, parse_string};
use crate::schema::{implied_type, indexed, json_type_name, Indexed, PathSegment, SchemaPath};
use crate::serialization::quote;
use crate::utils::to_identifier;
use log::{debug, trace, warn};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Per-call state threaded through the recursion.
///
/// Children always receive a derived copy; nothing a child does is visible to
/// its parent through the context.
#[derive(Debug, Clone)]
pub struct Context {
    path: SchemaPath,
    // reference targets being expanded on the current stack, outermost first
    visited: Vec<Rc<RefSlot>>,
    without_defaults: bool,
}

impl Context {
    fn new(root: Rc<RefSlot>, without_defaults: bool) -> Self {
        Self {
            path: SchemaPath::root(),
            visited: vec![root],
            without_defaults,
        }
    }

    pub fn path(&self) -> &SchemaPath {
        &self.path
    }

    pub fn without_defaults(&self) -> bool {
        self.without_defaults
    }

    #[must_use]
    fn child(&self, segment: impl Into<PathSegment>) -> Self {
        Self {
            path: self.path.join(segment),
            ..self.clone()
        }
    }

    #[must_use]
    fn item(&self, keyword: &str, item: &Indexed<'_>) -> Self {
        self.child(keyword).child(item.index)
    }

    #[must_use]
    fn suppress_defaults(&self) -> Self {
        Self {
            without_defaults: true,
            ..self.clone()
        }
    }

    /// Context for expanding a reference target: the path jumps to the target.
    #[must_use]
    fn entering(&self, slot: Rc<RefSlot>) -> Self {
        let mut visited = self.visited.clone();
        let path = slot.target().clone();
        visited.push(slot);
        Self {
            path,
            visited,
            without_defaults: self.without_defaults,
        }
    }

    fn find_visited(&self, target: &SchemaPath) -> Option<&Rc<RefSlot>> {
        self.visited.iter().find(|slot| slot.target() == target)
    }
}

/// Walks one schema document and produces its builder tree.
///
/// A resolver serves a single conversion call. Diagnostics for fragments that
/// were degraded to `z.any()` accumulate on it.
pub struct Resolver<'a> {
    root: &'a Value,
    options: &'a Options,
    names: HashMap<SchemaPath, String>,
    taken: HashSet<String>,
    // expansions that refer to no enclosing binding, keyed by target and `without_defaults`
    shared: HashMap<(SchemaPath, bool), Rc<SharedDefinition>>,
    // same definitions in completion order, so dependencies come first
    definitions: Vec<Rc<SharedDefinition>>,
    // targets of lazy references whose binding has not been emitted yet
    open_references: Vec<SchemaPath>,
    diagnostics: Vec<ResolveError>,
}

impl<'a> Resolver<'a> {
    pub fn new(root: &'a Value, options: &'a Options) -> Self {
        Resolver {
            root,
            options,
            names: HashMap::new(),
            taken: HashSet::new(),
            shared: HashMap::new(),
            definitions: Vec::new(),
            open_references: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnostics(&self) -> &[ResolveError] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<ResolveError> {
        self.diagnostics
    }

    /// Resolves the whole document. The root is itself a reference target, so
    /// `{"$ref": "#"}` anywhere inside it becomes a lazy reference to the root binding.
    ///
    /// Targets referenced from more than one place are emitted once, as `const`
    /// bindings ahead of the root expression.
    pub fn resolve_document(&mut self) -> Result<ZodBuilder, ResolveError> {
        let root_path = SchemaPath::root();
        let name = self.binding_name(&root_path);
        let slot = Rc::new(RefSlot::new(root_path, name));
        let ctx = Context::new(Rc::clone(&slot), self.options.without_defaults);
        let builder = self.parse_schema(self.root, &ctx)?;
        let definitions = std::mem::take(&mut self.definitions);
        Ok(ZodBuilder::with_definitions(definitions, bind(slot, builder)))
    }

    /// Resolves one schema node.
    ///
    /// Structural errors propagate in strict mode. Otherwise the node degrades
    /// to `z.any()` and the error is kept as a diagnostic.
    pub fn parse_schema(&mut self, schema: &Value, ctx: &Context) -> Result<ZodBuilder, ResolveError> {
        trace!("resolving {}", ctx.path);
        match self.select_parser(schema, ctx) {
            Ok(builder) => Ok(builder),
            Err(err) if !self.options.strict => {
                warn!("{err}; using z.any()");
                self.diagnostics.push(err);
                Ok(ZodBuilder::any())
            }
            Err(err) => Err(err),
        }
    }

    fn select_parser(&mut self, schema: &Value, ctx: &Context) -> Result<ZodBuilder, ResolveError> {
        let map = match schema {
            Value::Bool(true) => return Ok(ZodBuilder::any()),
            Value::Bool(false) => return Ok(ZodBuilder::never()),
            Value::Object(map) => map,
            other => {
                return Err(ResolveError::InvalidSchemaNode {
                    path: ctx.path.clone(),
                    found: json_type_name(other).to_string(),
                })
            }
        };

        // OpenAPI 3.0 `nullable` is a normalization, not a type of its own
        if map.get("nullable") == Some(&Value::Bool(true)) {
            let mut stripped = map.clone();
            stripped.remove("nullable");
            return Ok(self.parse_schema(&Value::Object(stripped), ctx)?.nullable());
        }

        let builder = self.parse_keywords(map, ctx)?;
        self.apply_annotations(builder, map, ctx)
    }

    fn parse_keywords(
        &mut self,
        map: &Map<String, Value>,
        ctx: &Context,
    ) -> Result<ZodBuilder, ResolveError> {
        if let Some(reference) = map.get("$ref") {
            return self.parse_ref(reference, ctx);
        }
        if let Some(all_of) = map.get("allOf") {
            return self.parse_all_of(all_of, ctx);
        }
        if let Some(any_of) = map.get("anyOf") {
            return self.parse_any_of("anyOf", any_of, ctx);
        }
        if let Some(one_of) = map.get("oneOf") {
            return self.parse_any_of("oneOf", one_of, ctx);
        }
        if let Some(not) = map.get("not") {
            let negated = self.parse_schema(not, &ctx.child("not"))?;
            return Ok(ZodBuilder::not(negated));
        }
        if let Some(values) = map.get("enum") {
            let values = values
                .as_array()
                .ok_or_else(|| malformed(&ctx.path, "enum", "an array", values))?;
            return Ok(ZodBuilder::enumeration(values.clone()));
        }
        if let Some(value) = map.get("const") {
            return Ok(ZodBuilder::literal(value.clone()));
        }

        match map.get("type") {
            Some(Value::String(type_name)) => self.parse_typed(type_name, map, ctx),
            Some(Value::Array(types)) => self.parse_multiple_type(types, map, ctx),
            Some(other) => Err(malformed(
                &ctx.path,
                "type",
                "a string or an array of strings",
                other,
            )),
            None => match implied_type(map) {
                Some(type_name) => self.parse_typed(type_name, map, ctx),
                None => Ok(ZodBuilder::any()),
            },
        }
    }

    fn parse_typed(
        &mut self,
        type_name: &str,
        map: &Map<String, Value>,
        ctx: &Context,
    ) -> Result<ZodBuilder, ResolveError> {
        match type_name {
            "string" => parse_string(map, &ctx.path),
            "number" => parse_number(map, false, &ctx.path),
            "integer" => parse_number(map, true, &ctx.path),
            "boolean" => Ok(ZodBuilder::boolean()),
            "null" => Ok(ZodBuilder::null()),
            "array" => self.parse_array(map, ctx),
            "object" => self.parse_object(map, ctx),
            other => Ok(self.unsupported(ctx, format!("unknown type `{other}`"))),
        }
    }

    /// `description`, `default` and `readOnly` become modifiers on whatever the
    /// node resolved to.
    fn apply_annotations(
        &self,
        mut builder: ZodBuilder,
        map: &Map<String, Value>,
        ctx: &Context,
    ) -> Result<ZodBuilder, ResolveError> {
        if let Some(Value::String(description)) = map.get("description") {
            builder = builder.describe(description.as_str());
        }
        if !ctx.without_defaults {
            if let Some(value) = map.get("default") {
                builder = builder
                    .default(value)
                    .map_err(|source| ResolveError::Builder {
                        path: ctx.path.join("default"),
                        source,
                    })?;
            }
        }
        if map.get("readOnly") == Some(&Value::Bool(true)) {
            builder = builder.readonly();
        }
        Ok(builder)
    }

    fn unsupported(&mut self, ctx: &Context, detail: String) -> ZodBuilder {
        warn!("unsupported construct at {}: {detail}", ctx.path);
        self.diagnostics.push(ResolveError::UnsupportedConstruct {
            path: ctx.path.clone(),
            detail,
        });
        ZodBuilder::any()
    }

    // === References ===

    fn parse_ref(&mut self, reference: &Value, ctx: &Context) -> Result<ZodBuilder, ResolveError> {
        let reference = reference
            .as_str()
            .ok_or_else(|| malformed(&ctx.path, "$ref", "a string", reference))?;
        let Some(target) = SchemaPath::from_reference(reference) else {
            return Ok(self.unsupported(ctx, format!("non-local reference `{reference}`")));
        };

        if let Some(slot) = ctx.find_visited(&target) {
            debug!("{reference} refers back to an ancestor, deferring as {}", slot.name());
            slot.mark_recursive();
            self.open_references.push(target);
            return Ok(ZodBuilder::lazy(Rc::clone(slot)));
        }

        let key = (target, ctx.without_defaults);
        if let Some(definition) = self.shared.get(&key) {
            debug!("{reference} already expanded as {}", definition.name());
            return Ok(ZodBuilder::shared(Rc::clone(definition)));
        }
        let (target, without_defaults) = key;

        let root = self.root;
        let node = target
            .lookup(root)
            .ok_or_else(|| ResolveError::UnresolvableReference {
                path: ctx.path.join("$ref"),
                reference: reference.to_string(),
            })?;

        let name = self.binding_name(&target);
        debug!("expanding {reference} as {name}");
        let slot = Rc::new(RefSlot::new(target.clone(), name.as_str()));
        let mark = self.open_references.len();
        let inner = self.parse_schema(node, &ctx.entering(Rc::clone(&slot)))?;
        let builder = bind(slot, inner);

        // references back to this target are bound by `builder` itself
        let open: Vec<SchemaPath> = self
            .open_references
            .split_off(mark)
            .into_iter()
            .filter(|open| open != &target)
            .collect();
        if !open.is_empty() {
            self.open_references.extend(open);
            return Ok(builder);
        }

        let name = if without_defaults {
            self.reserve_name(&name)
        } else {
            name
        };
        let definition = Rc::new(SharedDefinition::new(name, builder));
        self.shared
            .insert((target, without_defaults), Rc::clone(&definition));
        self.definitions.push(Rc::clone(&definition));
        Ok(ZodBuilder::shared(definition))
    }

    /// Stable, unique identifier for a reference target.
    fn binding_name(&mut self, target: &SchemaPath) -> String {
        if let Some(name) = self.names.get(target) {
            return name.clone();
        }
        let base = if target.is_root() {
            to_identifier(self.options.root_name())
        } else {
            to_identifier(target.last_key().unwrap_or("schema"))
        };
        let name = self.reserve_name(&base);
        self.names.insert(target.clone(), name.clone());
        name
    }

    /// `base`, or `base` with the first free numeric suffix.
    fn reserve_name(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut suffix = 2;
        while self.taken.contains(&name) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }
        self.taken.insert(name.clone());
        name
    }

    // === Combinators ===

    fn parse_all_of(&mut self, value: &Value, ctx: &Context) -> Result<ZodBuilder, ResolveError> {
        let items = value
            .as_array()
            .ok_or_else(|| malformed(&ctx.path, "allOf", "an array", value))?;
        let items = indexed(items);

        match items.as_slice() {
            [] => Ok(ZodBuilder::never()),
            [single] => self.parse_schema(single.schema, &ctx.item("allOf", single)),
            _ => {
                let parts = items
                    .iter()
                    .map(|item| self.parse_schema(item.schema, &ctx.item("allOf", item)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ZodBuilder::intersection(parts))
            }
        }
    }

    fn parse_any_of(
        &mut self,
        keyword: &str,
        value: &Value,
        ctx: &Context,
    ) -> Result<ZodBuilder, ResolveError> {
        let items = value
            .as_array()
            .ok_or_else(|| malformed(&ctx.path, keyword, "an array", value))?;
        let items = indexed(items);

        match items.as_slice() {
            [] => Ok(ZodBuilder::any()),
            [single] => self.parse_schema(single.schema, &ctx.item(keyword, single)),
            _ => {
                let options = items
                    .iter()
                    .map(|item| self.parse_schema(item.schema, &ctx.item(keyword, item)))
                    .collect::<Result<Vec<_>, _>>()?;
                if keyword == "oneOf" && self.options.discriminated_unions {
                    if let Some(discriminator) = find_discriminator(&items) {
                        debug!("oneOf at {} discriminated by `{discriminator}`", ctx.path);
                        return Ok(ZodBuilder::discriminated_union(discriminator, options));
                    }
                }
                Ok(ZodBuilder::union(options))
            }
        }
    }

    /// `type: [...]`: one branch per named type, defaults suppressed inside the
    /// branches so only the enclosing union carries one.
    fn parse_multiple_type(
        &mut self,
        types: &[Value],
        map: &Map<String, Value>,
        ctx: &Context,
    ) -> Result<ZodBuilder, ResolveError> {
        let names = types
            .iter()
            .map(|t| {
                t.as_str()
                    .ok_or_else(|| malformed(&ctx.path, "type", "a string or an array of strings", t))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let branch_ctx = ctx.suppress_defaults();
        match names.as_slice() {
            [] => Ok(ZodBuilder::any()),
            [single] => self.parse_typed(single, map, ctx),
            _ => {
                let branches = names
                    .iter()
                    .map(|name| self.parse_typed(name, map, &branch_ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ZodBuilder::union(branches))
            }
        }
    }

    // === Containers ===

    fn parse_array(&mut self, map: &Map<String, Value>, ctx: &Context) -> Result<ZodBuilder, ResolveError> {
        let tuple = match (map.get("prefixItems"), map.get("items")) {
            (Some(Value::Array(items)), _) => Some(("prefixItems", items, map.get("items"))),
            (Some(other), _) => return Err(malformed(&ctx.path, "prefixItems", "an array", other)),
            (None, Some(Value::Array(items))) => Some(("items", items, map.get("additionalItems"))),
            (None, _) => None,
        };

        if let Some((keyword, items, rest)) = tuple {
            let items = indexed(items)
                .iter()
                .map(|item| self.parse_schema(item.schema, &ctx.item(keyword, item)))
                .collect::<Result<Vec<_>, _>>()?;
            let mut tuple = TupleSchema::new(items);
            match rest {
                None | Some(Value::Bool(false)) => {}
                Some(schema) => {
                    let rest_keyword = if keyword == "prefixItems" { "items" } else { "additionalItems" };
                    tuple = tuple.rest(self.parse_schema(schema, &ctx.child(rest_keyword))?);
                }
            }
            return Ok(tuple.into());
        }

        let item = match map.get("items") {
            Some(schema) => self.parse_schema(schema, &ctx.child("items"))?,
            None => ZodBuilder::any(),
        };
        let mut array = ArraySchema::new(item);
        if let Some(min) = non_negative_integer(map, "minItems", &ctx.path)? {
            array = array.min(min, error_message(map, "minItems"));
        }
        if let Some(max) = non_negative_integer(map, "maxItems", &ctx.path)? {
            array = array.max(max, error_message(map, "maxItems"));
        }
        Ok(array.into())
    }

    fn parse_object(&mut self, map: &Map<String, Value>, ctx: &Context) -> Result<ZodBuilder, ResolveError> {
        let properties = match map.get("properties") {
            None => None,
            Some(Value::Object(properties)) => Some(properties),
            Some(other) => return Err(malformed(&ctx.path, "properties", "an object", other)),
        };
        let patterns = match map.get("patternProperties") {
            None => None,
            Some(Value::Object(patterns)) => Some(patterns),
            Some(other) => {
                return Err(malformed(&ctx.path, "patternProperties", "an object", other))
            }
        };
        let required = required_keys(map, ctx)?;
        let additional = map.get("additionalProperties");

        if properties.is_none() {
            match (patterns, additional) {
                (None, Some(Value::Bool(false))) => {
                    return Ok(ObjectSchema::default().strict().into());
                }
                (None, _) => {
                    let key = match map.get("propertyNames") {
                        Some(names) => self.parse_schema(names, &ctx.child("propertyNames"))?,
                        None => StringSchema::new().into(),
                    };
                    let value = match additional {
                        Some(schema) => self.parse_schema(schema, &ctx.child("additionalProperties"))?,
                        None => ZodBuilder::any(),
                    };
                    return Ok(RecordSchema::new(key, value).into());
                }
                (Some(patterns), None) if patterns.len() == 1 => {
                    if let Some((pattern, schema)) = patterns.iter().next() {
                        let value = self.parse_schema(
                            schema,
                            &ctx.child("patternProperties").child(pattern.as_str()),
                        )?;
                        let key = StringSchema::new().pattern(pattern.as_str(), None);
                        return Ok(RecordSchema::new(key.into(), value).into());
                    }
                }
                _ => {}
            }
        }

        let mut shape = Vec::new();
        for (key, schema) in properties.into_iter().flatten() {
            let mut property = self.parse_schema(schema, &ctx.child("properties").child(key.as_str()))?;
            if !required.contains(&key.as_str()) && !property.has_default() {
                property = property.optional();
            }
            shape.push((key.clone(), property));
        }
        let mut object = ObjectSchema::new(shape);

        if let Some(patterns) = patterns {
            let known: Vec<&str> = properties
                .map(|p| p.keys().map(String::as_str).collect())
                .unwrap_or_default();
            let refine_fn = self.pattern_refinement(&known, patterns, additional, ctx)?;
            object = object.catchall(ZodBuilder::any()).super_refine(refine_fn);
        } else {
            match additional {
                None => {}
                Some(Value::Bool(true)) => object = object.loose(),
                Some(Value::Bool(false)) => object = object.strict(),
                Some(schema) => {
                    let catchall = self.parse_schema(schema, &ctx.child("additionalProperties"))?;
                    object = object.catchall(catchall);
                }
            }
        }
        Ok(object.into())
    }

    /// JavaScript source of the `superRefine` callback enforcing
    /// `patternProperties`, and `additionalProperties` for keys no property or
    /// pattern covers. Sub-schemas are rendered for the configured version.
    fn pattern_refinement(
        &mut self,
        known: &[&str],
        patterns: &Map<String, Value>,
        additional: Option<&Value>,
        ctx: &Context,
    ) -> Result<String, ResolveError> {
        let version = self.options.zod_version;
        let mut body = String::from("(value, ctx) => { for (const key in value) { let evaluated = false; ");

        if !known.is_empty() {
            let keys: Vec<String> = known.iter().map(|k| quote(k)).collect();
            body.push_str(&format!(
                "if ([{}].includes(key)) {{ evaluated = true; }} ",
                keys.join(", ")
            ));
        }

        for (pattern, schema) in patterns {
            let rendered = self
                .parse_schema(schema, &ctx.child("patternProperties").child(pattern.as_str()))?
                .render(version);
            let message = format!("Invalid input: Key matching regex /{pattern}/ must match schema");
            body.push_str(&format!(
                "if (key.match(new RegExp({}))) {{ evaluated = true; const result = {rendered}.safeParse(value[key]); if (!result.success) {{ ctx.addIssue({{ path: [key], code: \"custom\", message: {}, params: {{ issues: result.error.issues }} }}); }} }} ",
                quote(pattern),
                quote(&message)
            ));
        }

        match additional {
            None | Some(Value::Bool(true)) => {}
            Some(Value::Bool(false)) => body.push_str(
                "if (!evaluated) { ctx.addIssue({ path: [key], code: \"custom\", message: \"Invalid input: must match one of the declared properties or patterns\" }); } ",
            ),
            Some(schema) => {
                let rendered = self
                    .parse_schema(schema, &ctx.child("additionalProperties"))?
                    .render(version);
                body.push_str(&format!(
                    "if (!evaluated) {{ const result = {rendered}.safeParse(value[key]); if (!result.success) {{ ctx.addIssue({{ path: [key], code: \"custom\", message: \"Invalid input: must match catchall schema\", params: {{ issues: result.error.issues }} }}); }} }} "
                ));
            }
        }

        body.push_str("} }");
        Ok(body)
    }
}

/// Wraps `inner` in a named binding when a lazy reference to `slot` was created inside it.
fn bind(slot: Rc<RefSlot>, inner: ZodBuilder) -> ZodBuilder {
    if slot.is_recursive() {
        ZodBuilder::recursive(slot, inner)
    } else {
        inner
    }
}

fn required_keys<'m>(map: &'m Map<String, Value>, ctx: &Context) -> Result<Vec<&'m str>, ResolveError> {
    match map.get("required") {
        None => Ok(Vec::new()),
        Some(Value::Array(keys)) => keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                key.as_str().ok_or_else(|| ResolveError::MalformedSchema {
                    path: ctx.path.join("required").join(i),
                    keyword: "required".to_string(),
                    expected: "an array of strings",
                    found: json_type_name(key).to_string(),
                })
            })
            .collect(),
        Some(other) => Err(malformed(&ctx.path, "required", "an array of strings", other)),
    }
}

/// First property that every option declares as required and pins to a
/// single value with `const` or a one-element `enum`.
fn find_discriminator(options: &[Indexed<'_>]) -> Option<String> {
    let objects: Vec<&Map<String, Value>> = options
        .iter()
        .map(|option| option.schema.as_object())
        .collect::<Option<_>>()?;
    let first = objects.first()?;
    let candidates = first.get("properties")?.as_object()?;

    candidates
        .keys()
        .find(|key| objects.iter().all(|object| pins_property(object, key)))
        .cloned()
}

fn pins_property(object: &Map<String, Value>, key: &str) -> bool {
    let required = object
        .get("required")
        .and_then(Value::as_array)
        .is_some_and(|keys| keys.iter().any(|k| k.as_str() == Some(key)));
    let pinned = object
        .get("properties")
        .and_then(Value::as_object)
        .and_then(|properties| properties.get(key))
        .and_then(Value::as_object)
        .is_some_and(|property| {
            property.contains_key("const")
                || property
                    .get("enum")
                    .and_then(Value::as_array)
                    .is_some_and(|values| values.len() == 1)
        });
    required && pinned
}
