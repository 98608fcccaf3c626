use serde_json::{json, Value};
use zodgen_core::{json_schema_to_zod, Options, ZodVersion};

fn zod(schema: Value) -> String {
    json_schema_to_zod(&schema, &Options::default()).unwrap()
}

fn zod_with(schema: Value, options: &Options) -> String {
    json_schema_to_zod(&schema, options).unwrap()
}

#[test]
fn test_boolean_type() {
    assert_eq!(zod(json!({ "type": "boolean" })), "z.boolean()");
}

#[test]
fn test_boolean_schemas() {
    assert_eq!(zod(json!(true)), "z.any()");
    assert_eq!(zod(json!(false)), "z.never()");
    assert_eq!(zod(json!({})), "z.any()");
}

#[test]
fn test_empty_all_of_is_never() {
    assert_eq!(zod(json!({ "allOf": [] })), "z.never()");
}

#[test]
fn test_single_all_of_short_circuits() {
    assert_eq!(zod(json!({ "allOf": [{ "type": "string" }] })), "z.string()");
}

#[test]
fn test_all_of_folds_right() {
    let schema = json!({
        "allOf": [{ "type": "string" }, { "type": "number" }, { "type": "null" }]
    });
    assert_eq!(
        zod(schema),
        "z.intersection(z.string(), z.intersection(z.number(), z.null()))"
    );
}

#[test]
fn test_any_of_union() {
    let schema = json!({ "anyOf": [{ "type": "string" }, { "type": "number" }] });
    assert_eq!(zod(schema), "z.union([z.string(), z.number()])");
}

#[test]
fn test_single_any_of_short_circuits() {
    assert_eq!(zod(json!({ "anyOf": [{ "type": "null" }] })), "z.null()");
    assert_eq!(zod(json!({ "oneOf": [{ "type": "null" }] })), "z.null()");
    assert_eq!(zod(json!({ "anyOf": [] })), "z.any()");
}

#[test]
fn test_any_of_keeps_duplicates() {
    let schema = json!({ "anyOf": [{ "type": "string" }, { "type": "string" }] });
    assert_eq!(zod(schema), "z.union([z.string(), z.string()])");
}

#[test]
fn test_not_refinement() {
    assert_eq!(
        zod(json!({ "not": { "type": "string" } })),
        "z.any().refine((value) => !z.string().safeParse(value).success, \"Invalid input: Should NOT be valid against schema\")"
    );
}

#[test]
fn test_type_array() {
    assert_eq!(
        zod(json!({ "type": ["string", "integer"] })),
        "z.union([z.string(), z.number().int()])"
    );
    assert_eq!(zod(json!({ "type": ["boolean"] })), "z.boolean()");
    assert_eq!(zod(json!({ "type": [] })), "z.any()");
}

#[test]
fn test_type_array_suppresses_defaults_in_branches() {
    let schema = json!({
        "type": ["object", "null"],
        "properties": { "a": { "type": "string", "default": "x" } },
        "default": null
    });
    assert_eq!(
        zod(schema),
        r#"z.union([z.object({ "a": z.string().optional() }), z.null()]).default(null)"#
    );
}

#[test]
fn test_enum_and_const() {
    assert_eq!(zod(json!({ "enum": ["a", "b"] })), r#"z.enum(["a", "b"])"#);
    assert_eq!(
        zod(json!({ "enum": ["a", 1, null] })),
        r#"z.union([z.literal("a"), z.literal(1), z.literal(null)])"#
    );
    assert_eq!(zod(json!({ "enum": [] })), "z.never()");
    assert_eq!(
        zod(json!({ "const": { "b": 1, "a": [true] } })),
        r#"z.literal({"a":[true],"b":1})"#
    );
}

#[test]
fn test_implied_types() {
    assert_eq!(zod(json!({ "minLength": 2 })), "z.string().min(2)");
    assert_eq!(zod(json!({ "maximum": 9 })), "z.number().lte(9)");
    assert_eq!(zod(json!({ "items": { "type": "null" } })), "z.array(z.null())");
    assert_eq!(
        zod(json!({ "properties": { "a": true } })),
        r#"z.object({ "a": z.any().optional() })"#
    );
}

#[test]
fn test_combinator_wins_over_type() {
    let schema = json!({ "type": "string", "anyOf": [{ "minLength": 1 }, { "const": "" }] });
    assert_eq!(zod(schema), r#"z.union([z.string().min(1), z.literal("")])"#);
}

#[test]
fn test_annotations() {
    let schema = json!({
        "type": "integer",
        "description": "Port",
        "default": 8080,
        "readOnly": true
    });
    assert_eq!(
        zod(schema),
        r#"z.number().int().describe("Port").default(8080).readonly()"#
    );
}

#[test]
fn test_object_additional_properties() {
    assert_eq!(
        zod(json!({ "type": "object", "properties": { "a": { "type": "null" } }, "required": ["a"], "additionalProperties": true })),
        r#"z.object({ "a": z.null() }).loose()"#
    );
    assert_eq!(
        zod_with(
            json!({ "type": "object", "properties": { "a": { "type": "null" } }, "required": ["a"], "additionalProperties": true }),
            &Options::default().with_version(ZodVersion::V3)
        ),
        r#"z.object({ "a": z.null() }).passthrough()"#
    );
    assert_eq!(
        zod(json!({ "type": "object", "properties": {}, "additionalProperties": { "type": "number" } })),
        "z.object({}).catchall(z.number())"
    );
    assert_eq!(
        zod(json!({ "type": "object", "additionalProperties": false })),
        "z.object({}).strict()"
    );
    assert_eq!(
        zod(json!({ "type": "object" })),
        "z.record(z.string(), z.any())"
    );
}

#[test]
fn test_record_with_property_names() {
    let schema = json!({
        "type": "object",
        "propertyNames": { "enum": ["a", "b"] },
        "additionalProperties": { "type": "boolean" }
    });
    assert_eq!(
        zod(schema),
        r#"z.record(z.enum(["a", "b"]), z.boolean())"#
    );
}

#[test]
fn test_pattern_properties_refinement() {
    let schema = json!({
        "type": "object",
        "properties": { "id": { "type": "string" } },
        "required": ["id"],
        "patternProperties": { "^n_": { "type": "number" } },
        "additionalProperties": false
    });
    let expression = zod(schema);
    assert!(expression.starts_with(r#"z.object({ "id": z.string() }).catchall(z.any()).superRefine((value, ctx) => {"#));
    assert!(expression.contains(r#"if (["id"].includes(key)) { evaluated = true; }"#));
    assert!(expression.contains(r#"if (key.match(new RegExp("^n_"))) { evaluated = true; const result = z.number().safeParse(value[key]);"#));
    assert!(expression.contains("Invalid input: Key matching regex /^n_/ must match schema"));
    assert!(expression.contains("must match one of the declared properties or patterns"));
}

#[test]
fn test_pattern_properties_render_for_target_version() {
    let schema = json!({
        "type": "object",
        "patternProperties": {
            "^a": { "type": "string", "format": "email" },
            "^b": { "type": "string" }
        }
    });
    let v3 = zod_with(schema.clone(), &Options::default().with_version(ZodVersion::V3));
    let v4 = zod(schema);
    assert!(v3.contains("z.string().email().safeParse"));
    assert!(v4.contains("z.email().safeParse"));
}

#[test]
fn test_array_keywords() {
    assert_eq!(
        zod(json!({ "type": "array", "items": { "type": "string" }, "minItems": 1, "maxItems": 3 })),
        "z.array(z.string()).min(1).max(3)"
    );
    assert_eq!(zod(json!({ "type": "array" })), "z.array(z.any())");
    assert_eq!(
        zod(json!({ "type": "array", "items": [{ "type": "string" }], "additionalItems": false })),
        "z.tuple([z.string()])"
    );
    assert_eq!(
        zod(json!({ "type": "array", "items": [{ "type": "string" }], "additionalItems": { "type": "null" } })),
        "z.tuple([z.string()]).rest(z.null())"
    );
}

#[test]
fn test_string_formats_by_version() {
    let schema = json!({ "type": "string", "format": "ipv4" });
    assert_eq!(zod(schema.clone()), "z.ipv4()");
    assert_eq!(
        zod_with(schema, &Options::default().with_version(ZodVersion::V3)),
        r#"z.string().ip({ version: "v4" })"#
    );
    assert_eq!(
        zod_with(
            json!({ "type": "string", "format": "date-time" }),
            &Options::default().with_version(ZodVersion::V3)
        ),
        "z.string().datetime()"
    );
}

#[test]
fn test_error_messages_by_version() {
    let schema = json!({
        "type": "string",
        "pattern": "^[a-z]+$",
        "errorMessage": { "pattern": "lowercase only" }
    });
    assert_eq!(
        zod(schema.clone()),
        r#"z.string().regex(new RegExp("^[a-z]+$"), { error: "lowercase only" })"#
    );
    assert_eq!(
        zod_with(schema, &Options::default().with_version(ZodVersion::V3)),
        r#"z.string().regex(new RegExp("^[a-z]+$"), { message: "lowercase only" })"#
    );
}

#[test]
fn test_mutual_recursion() {
    let schema = json!({
        "$ref": "#/$defs/a",
        "$defs": {
            "a": { "type": "object", "properties": { "b": { "$ref": "#/$defs/b" } } },
            "b": { "type": "object", "properties": { "a": { "$ref": "#/$defs/a" } } }
        }
    });
    assert_eq!(
        zod(schema),
        r#"(() => { const a = z.object({ "b": z.object({ "a": z.lazy(() => a).optional() }).optional() }); return a; })()"#
    );
}

#[test]
fn test_single_use_ref_is_inlined() {
    let schema = json!({
        "type": "object",
        "properties": { "home": { "$ref": "#/definitions/address" } },
        "definitions": { "address": { "type": "string", "maxLength": 80 } }
    });
    assert_eq!(
        zod(schema),
        r#"z.object({ "home": z.string().max(80).optional() })"#
    );
}

#[test]
fn test_repeated_ref_is_bound_once() {
    let schema = json!({
        "type": "object",
        "properties": {
            "home": { "$ref": "#/definitions/address" },
            "work": { "$ref": "#/definitions/address" }
        },
        "definitions": {
            "address": { "type": "string", "maxLength": 80 }
        }
    });
    assert_eq!(
        zod(schema),
        r#"(() => { const address = z.string().max(80); return z.object({ "home": address.optional(), "work": address.optional() }); })()"#
    );
}

#[test]
fn test_shared_ref_graph_stays_linear() {
    let mut definitions = serde_json::Map::new();
    for level in 0..20 {
        let next = format!("#/definitions/d{}", level + 1);
        definitions.insert(
            format!("d{level}"),
            json!({
                "type": "object",
                "properties": { "left": { "$ref": next }, "right": { "$ref": next } },
                "required": ["left", "right"]
            }),
        );
    }
    definitions.insert("d20".to_string(), json!({ "type": "string" }));
    let schema = json!({ "$ref": "#/definitions/d0", "definitions": definitions });

    let expression = zod(schema);
    assert!(expression.len() < 4_000, "expression grew to {} bytes", expression.len());
    assert_eq!(expression.matches("const ").count(), 20);
    assert!(expression.starts_with(
        r#"(() => { const d20 = z.string(); const d19 = z.object({ "left": d20, "right": d20 }); "#
    ));
    assert!(expression.ends_with(r#"return z.object({ "left": d1, "right": d1 }); })()"#));
}

#[test]
fn test_recursive_ref_used_twice() {
    let schema = json!({
        "type": "object",
        "properties": {
            "first": { "$ref": "#/definitions/Node" },
            "second": { "$ref": "#/definitions/Node" }
        },
        "required": ["first", "second"],
        "definitions": {
            "Node": { "type": "array", "items": { "$ref": "#/definitions/Node" } }
        }
    });
    assert_eq!(
        zod(schema),
        r#"(() => { const Node = (() => { const Node = z.array(z.lazy(() => Node)); return Node; })(); return z.object({ "first": Node, "second": Node }); })()"#
    );
}

#[test]
fn test_ref_with_default_is_not_optional() {
    let schema = json!({
        "type": "object",
        "properties": { "level": { "$ref": "#/definitions/level" } },
        "definitions": { "level": { "type": "integer", "default": 3 } }
    });
    assert_eq!(
        zod(schema),
        r#"z.object({ "level": z.number().int().default(3) })"#
    );
}

#[test]
fn test_binding_named_z_does_not_shadow_import() {
    let schema = json!({
        "$ref": "#/definitions/z",
        "definitions": {
            "z": { "type": "object", "properties": { "next": { "$ref": "#/definitions/z" } } }
        }
    });
    assert_eq!(
        zod(schema),
        r#"(() => { const z_ = z.object({ "next": z.lazy(() => z_).optional() }); return z_; })()"#
    );
}

#[test]
fn test_binding_named_after_reserved_word() {
    let schema = json!({
        "$ref": "#/definitions/default",
        "definitions": {
            "default": { "type": "array", "items": { "$ref": "#/definitions/default" } }
        }
    });
    assert_eq!(
        zod(schema),
        "(() => { const default_ = z.array(z.lazy(() => default_)); return default_; })()"
    );

    let schema = json!({ "type": "array", "items": { "$ref": "#" } });
    assert_eq!(
        zod_with(schema, &Options::default().with_name("class")),
        "(() => { const class_ = z.array(z.lazy(() => class_)); return class_; })()"
    );
}

#[test]
fn test_self_reference_to_root() {
    let schema = json!({ "anyOf": [{ "type": "string" }, { "type": "array", "items": { "$ref": "#" } }] });
    assert_eq!(
        zod(schema),
        "(() => { const schema = z.union([z.string(), z.array(z.lazy(() => schema))]); return schema; })()"
    );
}

#[test]
fn test_escaped_pointer_tokens() {
    let schema = json!({
        "$ref": "#/definitions/a~1b%20c",
        "definitions": { "a/b c": { "type": "null" } }
    });
    assert_eq!(zod(schema), "z.null()");
}

#[test]
fn test_discriminated_union_is_opt_in() {
    let schema = json!({
        "oneOf": [
            { "type": "object", "required": ["kind"], "properties": { "kind": { "const": "circle" }, "r": { "type": "number" } } },
            { "type": "object", "required": ["kind"], "properties": { "kind": { "const": "square" }, "side": { "type": "number" } } }
        ]
    });
    let plain = zod(schema.clone());
    assert!(plain.starts_with("z.union(["));

    let discriminated = zod_with(schema, &Options::default().with_discriminated_unions());
    assert_eq!(
        discriminated,
        r#"z.discriminatedUnion("kind", [z.object({ "kind": z.literal("circle"), "r": z.number().optional() }), z.object({ "kind": z.literal("square"), "side": z.number().optional() })])"#
    );
}
