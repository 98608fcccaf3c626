use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use zodgen_core::{convert, json_schema_to_zod, Options, ZodVersion};

// ============================================================================
// Test Data: Varying Complexity and Size
// ============================================================================

fn small_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "minLength": 1 },
            "age": { "type": "integer", "minimum": 0 }
        },
        "required": ["name"]
    })
}

fn recursive_schema() -> Value {
    json!({
        "$ref": "#/definitions/Node",
        "definitions": {
            "Node": {
                "type": "object",
                "properties": {
                    "value": { "anyOf": [{ "type": "string" }, { "type": "number" }] },
                    "children": { "type": "array", "items": { "$ref": "#/definitions/Node" } }
                },
                "required": ["value"]
            }
        }
    })
}

/// An object with `width` properties, each a small composite schema.
fn generate_wide_schema(width: usize) -> Value {
    let mut properties = serde_json::Map::new();
    for i in 0..width {
        properties.insert(
            format!("field_{i}"),
            json!({
                "type": ["string", "null"],
                "format": "email",
                "description": format!("Field number {i}"),
                "default": null
            }),
        );
    }
    json!({ "type": "object", "properties": properties, "additionalProperties": false })
}

/// `depth` nested `allOf` objects.
fn generate_deep_schema(depth: usize) -> Value {
    let mut schema = json!({ "type": "boolean" });
    for i in 0..depth {
        schema = json!({
            "allOf": [
                { "type": "object", "properties": { (format!("level_{i}")): schema } },
                { "type": "object", "required": [format!("level_{i}")] }
            ]
        });
    }
    schema
}

// ============================================================================
// Conversion Benchmarks
// ============================================================================

fn bench_convert_small(c: &mut Criterion) {
    let schema = small_schema();
    let options = Options::default();
    c.bench_function("convert_small", |b| {
        b.iter(|| json_schema_to_zod(black_box(&schema), &options))
    });
}

fn bench_convert_recursive(c: &mut Criterion) {
    let schema = recursive_schema();
    let options = Options::default();
    c.bench_function("convert_recursive", |b| {
        b.iter(|| json_schema_to_zod(black_box(&schema), &options))
    });
}

fn bench_convert_versions(c: &mut Criterion) {
    let schema = generate_wide_schema(50);
    let mut group = c.benchmark_group("convert_versions");
    for version in [ZodVersion::V3, ZodVersion::V4] {
        let options = Options::default().with_version(version);
        group.bench_with_input(BenchmarkId::from_parameter(version), &schema, |b, schema| {
            b.iter(|| convert(black_box(schema), &options))
        });
    }
    group.finish();
}

fn bench_width_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("width_scaling");
    for width in [10, 100, 1000] {
        let schema = generate_wide_schema(width);
        let options = Options::default();
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &schema, |b, schema| {
            b.iter(|| json_schema_to_zod(black_box(schema), &options))
        });
    }
    group.finish();
}

fn bench_depth_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("depth_scaling");
    for depth in [5, 20, 50] {
        let schema = generate_deep_schema(depth);
        let options = Options::default();
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &schema, |b, schema| {
            b.iter(|| json_schema_to_zod(black_box(schema), &options))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_convert_small,
    bench_convert_recursive,
    bench_convert_versions,
    bench_width_scaling,
    bench_depth_scaling
);
criterion_main!(benches);
