use miette::Report;
use zodgen_core::{convert_json_str, Options};

fn main() {
    let schema = r##"
        {
            "type": "object",
            "properties": {
                "name": { "type": "string", "minLength": 1 },
                "email": { "type": "string", "format": "email" },
                "friends": { "type": "array", "items": { "$ref": "#" } }
            },
            "required": ["name", "email"]
        }
    "##;

    let options = Options::default().with_name("User");
    match convert_json_str(schema, &options) {
        Ok(conversion) => {
            for diagnostic in &conversion.diagnostics {
                eprintln!("{:?}", Report::new(diagnostic.clone()));
            }
            println!("const User = {};", conversion.expression);
        }
        Err(e) => {
            eprintln!("Failed to convert schema: {:?}", Report::new(e));
        }
    }
}
