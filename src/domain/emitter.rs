// Text emission for one reflected record.

use crate::domain::classifier::EmitStrategy;

const INDENT: &str = "    ";

/// Render the reflection function for `record`. Fields are emitted in the
/// order given, which callers keep equal to declaration order.
pub fn emit(record: &str, fields: &[(String, EmitStrategy)]) -> String {
    let mut lines = Vec::with_capacity(fields.len() + 3);
    lines.push(format!("void reflect({}& obj)", record));
    lines.push("{".to_string());
    for (name, strategy) in fields {
        let body = match strategy {
            EmitStrategy::Literal(text) => text.as_str(),
            EmitStrategy::NameOnly(_) => name.as_str(),
        };
        lines.push(statement(body));
    }
    lines.push("}".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn statement(body: &str) -> String {
    let body = body.trim_end();
    if body.ends_with(';') {
        format!("{}{}", INDENT, body)
    } else {
        format!("{}{};", INDENT, body)
    }
}
