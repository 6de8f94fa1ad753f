/// Placeholder names of a key template, in order.
///
/// Only the brace structure is checked here. Format specs are validated when the
/// template is parsed at runtime.
pub(super) fn placeholders(template: &str) -> Result<Vec<String>, String> {
    let mut names = Vec::new();
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
            }
            '{' => {
                let mut body = String::new();
                let mut closed = false;

                for (_, c) in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => break,
                        c => body.push(c),
                    }
                }

                if !closed {
                    return Err(format!("unbalanced '{{' at offset {offset}"));
                }

                let name = body.split(':').next().unwrap_or_default();

                if name.is_empty() {
                    return Err(format!("empty placeholder at offset {offset}"));
                }

                if names.iter().any(|n| n == name) {
                    return Err(format!("placeholder '{name}' appears more than once"));
                }

                names.push(name.to_string());
            }
            '}' => return Err(format!("unbalanced '}}' at offset {offset}")),
            _ => {}
        }
    }

    Ok(names)
}
