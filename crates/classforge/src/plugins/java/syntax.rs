//! Java naming and literal helpers

/// Literal returned by a generated method stub, or `None` for `void`
pub fn default_value(return_type: &str) -> Option<&'static str> {
    match return_type.trim() {
        "void" => None,
        "byte" | "short" | "int" | "long" | "char" => Some("0"),
        "double" => Some("0.0"),
        "float" => Some("0.0f"),
        "boolean" => Some("false"),
        _ => Some("null"),
    }
}

/// Wrapper class for a primitive type; other types are returned unchanged
pub fn boxed(ty: &str) -> &str {
    match ty {
        "byte" => "Byte",
        "short" => "Short",
        "int" => "Integer",
        "long" => "Long",
        "char" => "Character",
        "float" => "Float",
        "double" => "Double",
        "boolean" => "Boolean",
        other => other,
    }
}

/// Upper-case the first character, leaving the rest alone
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Type parameter standing in for a collection-valued parameter
pub fn type_parameter(parameter: &str) -> String {
    format!("T{}", capitalize(parameter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_value("void"), None);
        assert_eq!(default_value("int"), Some("0"));
        assert_eq!(default_value("long"), Some("0"));
        assert_eq!(default_value("double"), Some("0.0"));
        assert_eq!(default_value("float"), Some("0.0f"));
        assert_eq!(default_value("boolean"), Some("false"));
        assert_eq!(default_value("String"), Some("null"));
        assert_eq!(default_value("Integer"), Some("null"));
        assert_eq!(default_value("List<String>"), Some("null"));
    }

    #[test]
    fn test_capitalize_keeps_camel_case() {
        assert_eq!(capitalize("firstName"), "FirstName");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_boxed() {
        assert_eq!(boxed("int"), "Integer");
        assert_eq!(boxed("char"), "Character");
        assert_eq!(boxed("Item"), "Item");
    }

    #[test]
    fn test_type_parameter() {
        assert_eq!(type_parameter("items"), "TItems");
    }
}
