//! Naming conventions and well-known platform types.

use translit_syntax::TargetRef;

/// Uppercase the first character: `getName` -> `GetName`.
pub fn pascal_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `com.acme.util` -> `Com.Acme.Util`.
pub fn namespace_for_package(package: &str) -> String {
    package
        .split('.')
        .filter(|s| !s.is_empty())
        .map(pascal_case)
        .collect::<Vec<_>>()
        .join(".")
}

/// Resolver key for a member of `owner`: `com.acme.Outer#build`.
///
/// Members live in their own key space so a method never collides with a
/// nested type of the same name.
pub fn member_key(owner: &str, name: &str) -> String {
    format!("{owner}#{name}")
}

/// Resolver key for a dotted method identity as carried by call bindings:
/// `com.acme.Outer.build` -> `com.acme.Outer#build`.
pub fn member_key_for_binding(binding: &str) -> String {
    match binding.rsplit_once('.') {
        Some((owner, name)) => member_key(owner, name),
        None => member_key("", binding),
    }
}

/// Target for a source type identity that is not declared by any unit.
pub fn builtin_type(identity: &str) -> Option<TargetRef> {
    let keyword = |name: &str| Some(TargetRef::ty(None, name));
    let system = |ns: &str, name: &str| Some(TargetRef::ty(Some(ns.to_string()), name));

    match identity {
        "boolean" | "java.lang.Boolean" => keyword("bool"),
        "byte" | "java.lang.Byte" => keyword("sbyte"),
        "char" | "java.lang.Character" => keyword("char"),
        "short" | "java.lang.Short" => keyword("short"),
        "int" | "java.lang.Integer" => keyword("int"),
        "long" | "java.lang.Long" => keyword("long"),
        "float" | "java.lang.Float" => keyword("float"),
        "double" | "java.lang.Double" => keyword("double"),
        "java.lang.String" => keyword("string"),
        "java.lang.Object" => keyword("object"),
        "java.lang.Exception" | "java.lang.RuntimeException" | "java.lang.Throwable" => {
            system("System", "Exception")
        }
        "java.lang.IllegalArgumentException" => system("System", "ArgumentException"),
        "java.lang.IllegalStateException" => system("System", "InvalidOperationException"),
        "java.lang.UnsupportedOperationException" => system("System", "NotSupportedException"),
        "java.lang.Math" => system("System", "Math"),
        "java.lang.StringBuilder" => system("System.Text", "StringBuilder"),
        "java.util.List" => system("System.Collections.Generic", "IList"),
        "java.util.ArrayList" => system("System.Collections.Generic", "List"),
        "java.util.Map" => system("System.Collections.Generic", "IDictionary"),
        "java.util.HashMap" => system("System.Collections.Generic", "Dictionary"),
        "java.lang.Iterable" => system("System.Collections.Generic", "IEnumerable"),
        _ => None,
    }
}

/// Target name for a well-known platform method.
pub fn builtin_member(identity: &str) -> Option<&'static str> {
    match identity {
        "java.lang.Object.toString" => Some("ToString"),
        "java.lang.Object.equals" => Some("Equals"),
        "java.lang.Object.hashCode" => Some("GetHashCode"),
        "java.lang.StringBuilder.append" => Some("Append"),
        "java.lang.Math.max" => Some("Max"),
        "java.lang.Math.min" => Some("Min"),
        "java.lang.Math.abs" => Some("Abs"),
        _ => None,
    }
}
