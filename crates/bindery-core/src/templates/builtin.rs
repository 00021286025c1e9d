//! Compiled-in template set.

pub(crate) fn lookup(name: &str) -> Option<&'static str> {
    match name {
        "module.cpp" => Some(include_str!("../../templates/module.cpp")),
        "module_part.cpp" => Some(include_str!("../../templates/module_part.cpp")),
        "stub_header.pyi" => Some(include_str!("../../templates/stub_header.pyi")),
        _ => None,
    }
}
