//! `{placeholder}` substitution for player-facing text.

use std::fmt::Display;

/// Replace every `{key}` in `template` with the matching argument
pub fn fill(template: &str, args: &[(&str, &dyn Display)]) -> String {
    let mut text = template.to_string();
    for (key, value) in args {
        let placeholder = format!("{{{}}}", key);
        if text.contains(&placeholder) {
            text = text.replace(&placeholder, &value.to_string());
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_all_occurrences() {
        let text = fill("{name} {name} lvl {level}", &[("name", &"Ignite"), ("level", &2)]);
        assert_eq!(text, "Ignite Ignite lvl 2");
    }

    #[test]
    fn test_fill_leaves_unknown_placeholders() {
        assert_eq!(fill("{cash}/{cost}", &[("cash", &5)]), "5/{cost}");
    }
}
