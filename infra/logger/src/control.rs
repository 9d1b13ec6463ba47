//! Control-string grammar.
//!
//! Elements are separated by whitespace or commas:
//!
//! | Element                     | Effect                                   |
//! |-----------------------------|------------------------------------------|
//! | `*`, `mgraph:*`             | include the root                         |
//! | `mgraph:<path>`             | include `<path>`                         |
//! | `-mgraph:<path>`            | exclude `<path>`                         |
//! | `mgraph[<level>]:<path>`    | include `<path>` at `<level>`            |
//! | `@<profile>`                | expand a named profile                   |
//!
//! Anything else is ignored, so a string shared with other tools stays usable.

use crate::error::LoggerError;
use crate::level::LogLevel;
use crate::tree::Tree;
use fxhash::FxHashMap;
use tracing::debug;

/// The component prefix recognised in control-string elements.
pub const CONTROL_PREFIX: &str = "mgraph";

/// Named expansions for `@<profile>` elements.
pub type Profiles = FxHashMap<String, Vec<String>>;

/// Profiles available without configuration.
#[must_use]
pub fn builtin_profiles() -> Profiles {
    let mut profiles = Profiles::default();
    profiles.insert(
        "serializer".to_owned(),
        vec!["mgraph:core/serializer".to_owned(), "mgraph:core/typed_stack".to_owned()],
    );
    profiles.insert("schema".to_owned(), vec!["mgraph:introspect".to_owned()]);
    profiles
}

/// Parses `control` into a fresh [`Tree`] whose root starts excluded at `root_level`.
///
/// `profiles` are consulted before the built-in ones, so configuration may override them.
///
/// # Errors
/// Returns [`LoggerError::InvalidLevel`] for an unknown bracketed level and
/// [`LoggerError::InvalidControlString`] for malformed brackets, unknown or recursive
/// profiles.
pub fn parse_control(
    control: &str,
    profiles: &Profiles,
    root_level: LogLevel,
) -> Result<Tree, LoggerError> {
    let builtins = builtin_profiles();
    let mut parser = Parser {
        profiles,
        builtins: &builtins,
        tree: Tree::new(false, root_level),
        expanding: Vec::new(),
    };
    for element in elements(control) {
        parser.apply(element)?;
    }
    Ok(parser.tree)
}

struct Parser<'a> {
    profiles: &'a Profiles,
    builtins: &'a Profiles,
    tree: Tree,
    expanding: Vec<&'a str>,
}

impl<'a> Parser<'a> {
    fn apply(&mut self, element: &'a str) -> Result<(), LoggerError> {
        if element == "*" {
            self.tree.set_root_inclusion(true);
            return Ok(());
        }
        if let Some(name) = element.strip_prefix('@') {
            return self.expand(name);
        }

        let (include, rest) =
            element.strip_prefix('-').map_or((true, element), |rest| (false, rest));
        let Some(rest) = rest.strip_prefix(CONTROL_PREFIX) else {
            debug!(element, "Ignoring unrecognised control element");
            return Ok(());
        };

        let (level, rest) = match rest.strip_prefix('[') {
            Some(bracketed) => {
                let Some((name, rest)) = bracketed.split_once(']') else {
                    return Err(invalid(format!("Unterminated level in {element}")));
                };
                (Some(LogLevel::parse(name)?), rest)
            },
            None => (None, rest),
        };

        let Some(path) = rest.strip_prefix(':') else {
            debug!(element, "Ignoring unrecognised control element");
            return Ok(());
        };

        if path.is_empty() || path == "*" {
            self.tree.set_root_inclusion(include);
            if let Some(level) = level {
                self.tree.set_root_level(level);
            }
        } else {
            self.tree.add_node(path, include, level);
        }
        Ok(())
    }

    fn expand(&mut self, name: &'a str) -> Result<(), LoggerError> {
        if self.expanding.contains(&name) {
            return Err(invalid(format!("Profile @{name} expands to itself")));
        }
        let rules = self
            .profiles
            .get(name)
            .or_else(|| self.builtins.get(name))
            .ok_or_else(|| invalid(format!("Unknown profile @{name}")))?;

        self.expanding.push(name);
        for rule in rules {
            for element in elements(rule) {
                self.apply(element)?;
            }
        }
        self.expanding.pop();
        Ok(())
    }
}

fn elements(control: &str) -> impl Iterator<Item = &str> {
    control.split(|c: char| c.is_whitespace() || c == ',').filter(|e| !e.is_empty())
}

fn invalid(message: String) -> LoggerError {
    LoggerError::InvalidControlString { message: message.into(), context: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(control: &str) -> Result<Tree, LoggerError> {
        parse_control(control, &Profiles::default(), LogLevel::Info)
    }

    #[test]
    fn wildcard_includes_root() -> Result<(), LoggerError> {
        assert!(parse("*")?.root().include());
        assert!(parse("mgraph:*")?.root().include());
        assert!(!parse("")?.root().include());
        Ok(())
    }

    #[test]
    fn exclusions_and_levels() -> Result<(), LoggerError> {
        let tree =
            parse("*, -mgraph:core/serializer mgraph[debug]:core/serializer/json_generator")?;

        assert!(tree.get_inclusion("core/factory"));
        assert!(!tree.get_inclusion("core/serializer/json_populator"));
        assert!(tree.get_inclusion("core/serializer/json_generator"));
        assert_eq!(tree.get_level("core/serializer/json_generator"), LogLevel::Debug);
        assert_eq!(tree.get_level("core/serializer"), LogLevel::Info);
        Ok(())
    }

    #[test]
    fn foreign_elements_are_ignored() -> Result<(), LoggerError> {
        let tree = parse("express:* other mgraphx:core")?;
        assert_eq!(tree, Tree::new(false, LogLevel::Info));
        Ok(())
    }

    #[test]
    fn builtin_profiles_expand() -> Result<(), LoggerError> {
        let tree = parse("@serializer")?;
        assert!(tree.get_inclusion("core/serializer/json_generator"));
        assert!(tree.get_inclusion("core/typed_stack"));
        assert!(!tree.get_inclusion("core/factory"));
        Ok(())
    }

    #[test]
    fn configured_profiles_override_builtins() -> Result<(), LoggerError> {
        let mut profiles = Profiles::default();
        profiles.insert("schema".to_owned(), vec!["mgraph[warn]:introspect/schema".to_owned()]);
        let tree = parse_control("@schema", &profiles, LogLevel::Info)?;

        assert!(!tree.get_inclusion("introspect"));
        assert!(tree.is_enabled("introspect/schema", LogLevel::Warn));
        assert!(!tree.is_enabled("introspect/schema", LogLevel::Info));
        Ok(())
    }

    #[test]
    fn recursive_profiles_fail() {
        let mut profiles = Profiles::default();
        profiles.insert("a".to_owned(), vec!["@b".to_owned()]);
        profiles.insert("b".to_owned(), vec!["mgraph:core @a".to_owned()]);

        let err = parse_control("@a", &profiles, LogLevel::Info).expect_err("cycle");
        assert!(matches!(err, LoggerError::InvalidControlString { .. }));
    }

    #[test]
    fn profiles_may_repeat_without_recursion() -> Result<(), LoggerError> {
        let tree = parse("@schema @schema")?;
        assert!(tree.get_inclusion("introspect"));
        Ok(())
    }

    #[test]
    fn malformed_levels_fail() {
        assert!(matches!(parse("mgraph[loud]:core"), Err(LoggerError::InvalidLevel { .. })));
        assert!(matches!(
            parse("mgraph[debug:core"),
            Err(LoggerError::InvalidControlString { .. })
        ));
        assert!(matches!(parse("@missing"), Err(LoggerError::InvalidControlString { .. })));
    }
}
