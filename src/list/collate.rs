//! Locale-style string ordering for list items
//!
//! Approximates the default collation a browser uses for `localeCompare`:
//! accents and case are ignored until everything else is equal, punctuation
//! sorts before digits and digits before letters.

use std::cmp::Ordering;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Coarse character classes, in collation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Space,
    Symbol,
    Digit,
    Letter,
}

fn class_of(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Space
    } else if c.is_numeric() {
        CharClass::Digit
    } else if c.is_alphabetic() {
        CharClass::Letter
    } else {
        CharClass::Symbol
    }
}

/// Case-folded char, first char of the lowercase mapping
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// A base character and the combining marks that follow it after NFD
#[derive(Debug)]
struct Unit {
    base: char,
    marks: Vec<char>,
}

fn units(s: &str) -> Vec<Unit> {
    let mut out: Vec<Unit> = Vec::new();
    for c in s.nfd() {
        match out.last_mut() {
            Some(unit) if is_combining_mark(c) => unit.marks.push(c),
            _ => out.push(Unit { base: c, marks: Vec::new() }),
        }
    }
    out
}

/// Base letters only: class, then case-folded char, then length
fn primary(a: &[Unit], b: &[Unit]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = class_of(x.base)
            .cmp(&class_of(y.base))
            .then_with(|| fold(x.base).cmp(&fold(y.base)));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Accents: unaccented before accented at the first position that differs
fn secondary(a: &[Unit], b: &[Unit]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = x.marks.cmp(&y.marks);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Lowercase before uppercase at the first position where case differs
fn tertiary(a: &[Unit], b: &[Unit]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match (x.base.is_uppercase(), y.base.is_uppercase()) {
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

/// Compare two item texts the way the list orders them
pub fn compare(a: &str, b: &str) -> Ordering {
    let (left, right) = (units(a), units(b));
    primary(&left, &right)
        .then_with(|| secondary(&left, &right))
        .then_with(|| tertiary(&left, &right))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_is_ignored_at_primary_level() {
        assert_eq!(compare("apples", "Milk"), Ordering::Less);
        assert_eq!(compare("Bread", "apples"), Ordering::Greater);
    }

    #[test]
    fn test_lowercase_sorts_before_uppercase_on_tie() {
        assert_eq!(compare("milk", "Milk"), Ordering::Less);
        assert_eq!(compare("Milk", "milk"), Ordering::Greater);
        assert_eq!(compare("Milk", "Milk"), Ordering::Equal);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(compare("egg", "eggs"), Ordering::Less);
        assert_eq!(compare("Eggs", "egg"), Ordering::Greater);
    }

    #[test]
    fn test_character_classes() {
        assert_eq!(compare("-foil", "2 lemons"), Ordering::Less);
        assert_eq!(compare("2 lemons", "apples"), Ordering::Less);
        assert_eq!(compare("ice cream", "iceberg"), Ordering::Less);
    }

    #[test]
    fn test_accents_sort_with_base_letter() {
        assert_eq!(compare("éclair", "fig"), Ordering::Less);
        assert_eq!(compare("Äpfel", "bread"), Ordering::Less);
        assert_eq!(compare("crème fraîche", "cream"), Ordering::Greater);
        assert_eq!(compare("crème fraîche", "cress"), Ordering::Less);
    }

    #[test]
    fn test_accent_breaks_tie_before_case() {
        assert_eq!(compare("cote", "côte"), Ordering::Less);
        assert_eq!(compare("côte", "Cote"), Ordering::Greater);
        assert_eq!(compare("cafe", "caf\u{e9}"), Ordering::Less);
    }

    #[test]
    fn test_sorting_a_list() {
        let mut items = vec![
            "oranges", "Bread", "éclair", "apples", "bread", "10 eggs", "Äpfel", "fig",
        ];
        items.sort_by(|a, b| compare(a, b));
        assert_eq!(
            items,
            vec!["10 eggs", "Äpfel", "apples", "bread", "Bread", "éclair", "fig", "oranges"]
        );
    }
}
