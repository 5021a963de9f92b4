//! Editable view over an element's class tokens.

use std::fmt;

use crate::element::ElementData;
use crate::error::DomError;

/// A borrowed, editable class-token set.
///
/// Tokens keep insertion order and are unique. Each successful change is
/// written back to the owning element's `class` attribute before the method
/// returns, so the attribute string never lags behind the set.
pub struct ClassList<'a> {
    element: &'a mut ElementData,
}

fn validate(token: &str) -> Result<(), DomError> {
    if token.chars().any(char::is_whitespace) {
        return Err(DomError::InvalidToken {
            token: token.to_string(),
        });
    }
    Ok(())
}

impl<'a> ClassList<'a> {
    pub(crate) fn new(element: &'a mut ElementData) -> Self {
        ClassList { element }
    }

    /// Add a token. Adding a present token leaves the order unchanged.
    pub fn add(&mut self, token: &str) -> Result<(), DomError> {
        validate(token)?;
        self.element.classes.insert(token.into());
        self.element.write_class_attribute();
        Ok(())
    }

    /// Remove a token. Returns whether it was present.
    pub fn remove(&mut self, token: &str) -> bool {
        let removed = self.element.classes.shift_remove(token);
        if removed {
            self.element.write_class_attribute();
        }
        removed
    }

    /// Remove `old` and add `new` at the end.
    pub fn replace(&mut self, old: &str, new: &str) -> Result<(), DomError> {
        validate(new)?;
        self.element.classes.shift_remove(old);
        self.element.classes.insert(new.into());
        self.element.write_class_attribute();
        Ok(())
    }

    /// Remove the token if present, add it otherwise. Returns whether it is
    /// present afterwards.
    pub fn toggle(&mut self, token: &str) -> Result<bool, DomError> {
        validate(token)?;
        let present = if self.element.classes.shift_remove(token) {
            false
        } else {
            self.element.classes.insert(token.into());
            true
        };
        self.element.write_class_attribute();
        Ok(present)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.element.classes.contains(token)
    }

    pub fn len(&self) -> usize {
        self.element.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.element.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.element.classes.iter().map(|c| c.as_str())
    }

    /// Tokens as an owned list.
    pub fn value(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

impl fmt::Display for ClassList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.element.class_names())
    }
}
