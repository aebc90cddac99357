//! Controlled multi-value select.
//!
//! The model holds borrowed options and the caller's current value; it never
//! stores a selection of its own. Every operation returns the *next* value
//! for the caller to feed back in.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MultiSelect<'a> {
    options: &'a [SelectOption],
    value: &'a [String],
}

impl<'a> MultiSelect<'a> {
    pub fn new(options: &'a [SelectOption], value: &'a [String]) -> Self {
        Self { options, value }
    }

    pub fn options(&self) -> &'a [SelectOption] {
        self.options
    }

    /// Whether the option with `value` renders as selected.
    ///
    /// Values in the caller's selection that match no option are ignored.
    pub fn is_selected(&self, value: &str) -> bool {
        self.value.iter().any(|v| v == value)
    }

    /// Options currently rendered as selected, in document order.
    pub fn selected_options(&self) -> Vec<&'a SelectOption> {
        self.options
            .iter()
            .filter(|opt| self.is_selected(&opt.value))
            .collect()
    }

    /// Selection reported by a native control: one flag per option, in
    /// document order. Missing trailing flags count as unselected.
    pub fn selection_from_flags(&self, flags: &[bool]) -> Vec<String> {
        self.options
            .iter()
            .zip(flags.iter().copied().chain(core::iter::repeat(false)))
            .filter(|(_, selected)| *selected)
            .map(|(opt, _)| opt.value.clone())
            .collect()
    }

    /// Selection after flipping `value`, in document order.
    pub fn toggle(&self, value: &str) -> Vec<String> {
        let flags: Vec<bool> = self
            .options
            .iter()
            .map(|opt| {
                let selected = self.is_selected(&opt.value);
                if opt.value == value { !selected } else { selected }
            })
            .collect();
        self.selection_from_flags(&flags)
    }

    /// Selection with every option deselected.
    pub fn cleared(&self) -> Vec<String> {
        Vec::new()
    }
}
