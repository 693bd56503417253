//! Multi-select dropdown model.
//!
//! A [`MultiSelect`] is a checkbox list behind a toggle button. Its state is
//! the open/closed flag plus the set of selected values; everything shown
//! to the user (button text, hidden serialized value, error flag) is derived
//! from that state on demand, never cached.
//!
//! A [`DropdownGroup`] holds every multi-select of one form and enforces
//! that at most one of them is open.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::SelectSpec;

/// Label of the catch-all option, always listed last.
pub const OTHER_LABEL: &str = "Other";

/// One checkbox of a multi-select.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }

    /// Option whose submitted value is its label.
    pub fn labelled(label: impl Into<String>) -> Self {
        let label = label.into();
        Self { value: label.clone(), label }
    }

    fn is_other(&self) -> bool {
        self.label.trim() == OTHER_LABEL
    }
}

/// Order options alphabetically by label, with "Other" last.
///
/// Labels compare case-insensitively; equal labels fall back to a
/// case-sensitive comparison so the order is total.
pub fn sort_options(options: &mut [SelectOption]) {
    options.sort_by(|a, b| match (a.is_other(), b.is_other()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => {
            let (a, b) = (a.label.trim(), b.label.trim());
            a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
        }
    });
}

/// Open/closed state of a dropdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DropdownState {
    #[default]
    Closed,
    Open,
}

// =============================================================================
// Multi-select
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct MultiSelect {
    name: String,
    placeholder: String,
    required: bool,
    options: Vec<SelectOption>,
    selected: HashSet<String>,
    state: DropdownState,
}

impl MultiSelect {
    /// Build a closed widget with nothing selected.
    ///
    /// Options are sorted for display and options repeating an earlier
    /// value are dropped.
    pub fn new(
        name: impl Into<String>,
        placeholder: impl Into<String>,
        required: bool,
        options: impl IntoIterator<Item = SelectOption>,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut options: Vec<SelectOption> = options
            .into_iter()
            .filter(|o| seen.insert(o.value.clone()))
            .collect();
        sort_options(&mut options);

        Self {
            name: name.into(),
            placeholder: placeholder.into(),
            required,
            options,
            selected: HashSet::new(),
            state: DropdownState::Closed,
        }
    }

    pub fn from_spec(spec: &SelectSpec) -> Self {
        let options = spec.options.iter().map(|o| {
            SelectOption::new(o.label.clone(), o.value.clone().unwrap_or_else(|| o.label.clone()))
        });
        Self::new(spec.name.clone(), spec.placeholder.clone(), spec.required, options)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// Options in display order.
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn state(&self) -> DropdownState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DropdownState::Open
    }

    /// Flip open/closed. Prefer [`DropdownGroup::toggle`] when the widget
    /// belongs to a form.
    pub fn toggle_open(&mut self) {
        self.state = match self.state {
            DropdownState::Closed => DropdownState::Open,
            DropdownState::Open => DropdownState::Closed,
        };
    }

    pub fn close(&mut self) {
        self.state = DropdownState::Closed;
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.contains(value)
    }

    /// Check or uncheck `value`. Returns whether the selection changed;
    /// values that are not options never change it.
    pub fn set_selected(&mut self, value: &str, checked: bool) -> bool {
        if !self.options.iter().any(|o| o.value == value) {
            return false;
        }
        if checked {
            self.selected.insert(value.to_string())
        } else {
            self.selected.remove(value)
        }
    }

    pub fn toggle_value(&mut self, value: &str) -> bool {
        let checked = !self.is_selected(value);
        self.set_selected(value, checked)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected options in display order.
    pub fn selected_options(&self) -> impl Iterator<Item = &SelectOption> {
        self.options.iter().filter(|o| self.selected.contains(&o.value))
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Value of the hidden field: selected values joined by `delimiter`.
    pub fn serialized(&self, delimiter: &str) -> String {
        self.selected_options()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    /// Button text: the placeholder, the single selected label, or
    /// `"N selected"`.
    pub fn display_text(&self) -> String {
        let mut selected = self.selected_options();
        match (selected.next(), self.selected.len()) {
            (None, _) => self.placeholder.clone(),
            (Some(only), 1) => only.label.clone(),
            (_, n) => format!("{n} selected"),
        }
    }

    /// Whether the button carries the "has selection" style.
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Required and nothing selected.
    pub fn has_error(&self) -> bool {
        self.required && self.selected.is_empty()
    }
}

// =============================================================================
// Dropdown Group
// =============================================================================

/// All multi-selects of one form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DropdownGroup {
    widgets: Vec<MultiSelect>,
}

impl DropdownGroup {
    pub fn new(widgets: Vec<MultiSelect>) -> Self {
        Self { widgets }
    }

    pub fn from_specs(specs: &[SelectSpec]) -> Self {
        Self::new(specs.iter().map(MultiSelect::from_spec).collect())
    }

    pub fn widgets(&self) -> &[MultiSelect] {
        &self.widgets
    }

    pub fn get(&self, name: &str) -> Option<&MultiSelect> {
        self.widgets.iter().find(|w| w.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MultiSelect> {
        self.widgets.iter_mut().find(|w| w.name == name)
    }

    /// Toggle the named widget, closing every other one when it opens.
    pub fn toggle(&mut self, name: &str) {
        for widget in &mut self.widgets {
            if widget.name == name {
                widget.toggle_open();
            } else {
                widget.close();
            }
        }
    }

    /// A click landed outside every widget.
    pub fn close_all(&mut self) {
        self.widgets.iter_mut().for_each(MultiSelect::close);
    }

    /// A click landed inside `name`: close the others.
    pub fn close_except(&mut self, name: &str) {
        for widget in self.widgets.iter_mut().filter(|w| w.name != name) {
            widget.close();
        }
    }

    /// Whether a page click would close the open widget. `inside` names the
    /// widget the click landed in, `None` for anywhere else.
    pub fn click_closes(&self, inside: Option<&str>) -> bool {
        self.open_widget().is_some_and(|open| inside != Some(open))
    }

    /// Apply a page click: close everything except the widget it landed in.
    /// The widget's own toggle button is handled by [`DropdownGroup::toggle`].
    pub fn on_click(&mut self, inside: Option<&str>) {
        match inside {
            Some(name) => self.close_except(name),
            None => self.close_all(),
        }
    }

    /// Name of the open widget, if any.
    pub fn open_widget(&self) -> Option<&str> {
        self.widgets.iter().find(|w| w.is_open()).map(|w| w.name.as_str())
    }

    /// Set a checkbox of the named widget. Returns whether anything changed.
    pub fn set_selected(&mut self, name: &str, value: &str, checked: bool) -> bool {
        self.get_mut(name).is_some_and(|w| w.set_selected(value, checked))
    }

    /// `(field name, serialized value)` for every widget.
    pub fn serialized_values(&self, delimiter: &str) -> Vec<(String, String)> {
        self.widgets
            .iter()
            .map(|w| (w.name.clone(), w.serialized(delimiter)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(select: &MultiSelect) -> Vec<&str> {
        select.options().iter().map(|o| o.label.as_str()).collect()
    }

    fn industries() -> MultiSelect {
        MultiSelect::new(
            "industry",
            "Select industries",
            true,
            ["Retail", "Other", "Healthcare", "agriculture", "Finance"]
                .into_iter()
                .map(SelectOption::labelled),
        )
    }

    #[test]
    fn test_other_sorts_last() {
        let select = industries();
        assert_eq!(
            labels(&select),
            vec!["agriculture", "Finance", "Healthcare", "Retail", "Other"]
        );
    }

    #[test]
    fn test_other_last_even_when_alphabetically_first() {
        let mut options = vec![
            SelectOption::labelled("Zoning"),
            SelectOption::labelled(" Other "),
            SelectOption::labelled("Wholesale"),
            SelectOption::labelled("Others"),
        ];
        sort_options(&mut options);
        let sorted: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        // only the exact label is pinned
        assert_eq!(sorted, vec!["Others", "Wholesale", "Zoning", " Other "]);
    }

    #[test]
    fn test_case_sensitive_tie_break() {
        let mut options = vec![SelectOption::new("beta", "2"), SelectOption::new("Beta", "1")];
        sort_options(&mut options);
        assert_eq!(options[0].label, "Beta");
    }

    #[test]
    fn test_duplicate_values_dropped() {
        let select = MultiSelect::new(
            "x",
            "Pick",
            false,
            vec![SelectOption::new("A", "a"), SelectOption::new("A again", "a")],
        );
        assert_eq!(labels(&select), vec!["A"]);
    }

    #[test]
    fn test_display_text_zero_one_many() {
        let mut select = industries();
        assert_eq!(select.display_text(), "Select industries");
        assert!(!select.has_selection());

        select.set_selected("Finance", true);
        assert_eq!(select.display_text(), "Finance");

        select.set_selected("Retail", true);
        select.set_selected("Other", true);
        assert_eq!(select.display_text(), "3 selected");
        assert!(select.has_selection());
    }

    #[test]
    fn test_display_text_uses_label_not_value() {
        let mut select = MultiSelect::new("s", "Pick", false, vec![SelectOption::new("Web design", "web")]);
        select.set_selected("web", true);
        assert_eq!(select.display_text(), "Web design");
        assert_eq!(select.serialized(","), "web");
    }

    #[test]
    fn test_serialized_follows_display_order() {
        let mut select = MultiSelect::new(
            "services",
            "Pick",
            false,
            ["Y", "X"].into_iter().map(SelectOption::labelled),
        );
        select.set_selected("Y", true);
        select.set_selected("X", true);
        assert_eq!(select.serialized(","), "X,Y");
        assert_eq!(select.serialized(", "), "X, Y");

        select.clear();
        assert_eq!(select.serialized(","), "");
    }

    #[test]
    fn test_unknown_values_ignored() {
        let mut select = industries();
        assert!(!select.set_selected("Mining", true));
        assert!(select.set_selected("Retail", true));
        assert!(!select.set_selected("Retail", true));
        assert!(select.toggle_value("Retail"));
        assert_eq!(select.selected_count(), 0);
    }

    #[test]
    fn test_required_error_tracks_selection() {
        let mut select = industries();
        assert!(select.has_error());
        select.toggle_value("Finance");
        assert!(!select.has_error());

        let optional = MultiSelect::new("o", "Pick", false, vec![SelectOption::labelled("A")]);
        assert!(!optional.has_error());
    }

    #[test]
    fn test_selection_does_not_change_open_state() {
        let mut select = industries();
        select.toggle_open();
        select.set_selected("Finance", true);
        assert!(select.is_open());
    }

    #[test]
    fn test_group_at_most_one_open() {
        let mut group = DropdownGroup::new(vec![
            industries(),
            MultiSelect::new("services", "Pick", false, vec![SelectOption::labelled("A")]),
        ]);
        assert_eq!(group.open_widget(), None);

        group.toggle("industry");
        assert_eq!(group.open_widget(), Some("industry"));

        group.toggle("services");
        assert_eq!(group.open_widget(), Some("services"));
        assert!(!group.get("industry").is_some_and(MultiSelect::is_open));

        group.toggle("services");
        assert_eq!(group.open_widget(), None);

        group.toggle("industry");
        group.close_except("industry");
        assert_eq!(group.open_widget(), Some("industry"));
        group.close_all();
        assert_eq!(group.open_widget(), None);
    }

    #[test]
    fn test_page_click_then_toggle_button() {
        let mut group = DropdownGroup::new(vec![
            industries(),
            MultiSelect::new("services", "Pick", false, vec![SelectOption::labelled("A")]),
        ]);

        // open, then click its own button again: page click first, toggle second
        group.toggle("industry");
        assert!(!group.click_closes(Some("industry")));
        group.on_click(Some("industry"));
        group.toggle("industry");
        assert_eq!(group.open_widget(), None);

        // ticking options keeps the widget open
        group.toggle("industry");
        group.on_click(Some("industry"));
        group.set_selected("industry", "Finance", true);
        group.on_click(Some("industry"));
        group.set_selected("industry", "Retail", true);
        assert_eq!(group.open_widget(), Some("industry"));

        // another widget's button swaps which one is open
        assert!(group.click_closes(Some("services")));
        group.on_click(Some("services"));
        group.toggle("services");
        assert_eq!(group.open_widget(), Some("services"));

        // anywhere else closes it
        assert!(group.click_closes(None));
        group.on_click(None);
        assert_eq!(group.open_widget(), None);
        assert!(!group.click_closes(None));
    }

    #[test]
    fn test_group_serialized_values() {
        let mut group = DropdownGroup::new(vec![
            industries(),
            MultiSelect::new("services", "Pick", false, ["X", "Y"].into_iter().map(SelectOption::labelled)),
        ]);
        assert!(group.set_selected("services", "X", true));
        assert!(group.set_selected("services", "Y", true));
        assert!(!group.set_selected("missing", "X", true));
        assert_eq!(
            group.serialized_values(","),
            vec![
                ("industry".to_string(), String::new()),
                ("services".to_string(), "X,Y".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_spec_defaults_value_to_label() {
        let spec: SelectSpec = serde_json::from_str(
            r#"{ "name": "s", "placeholder": "Pick", "options": [{ "label": "B" }, { "label": "A", "value": "a" }] }"#,
        )
        .unwrap();
        let select = MultiSelect::from_spec(&spec);
        assert_eq!(select.options()[0], SelectOption::new("A", "a"));
        assert_eq!(select.options()[1], SelectOption::new("B", "B"));
        assert!(!select.required());
    }
}
