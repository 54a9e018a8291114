// src/handlers/choices.rs

/// The option rows of the multiple choice editor.
///
/// Rows are an ordered list of option texts; element ids and "Option N:"
/// labels are derived from the position at render time, so numbering is
/// always contiguous and 1-based. After every edit the list ends with
/// exactly one blank row: typing into it appends a fresh one, and emptying or
/// removing rows at the end collapses the tail back to a single blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRows {
    rows: Vec<String>,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRowView {
    pub ordinal: usize,
    pub row_id: String,
    pub input_id: String,
    pub button_id: String,
    pub label: String,
    pub value: String,
}

impl Default for ChoiceRows {
    fn default() -> Self {
        Self::new()
    }
}

impl ChoiceRows {
    /// A single blank row.
    pub fn new() -> Self {
        Self {
            rows: vec![String::new()],
        }
    }

    /// Rows for an existing question's options, followed by a blank row.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut choices = Self {
            rows: values.into_iter().map(Into::into).collect(),
        };
        choices.keep_one_trailing_blank();
        choices
    }

    pub fn values(&self) -> &[String] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(String::is_empty)
    }

    /// Text typed into row `ordinal` (1-based). Out of range is ignored.
    pub fn input(&mut self, ordinal: usize, text: &str) {
        let Some(row) = ordinal.checked_sub(1).and_then(|i| self.rows.get_mut(i)) else {
            return;
        };
        *row = text.to_string();
        self.keep_one_trailing_blank();
    }

    /// Removes row `ordinal` (1-based). Later rows move up one position.
    /// Removing the only row clears it instead.
    pub fn remove(&mut self, ordinal: usize) {
        let Some(index) = ordinal.checked_sub(1).filter(|i| *i < self.rows.len()) else {
            return;
        };
        self.rows.remove(index);
        self.keep_one_trailing_blank();
    }

    /// Back to a single blank row.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.rows.push(String::new());
    }

    // Drops surplus blank rows at the end, then makes sure one is left.
    fn keep_one_trailing_blank(&mut self) {
        while self.rows.len() > 1 && self.rows[self.rows.len() - 2].is_empty() {
            match self.rows.last() {
                Some(last) if last.is_empty() => {
                    self.rows.pop();
                }
                _ => break,
            }
        }
        if self.rows.last().is_none_or(|last| !last.is_empty()) {
            self.rows.push(String::new());
        }
    }

    pub fn render(&self) -> Vec<ChoiceRowView> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let n = i + 1;
                ChoiceRowView {
                    ordinal: n,
                    row_id: format!("mcq-option-{}", n),
                    input_id: format!("mcq-inp-{}", n),
                    button_id: format!("mcq-btn-{}", n),
                    label: format!("Option {}:", n),
                    value: value.clone(),
                }
            })
            .collect()
    }
}

/// Row ordinal from an element id such as `mcq-inp-3` or `mcq-btn-3`.
pub fn ordinal_from_element_id(id: &str) -> Option<usize> {
    id.strip_prefix("mcq-inp-")
        .or_else(|| id.strip_prefix("mcq-btn-"))
        .and_then(|n| n.parse().ok())
        .filter(|n| *n > 0)
}
