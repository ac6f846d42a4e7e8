//! Projection of model flags back onto every table row.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Label {
    #[default]
    Normal,
    Flagged,
}

impl Label {
    /// Sheet text for this label: the flag text or an empty string.
    pub fn render<'a>(&self, flag_text: &'a str) -> &'a str {
        match self {
            Label::Flagged => flag_text,
            Label::Normal => "",
        }
    }
}

/// One label per table row. `rows[i]` receives `flags[i]`; every other
/// row stays `Normal`. Row indices outside `0..row_count` are ignored.
pub fn project(row_count: usize, rows: &[usize], flags: &[bool]) -> Vec<Label> {
    let mut labels = vec![Label::Normal; row_count];
    for (&row, &flagged) in rows.iter().zip(flags) {
        if flagged {
            if let Some(slot) = labels.get_mut(row) {
                *slot = Label::Flagged;
            }
        }
    }
    labels
}

pub fn render_all(labels: &[Label], flag_text: &str) -> Vec<String> {
    labels.iter().map(|l| l.render(flag_text).to_string()).collect()
}
