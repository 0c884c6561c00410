//! Copying grid content out to the system clipboard

use crate::document::Table;

pub struct Clipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard {
    /// Clipboard access can fail on headless systems; copying then
    /// reports an error message instead of panicking.
    pub fn new() -> Self {
        Self {
            inner: arboard::Clipboard::new().ok(),
        }
    }

    pub fn copy_cell(&mut self, table: &Table, row: usize, column: &str) -> Result<String, String> {
        let content = table
            .cell(row, column)
            .map(|v| v.display())
            .unwrap_or_default();
        self.set_text(content)?;
        Ok("Cell copied".to_string())
    }

    /// The whole row in column order, quoted the way a CSV consumer
    /// expects
    pub fn copy_row(&mut self, table: &Table, row: usize) -> Result<String, String> {
        let content = table
            .columns
            .iter()
            .map(|col| {
                quote_field(
                    &table
                        .cell(row, col)
                        .map(|v| v.display())
                        .unwrap_or_default(),
                )
            })
            .collect::<Vec<String>>()
            .join(",");
        self.set_text(content)?;
        Ok("Row copied".to_string())
    }

    fn set_text(&mut self, text: String) -> Result<(), String> {
        match &mut self.inner {
            Some(clipboard) => clipboard
                .set_text(text)
                .map_err(|e| format!("Clipboard error: {e}")),
            None => Err("Clipboard unavailable".to_string()),
        }
    }
}

fn quote_field(s: &str) -> String {
    let needs_escaping = s.contains('"');
    let needs_wrapping = needs_escaping || s.contains(',') || s.contains(' ') || s.contains('\t');
    let mut out = String::from(s);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_stay_unquoted() {
        assert_eq!(quote_field("plain"), "plain");
        assert_eq!(quote_field("123"), "123");
    }

    #[test]
    fn fields_with_separators_get_wrapped() {
        assert_eq!(quote_field("a,b"), "\"a,b\"");
        assert_eq!(quote_field("two words"), "\"two words\"");
    }

    #[test]
    fn quotes_are_doubled_and_wrapped() {
        assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
