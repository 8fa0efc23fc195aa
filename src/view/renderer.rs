use super::view_model::ViewModel;
use crossterm::queue;
use crossterm::style::{Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 8;

/// Terminal column width of `text`, expanding tabs from column 0.
pub fn display_width(text: &str) -> usize {
    text.chars().fold(0, |column, ch| match ch {
        '\t' => column + TAB_WIDTH - (column % TAB_WIDTH),
        _ => column + ch.width().unwrap_or(0),
    })
}

/// Prints the visible text of a document, one line per visible line, with a
/// caret under the cursor.
pub struct View {
    show_line_numbers: bool,
    use_color: bool,
}

impl View {
    pub fn new() -> Self {
        Self {
            show_line_numbers: true,
            use_color: false,
        }
    }

    pub fn set_line_numbers(&mut self, show: bool) {
        self.show_line_numbers = show;
    }

    pub fn line_numbers(&self) -> bool {
        self.show_line_numbers
    }

    pub fn set_use_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub fn render<W: Write>(&self, out: &mut W, model: &dyn ViewModel) -> io::Result<()> {
        let text = model.visible_text();
        let cursor = model.cursor_position();
        let filtered = model.is_filtered();
        let lines: Vec<&str> = text.split('\n').collect();

        // At least three digits, like "001"
        let number_width = lines.len().to_string().len().max(3);
        let gutter = if self.show_line_numbers { number_width + 1 } else { 0 };

        if self.use_color {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        write!(out, "-- {} --", model.title())?;
        if self.use_color {
            queue!(out, SetAttribute(Attribute::Reset))?;
        }
        writeln!(out)?;

        for (index, line) in lines.iter().enumerate() {
            if self.show_line_numbers {
                write!(out, "{:>width$} ", index + 1, width = number_width)?;
            }

            if filtered && self.use_color {
                queue!(
                    out,
                    SetBackgroundColor(Color::Yellow),
                    SetForegroundColor(Color::Black)
                )?;
                write!(out, "{}", line)?;
                queue!(out, ResetColor)?;
            } else {
                write!(out, "{}", line)?;
            }
            writeln!(out)?;

            if index == cursor.line {
                let before_cursor: String = line.chars().take(cursor.column).collect();
                let padding = gutter + display_width(&before_cursor);
                writeln!(out, "{}^", " ".repeat(padding))?;
            }
        }

        out.flush()
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}
