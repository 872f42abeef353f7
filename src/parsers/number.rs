/// Thousands-separator conventions of the two data sources.
///
/// The website renders `1.234.567` while the CSV extracts use `1,234,567`.
/// They stay separate: a `.` in a CSV cell is not a separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    Html,
    Csv,
}

impl NumberFormat {
    pub fn separator(self) -> char {
        match self {
            NumberFormat::Html => '.',
            NumberFormat::Csv => ',',
        }
    }

    /// Parses `value` as an integer; anything unparseable (`""`, `"-"`,
    /// `"nd"`) becomes `0`.
    pub fn parse(self, value: &str) -> i64 {
        value
            .replace(self.separator(), "")
            .trim()
            .parse::<i64>()
            .unwrap_or(0)
    }
}

pub fn parse_html_number(value: &str) -> i64 {
    NumberFormat::Html.parse(value)
}

pub fn parse_csv_number(value: &str) -> i64 {
    NumberFormat::Csv.parse(value)
}
