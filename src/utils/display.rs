use colored::Colorize;
use prettytable::{format, Cell, Row, Table};

use crate::models::quote::Quote;
use crate::models::watchlist::{Watchlist, WatchlistView};

pub struct DisplayFormatter;

impl DisplayFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_header(&self, text: &str) -> String {
        format!("\n=== {} ===", text.bright_white().bold())
    }

    pub fn format_table(&self, headers: &[&str], rows: &[Vec<String>]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

        table.add_row(Row::new(
            headers.iter().map(|h| Cell::new(h).style_spec("b")).collect(),
        ));

        for row in rows {
            table.add_row(Row::new(row.iter().map(|cell| Cell::new(cell)).collect()));
        }

        table.to_string()
    }

    pub fn format_change(&self, change: f64, percent_change: f64) -> String {
        let sign = if change >= 0.0 { "+" } else { "" };
        let text = format!("{}{:.2} ({}{:.2}%)", sign, change, sign, percent_change);
        if change >= 0.0 {
            text.green().to_string()
        } else {
            text.red().to_string()
        }
    }

    pub fn format_currency(&self, amount: f64) -> String {
        if amount >= 1.0 {
            format!("${:.2}", amount)
        } else {
            format!("${:.4}", amount)
        }
    }

    pub fn format_quote(&self, quote: &Quote) -> String {
        let mut output = Vec::new();
        output.push(self.format_header(&quote.symbol));
        output.push(format!("Price: {}", self.format_currency(quote.price)));
        output.push(format!("Change: {}", self.format_change(quote.change, quote.percent_change)));
        if let Some(logo) = &quote.logo_url {
            output.push(format!("Logo: {}", logo));
        }

        output.join("\n")
    }

    pub fn format_watchlist(&self, view: &WatchlistView) -> String {
        let rows: Vec<Vec<String>> = view
            .items
            .iter()
            .map(|item| match &item.quote {
                Some(quote) => vec![
                    item.symbol.clone(),
                    self.format_currency(quote.price),
                    self.format_change(quote.change, quote.percent_change),
                ],
                None => vec![item.symbol.clone(), "no data".to_string(), String::new()],
            })
            .collect();

        format!(
            "{}\n{}",
            self.format_header(&view.watchlist.name),
            self.format_table(&["Symbol", "Price", "Change"], &rows)
        )
    }

    pub fn format_watchlists(&self, watchlists: &[Watchlist]) -> String {
        let rows: Vec<Vec<String>> = watchlists
            .iter()
            .map(|w| vec![w.id.clone(), w.name.clone(), w.symbols.len().to_string()])
            .collect();
        self.format_table(&["Id", "Name", "Symbols"], &rows)
    }
}

impl Default for DisplayFormatter {
    fn default() -> Self {
        Self::new()
    }
}
