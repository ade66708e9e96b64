//! Admin product table: status filter, column sort and bulk selection.

use crate::Product;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Currency prefix stripped from price cells before parsing.
const PRICE_PREFIX: &str = "R$ ";

/// Column a sort trigger projects rows onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Name,
    Price,
    Date,
    /// Any key the table does not know how to project. Sorting by it is a no-op.
    Unknown,
}

impl SortColumn {
    /// Parses the key carried by a sort trigger (`name`, `price`, `date`).
    pub fn from_key(key: &str) -> Self {
        match key {
            "name" => Self::Name,
            "price" => Self::Price,
            "date" => Self::Date,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One rendered table row.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: u32,
    pub name: String,
    /// Price cell text, e.g. "R$ 12.50"
    pub price_display: String,
    pub date: String,
    pub status: String,
    pub visible: bool,
    pub selected: bool,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price_display: product.price_display(),
            date: product.created.clone(),
            status: product.status.clone(),
            visible: true,
            selected: false,
        }
    }
}

impl ProductRow {
    /// Parsed price cell; NaN when the text is not a number.
    pub fn price_value(&self) -> f64 {
        let text = self.price_display.trim();
        text.strip_prefix(PRICE_PREFIX)
            .unwrap_or(text)
            .trim()
            .parse()
            .unwrap_or(f64::NAN)
    }
}

/// View state of the admin product table.
#[derive(Debug, Default)]
pub struct ProductTable {
    rows: Vec<ProductRow>,
    /// Current value of the status filter; empty means "all"
    pub status_filter: String,
    /// Last direction applied per sort trigger
    directions: HashMap<SortColumn, SortDirection>,
}

impl ProductTable {
    pub fn new(rows: Vec<ProductRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn from_products(products: &[Product]) -> Self {
        Self::new(products.iter().map(ProductRow::from).collect())
    }

    pub fn rows(&self) -> &[ProductRow] {
        &self.rows
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &ProductRow> {
        self.rows.iter().filter(|row| row.visible)
    }

    /// Distinct statuses present in the table, in first-seen order.
    pub fn statuses(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.status) {
                seen.push(row.status.clone());
            }
        }
        seen
    }

    /// Shows exactly the rows whose status equals `value`; an empty value shows every row.
    pub fn filter_by_status(&mut self, value: &str) {
        self.status_filter = value.to_owned();
        for row in &mut self.rows {
            row.visible = value.is_empty() || row.status == value;
        }
    }

    pub fn count_label(&self) -> String {
        format!(
            "{} de {} produtos",
            self.visible_rows().count(),
            self.rows.len()
        )
    }

    /// Direction the trigger for `column` last applied, if it was pressed before.
    pub fn direction(&self, column: SortColumn) -> Option<SortDirection> {
        self.directions.get(&column).copied()
    }

    /// Handles a press on a sort trigger: flips its stored direction and sorts.
    pub fn toggle_sort(&mut self, key: &str) -> SortDirection {
        let column = SortColumn::from_key(key);
        let direction = match self.directions.get(&column) {
            Some(SortDirection::Asc) => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        self.directions.insert(column, direction);
        self.sort(column, direction);
        direction
    }

    pub fn sort(&mut self, column: SortColumn, direction: SortDirection) {
        if column == SortColumn::Unknown {
            return;
        }
        self.rows.sort_unstable_by(|a, b| {
            let ordering = compare_rows(a, b, column);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        for row in &mut self.rows {
            row.selected = selected;
        }
    }

    pub fn set_selected(&mut self, id: u32, selected: bool) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
            row.selected = selected;
        }
    }

    pub fn selected_ids(&self) -> Vec<u32> {
        self.rows
            .iter()
            .filter(|row| row.selected)
            .map(|row| row.id)
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|row| row.selected).count()
    }

    pub fn all_selected(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|row| row.selected)
    }

    pub fn bulk_actions_visible(&self) -> bool {
        self.selected_count() > 0
    }

    /// Drops rows by id (e.g. after a confirmed delete).
    pub fn remove(&mut self, ids: &[u32]) {
        self.rows.retain(|row| !ids.contains(&row.id));
    }

    pub fn set_status(&mut self, id: u32, status: &str) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
            row.status = status.to_owned();
        }
        let filter = self.status_filter.clone();
        self.filter_by_status(&filter);
    }
}

fn compare_rows(a: &ProductRow, b: &ProductRow, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Name => a.name.cmp(&b.name),
        SortColumn::Price => a
            .price_value()
            .partial_cmp(&b.price_value())
            .unwrap_or(Ordering::Equal),
        SortColumn::Date => a.date.cmp(&b.date),
        SortColumn::Unknown => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u32, name: &str, price: &str, date: &str, status: &str) -> ProductRow {
        ProductRow {
            id,
            name: name.to_owned(),
            price_display: price.to_owned(),
            date: date.to_owned(),
            status: status.to_owned(),
            visible: true,
            selected: false,
        }
    }

    fn sample() -> ProductTable {
        ProductTable::new(vec![
            row(1, "Torta de Limão", "R$ 45.00", "2024-03-02", "ativo"),
            row(2, "Bolo de Cenoura", "R$ 9.90", "2024-01-15", "inativo"),
            row(3, "Brigadeiro", "R$ 120.50", "2024-02-20", "ativo"),
            row(4, "Pão de Mel", "R$ 15.00", "2023-12-01", "esgotado"),
        ])
    }

    fn visible_ids(table: &ProductTable) -> Vec<u32> {
        table.visible_rows().map(|r| r.id).collect()
    }

    #[test]
    fn filter_shows_only_matching_status() {
        let mut table = sample();
        table.filter_by_status("ativo");
        assert_eq!(visible_ids(&table), vec![1, 3]);
        assert_eq!(table.count_label(), "2 de 4 produtos");
    }

    #[test]
    fn empty_filter_shows_everything() {
        let mut table = sample();
        table.filter_by_status("inativo");
        table.filter_by_status("");
        assert_eq!(visible_ids(&table), vec![1, 2, 3, 4]);
    }

    #[test]
    fn price_sort_is_numeric_and_toggles() {
        let mut table = sample();
        assert_eq!(table.toggle_sort("price"), SortDirection::Asc);
        let prices: Vec<f64> = table.rows().iter().map(ProductRow::price_value).collect();
        assert!(prices.windows(2).all(|w| w[0] <= w[1]), "{prices:?}");
        assert_eq!(prices[0], 9.90);

        assert_eq!(table.toggle_sort("price"), SortDirection::Desc);
        let ids: Vec<u32> = table.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 4, 2]);
    }

    #[test]
    fn name_and_date_sort_lexicographically() {
        let mut table = sample();
        table.sort(SortColumn::Name, SortDirection::Asc);
        assert_eq!(table.rows()[0].name, "Bolo de Cenoura");

        table.sort(SortColumn::Date, SortDirection::Desc);
        assert_eq!(table.rows()[0].date, "2024-03-02");
        assert_eq!(table.rows()[3].date, "2023-12-01");
    }

    #[test]
    fn unknown_column_keeps_order() {
        let mut table = sample();
        table.toggle_sort("sku");
        let ids: Vec<u32> = table.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(SortColumn::from_key("sku"), SortColumn::Unknown);
    }

    #[test]
    fn bulk_selection_tracks_count() {
        let mut table = sample();
        assert!(!table.bulk_actions_visible());

        table.set_all_selected(true);
        assert_eq!(table.selected_count(), 4);
        assert!(table.all_selected());

        table.set_selected(2, false);
        assert_eq!(table.selected_ids(), vec![1, 3, 4]);
        assert!(table.bulk_actions_visible());

        table.remove(&table.selected_ids());
        assert_eq!(table.rows().len(), 1);
        assert!(!table.bulk_actions_visible());
    }

    #[test]
    fn status_change_reapplies_filter() {
        let mut table = sample();
        table.filter_by_status("ativo");
        table.set_status(1, "inativo");
        assert_eq!(visible_ids(&table), vec![3]);
    }
}
