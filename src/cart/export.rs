//! Export renderer: turns the cart snapshot and the aggregated totals into
//! an XLSX workbook with fixed column headers.

use super::aggregate::AggregatedIngredient;
use super::xlsx::{write_workbook, Cell, Sheet, XlsxError};
use super::CartRecipe;

/// Shape of the "Recipes" sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// One row per recipe with its descriptive columns.
    Flat,
    /// A header block per recipe followed by its indexed ingredient rows.
    Detailed,
}

pub const SHOPPING_LIST_FILENAME: &str = "shopping-list.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const TOTALS_HEADER: [&str; 3] = ["Ingredient", "Unit", "Amount"];
const FLAT_HEADER: [&str; 4] = ["Name", "Author", "Description", "Cooking time (min)"];
const DETAILED_HEADER: [&str; 4] = ["#", "Ingredient", "Unit", "Amount"];

fn header_row(titles: &[&str]) -> Vec<Cell> {
    titles.iter().map(|t| Cell::text(*t)).collect()
}

/// "Shopping list" sheet rows: fixed header, then one row per aggregated
/// ingredient. Empty totals yield the header row only.
pub fn totals_rows(totals: &[AggregatedIngredient]) -> Vec<Vec<Cell>> {
    let mut rows = vec![header_row(&TOTALS_HEADER)];
    for entry in totals {
        rows.push(vec![
            Cell::text(&entry.name),
            Cell::text(&entry.unit),
            Cell::Int(entry.total as i64),
        ]);
    }
    rows
}

/// Flat-mode "Recipes" sheet rows: one row per recipe.
pub fn flat_rows(recipes: &[CartRecipe]) -> Vec<Vec<Cell>> {
    let mut rows = vec![header_row(&FLAT_HEADER)];
    for recipe in recipes {
        rows.push(vec![
            Cell::text(&recipe.name),
            Cell::text(&recipe.author),
            Cell::text(&recipe.description),
            Cell::Int(recipe.cooking_time_minutes as i64),
        ]);
    }
    rows
}

/// Detailed-mode "Recipes" sheet rows: the fixed column header, then per
/// recipe a header block row (recipe name and author) followed by one row
/// per ingredient line item. The index column is 1-based and restarts for
/// every recipe.
pub fn detailed_rows(recipes: &[CartRecipe]) -> Vec<Vec<Cell>> {
    let mut rows = vec![header_row(&DETAILED_HEADER)];
    for recipe in recipes {
        rows.push(vec![
            Cell::text(&recipe.name),
            Cell::text(format!("by {}", recipe.author)),
        ]);
        for (i, line) in recipe.lines.iter().enumerate() {
            rows.push(vec![
                Cell::Int(i as i64 + 1),
                Cell::text(&line.ingredient),
                Cell::text(&line.unit),
                Cell::Int(line.amount as i64),
            ]);
        }
    }
    rows
}

/// Render the exportable workbook: a "Shopping list" sheet with the
/// aggregated totals plus a "Recipes" sheet in the requested mode. Never
/// fails on empty input; empty sheets carry only their header row.
pub fn render_workbook(
    recipes: &[CartRecipe],
    totals: &[AggregatedIngredient],
    mode: ExportMode,
) -> Result<Vec<u8>, XlsxError> {
    let recipe_rows = match mode {
        ExportMode::Flat => flat_rows(recipes),
        ExportMode::Detailed => detailed_rows(recipes),
    };

    let sheets = [
        Sheet::new("Shopping list", totals_rows(totals)),
        Sheet::new("Recipes", recipe_rows),
    ];

    write_workbook(&sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use uuid::Uuid;

    fn sample_recipe(name: &str, lines: Vec<CartLine>) -> CartRecipe {
        CartRecipe {
            id: Uuid::new_v4(),
            name: name.to_string(),
            author: "alice".to_string(),
            description: "A test recipe".to_string(),
            cooking_time_minutes: 45,
            lines,
        }
    }

    fn line(ingredient: &str, unit: &str, amount: u32) -> CartLine {
        CartLine {
            ingredient: ingredient.to_string(),
            unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn flat_mode_has_one_row_per_recipe_after_header() {
        let recipes = vec![
            sample_recipe("Pancakes", vec![]),
            sample_recipe("Omelette", vec![]),
        ];

        let rows = flat_rows(&recipes);

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            vec![
                Cell::text("Name"),
                Cell::text("Author"),
                Cell::text("Description"),
                Cell::text("Cooking time (min)"),
            ]
        );
        assert_eq!(rows[1][0], Cell::text("Pancakes"));
        assert_eq!(rows[2][0], Cell::text("Omelette"));
        assert_eq!(rows[1][3], Cell::Int(45));
    }

    #[test]
    fn detailed_mode_indexes_restart_per_recipe() {
        let recipes = vec![
            sample_recipe("Pancakes", vec![line("Flour", "g", 200), line("Egg", "pcs", 2)]),
            sample_recipe("Tea", vec![line("Sugar", "g", 10)]),
        ];

        let rows = detailed_rows(&recipes);

        // header, block, 2 lines, block, 1 line
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0][0], Cell::text("#"));
        assert_eq!(rows[1][0], Cell::text("Pancakes"));
        assert_eq!(rows[2][0], Cell::Int(1));
        assert_eq!(rows[3][0], Cell::Int(2));
        assert_eq!(rows[4][0], Cell::text("Tea"));
        // 1-based index restarts for the second recipe
        assert_eq!(rows[5][0], Cell::Int(1));
        assert_eq!(rows[5][1], Cell::text("Sugar"));
    }

    #[test]
    fn empty_cart_renders_header_only_sheets() {
        for mode in [ExportMode::Flat, ExportMode::Detailed] {
            let bytes = render_workbook(&[], &[], mode).unwrap();
            assert_eq!(&bytes[..2], b"PK");
        }

        assert_eq!(flat_rows(&[]).len(), 1);
        assert_eq!(detailed_rows(&[]).len(), 1);
        assert_eq!(totals_rows(&[]).len(), 1);
    }

    #[test]
    fn totals_sheet_lists_aggregated_entries_in_order() {
        let totals = vec![
            AggregatedIngredient {
                name: "Egg".to_string(),
                unit: "pcs".to_string(),
                total: 2,
            },
            AggregatedIngredient {
                name: "Flour".to_string(),
                unit: "g".to_string(),
                total: 300,
            },
        ];

        let rows = totals_rows(&totals);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![Cell::text("Egg"), Cell::text("pcs"), Cell::Int(2)]);
        assert_eq!(
            rows[2],
            vec![Cell::text("Flour"), Cell::text("g"), Cell::Int(300)]
        );
    }
}
