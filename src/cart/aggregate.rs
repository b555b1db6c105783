//! Ingredient aggregation: dedupe and sum line items across all recipes in a
//! cart, grouped by (ingredient name, measurement unit).

use std::collections::BTreeMap;
use std::fmt;

use super::CartLine;

/// One deduplicated ingredient with the summed amount across the whole cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedIngredient {
    pub name: String,
    pub unit: String,
    pub total: u32,
}

impl AggregatedIngredient {
    /// View the aggregated entry as a plain cart line again.
    pub fn to_line(&self) -> CartLine {
        CartLine {
            ingredient: self.name.clone(),
            unit: self.unit.clone(),
            amount: self.total,
        }
    }
}

/// A summed amount would exceed the `u32` ceiling. Amounts are bounded per
/// line item, so this only fires on absurdly large carts; refusing beats
/// silently saturating the exported total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountOverflow {
    pub name: String,
    pub unit: String,
}

impl fmt::Display for AmountOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total amount for \"{}\" ({}) exceeds the supported maximum",
            self.name, self.unit
        )
    }
}

impl std::error::Error for AmountOverflow {}

/// Group line items by (ingredient name, measurement unit) and sum amounts.
///
/// Grouping is by name and unit rather than ingredient identity: catalog
/// drift could put the same name under two units, and those must not be
/// summed together. Duplicate occurrences of an ingredient within a single
/// recipe are summed like any other pair of lines.
///
/// Output is ordered by ingredient name ascending (case-sensitive), ties
/// broken by measurement unit, so repeated exports of the same cart are
/// byte-identical.
pub fn aggregate<'a, I>(lines: I) -> Result<Vec<AggregatedIngredient>, AmountOverflow>
where
    I: IntoIterator<Item = &'a CartLine>,
{
    let mut totals: BTreeMap<(String, String), u32> = BTreeMap::new();

    for line in lines {
        let key = (line.ingredient.clone(), line.unit.clone());
        let entry = totals.entry(key).or_insert(0);
        *entry = entry.checked_add(line.amount).ok_or_else(|| AmountOverflow {
            name: line.ingredient.clone(),
            unit: line.unit.clone(),
        })?;
    }

    Ok(totals
        .into_iter()
        .map(|((name, unit), total)| AggregatedIngredient { name, unit, total })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ingredient: &str, unit: &str, amount: u32) -> CartLine {
        CartLine {
            ingredient: ingredient.to_string(),
            unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn sums_across_recipes_and_sorts_by_name() {
        // Recipe A: Flour 200g, Sugar 50g; Recipe B: Flour 100g, Egg 2pcs
        let lines = vec![
            line("Flour", "g", 200),
            line("Sugar", "g", 50),
            line("Flour", "g", 100),
            line("Egg", "pcs", 2),
        ];

        let aggregated = aggregate(&lines).unwrap();

        assert_eq!(
            aggregated,
            vec![
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
                AggregatedIngredient {
                    name: "Sugar".to_string(),
                    unit: "g".to_string(),
                    total: 50,
                },
            ]
        );
    }

    #[test]
    fn same_name_different_unit_stays_separate() {
        let lines = vec![line("Milk", "ml", 250), line("Milk", "g", 30)];

        let aggregated = aggregate(&lines).unwrap();

        assert_eq!(aggregated.len(), 2);
        // Ties on name break by unit ascending
        assert_eq!(aggregated[0].unit, "g");
        assert_eq!(aggregated[1].unit, "ml");
    }

    #[test]
    fn duplicate_ingredient_within_one_recipe_is_summed() {
        // e.g. "sugar for the dough" and "sugar for the glaze" as two lines
        let lines = vec![line("Sugar", "g", 40), line("Sugar", "g", 10)];

        let aggregated = aggregate(&lines).unwrap();

        assert_eq!(aggregated.len(), 1);
        assert_eq!(aggregated[0].total, 50);
    }

    #[test]
    fn conservation_no_line_lost_or_double_counted() {
        let lines = vec![
            line("a", "g", 7),
            line("b", "g", 11),
            line("a", "g", 13),
            line("c", "ml", 17),
            line("b", "kg", 19),
        ];

        let aggregated = aggregate(&lines).unwrap();

        let input_sum: u64 = lines.iter().map(|l| l.amount as u64).sum();
        let output_sum: u64 = aggregated.iter().map(|a| a.total as u64).sum();
        assert_eq!(input_sum, output_sum);
    }

    #[test]
    fn idempotent_over_its_own_output() {
        let lines = vec![
            line("Flour", "g", 200),
            line("Sugar", "g", 50),
            line("Flour", "g", 100),
            line("Egg", "pcs", 2),
        ];

        let once = aggregate(&lines).unwrap();
        let relined: Vec<CartLine> = once.iter().map(AggregatedIngredient::to_line).collect();
        let twice = aggregate(&relined).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn deterministic_across_runs() {
        let lines = vec![
            line("b", "g", 1),
            line("a", "g", 2),
            line("c", "g", 3),
            line("a", "ml", 4),
        ];

        let first = aggregate(&lines).unwrap();
        let second = aggregate(&lines).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn ordering_is_case_sensitive() {
        // Byte order: uppercase sorts before lowercase
        let lines = vec![line("apple", "g", 1), line("Banana", "g", 1)];

        let aggregated = aggregate(&lines).unwrap();
        assert_eq!(aggregated[0].name, "Banana");
        assert_eq!(aggregated[1].name, "apple");
    }

    #[test]
    fn refuses_u32_overflow() {
        let lines = vec![line("Flour", "g", u32::MAX), line("Flour", "g", 1)];

        let err = aggregate(&lines).unwrap_err();
        assert_eq!(err.name, "Flour");
        assert_eq!(err.unit, "g");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let empty: Vec<CartLine> = Vec::new();
        let aggregated = aggregate(&empty).unwrap();
        assert!(aggregated.is_empty());
    }
}
