//! Aggregates a user's transaction rows into per-category net totals.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::transaction::{TransactionType, parse_amount};

/// The net amount of money that moved through a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category label.
    pub category: String,
    /// The absolute difference between the category's total credits and total debits.
    ///
    /// Always zero or positive: the direction of the net flow is not reported.
    pub amount: f64,
}

#[derive(Debug, Default)]
struct Sums {
    credit: f64,
    debit: f64,
}

/// Compute the net total of each category from the category, amount and type columns of a
/// user's sheet.
///
/// The three columns are matched up by row index. A row is skipped if its category is empty, or
/// its amount is not a number or is zero. A row whose type is neither `"Credit"` nor `"Debit"`
/// still registers its category but adds nothing to its totals.
///
/// `amounts` and `types` may be shorter than `categories`, which happens when the spreadsheet
/// omits trailing empty cells: a missing amount is treated as invalid and a missing type as
/// unrecognized.
///
/// Totals are returned in the order each category first appears.
pub fn aggregate_category_totals<C, A, T>(
    categories: &[C],
    amounts: &[A],
    types: &[T],
) -> Vec<CategoryTotal>
where
    C: AsRef<str>,
    A: AsRef<str>,
    T: AsRef<str>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, Sums> = HashMap::new();

    for (i, category) in categories.iter().enumerate() {
        let category = category.as_ref();
        let amount = amounts.get(i).and_then(|amount| parse_amount(amount.as_ref()));

        let amount = match amount {
            Some(amount) if !category.is_empty() && amount != 0.0 => amount,
            _ => continue,
        };

        let entry = sums.entry(category).or_insert_with(|| {
            order.push(category);
            Sums::default()
        });

        match types.get(i).and_then(|label| TransactionType::parse(label.as_ref())) {
            Some(TransactionType::Credit) => entry.credit += amount,
            Some(TransactionType::Debit) => entry.debit += amount,
            None => {}
        }
    }

    order
        .into_iter()
        .map(|category| {
            let Sums { credit, debit } = sums[category];

            CategoryTotal {
                category: category.to_owned(),
                amount: (credit - debit).abs(),
            }
        })
        .collect()
}

#[cfg(test)]
mod aggregate_tests {
    use super::{CategoryTotal, aggregate_category_totals};

    fn total(category: &str, amount: f64) -> CategoryTotal {
        CategoryTotal {
            category: category.to_owned(),
            amount,
        }
    }

    #[test]
    fn nets_credits_against_debits() {
        let totals = aggregate_category_totals(
            &["Food", "Food", "Rent"],
            &["50", "20", "300"],
            &["Debit", "Credit", "Debit"],
        );

        assert_eq!(totals, vec![total("Food", 30.0), total("Rent", 300.0)]);
    }

    #[test]
    fn skips_zero_and_invalid_amounts() {
        for amount in ["0", "NaN", "$5", "", "-0"] {
            let totals = aggregate_category_totals(&["X"], &[amount], &["Debit"]);

            assert!(totals.is_empty(), "want no totals for {amount:?}, got {totals:?}");
        }
    }

    #[test]
    fn skips_infinite_amounts() {
        let totals = aggregate_category_totals(
            &["A", "A", "B", "C"],
            &["inf", "inf", "1e400", "infinity"],
            &["Credit", "Debit", "Debit", "Credit"],
        );

        assert!(totals.is_empty(), "want no totals, got {totals:?}");
    }

    #[test]
    fn skips_empty_category() {
        let totals = aggregate_category_totals(&["", "Fun"], &["10", "5"], &["Debit", "Credit"]);

        assert_eq!(totals, vec![total("Fun", 5.0)]);
    }

    #[test]
    fn unknown_type_registers_category_with_zero_total() {
        let totals = aggregate_category_totals(&["Y"], &["10"], &["Unknown"]);

        assert_eq!(totals, vec![total("Y", 0.0)]);
    }

    #[test]
    fn type_labels_are_case_sensitive() {
        let totals = aggregate_category_totals(&["Y", "Y"], &["10", "4"], &["debit", "Debit"]);

        assert_eq!(totals, vec![total("Y", 4.0)]);
    }

    #[test]
    fn missing_trailing_cells_are_tolerated() {
        let totals = aggregate_category_totals(
            &["Food", "Rent", "Gym"],
            &["12", "300"],
            &["Debit"],
        );

        assert_eq!(totals, vec![total("Food", 12.0), total("Rent", 0.0)]);
    }

    #[test]
    fn negative_amounts_are_counted() {
        let totals = aggregate_category_totals(&["Refund"], &["-15"], &["Debit"]);

        assert_eq!(totals, vec![total("Refund", 15.0)]);
    }

    #[test]
    fn totals_are_never_negative_and_only_for_counted_rows() {
        let categories = ["A", "B", "", "C", "A", "D"];
        let amounts = ["5", "0", "7", "x", "-20", "3"];
        let types = ["Credit", "Debit", "Credit", "Debit", "Credit", "Debit"];

        let totals = aggregate_category_totals(&categories, &amounts, &types);

        assert!(totals.iter().all(|total| total.amount >= 0.0));
        let names: Vec<&str> = totals.iter().map(|total| total.category.as_str()).collect();
        assert_eq!(names, vec!["A", "D"]);
        assert_eq!(totals[0].amount, 15.0);
    }

    #[test]
    fn is_idempotent() {
        let categories = vec!["Food".to_string(), "Rent".to_string(), "Food".to_string()];
        let amounts = vec!["1.5".to_string(), "2".to_string(), "3".to_string()];
        let types = vec!["Debit".to_string(), "Debit".to_string(), "Credit".to_string()];

        let first = aggregate_category_totals(&categories, &amounts, &types);
        let second = aggregate_category_totals(&categories, &amounts, &types);

        assert_eq!(first, second);
    }
}
