/// A listing plan resolved from the fixed duration/price table.
///
/// Prices are server-resolved; callers only choose a duration. Unknown
/// durations fall back to the basic tier price.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanQuote {
    pub name: &'static str,
    pub duration_days: i32,
    pub price: i64,
    pub is_featured: bool,
}

const BASIC_PRICE: i64 = 499;

impl PlanQuote {
    pub fn for_duration(duration_days: i32) -> Self {
        let (name, price) = match duration_days {
            7 => ("Basic", BASIC_PRICE),
            15 => ("Standard", 899),
            30 => ("Premium", 1499),
            _ => ("Custom", BASIC_PRICE),
        };

        Self {
            name,
            duration_days,
            price,
            is_featured: duration_days > 7,
        }
    }
}
