use crate::{
    model::{SortDirection, SortField},
    parser::Splitter,
};

pub struct OrderByParser;

impl OrderByParser {
    /// `field [ASC|DESC]` entries; the direction defaults to ascending.
    pub fn parse(text: &str) -> Vec<SortField> {
        Splitter::split_commas(text)
            .into_iter()
            .map(|entry| match entry.rsplit_once(char::is_whitespace) {
                Some((field, direction)) => match SortDirection::parse(direction) {
                    Some(direction) => SortField::new(field.trim(), direction),
                    None => SortField::new(entry.as_str(), SortDirection::Asc),
                },
                None => SortField::new(entry.as_str(), SortDirection::Asc),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{SortDirection, SortField},
        parser::ast::OrderByParser,
    };

    #[test]
    pub fn test_order_by() {
        let sort = OrderByParser::parse("Name ASC, e.Salary desc, COALESCE(a, b)");

        assert_eq!(sort, vec![
            SortField::new("Name", SortDirection::Asc),
            SortField::new("e.Salary", SortDirection::Desc),
            SortField::new("COALESCE(a, b)", SortDirection::Asc),
        ]);
    }
}
