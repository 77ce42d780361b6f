use indexmap::IndexSet;

use crate::{
    model::{QueryFilter, QueryParameter},
    parser::QueryParser,
};

pub struct ParameterParser;

impl ParameterParser {
    /// Every distinct `@name` outside quoted literals, in order of first
    /// appearance. `@@name` system variables are skipped.
    pub fn names(text: &str) -> Vec<String> {
        let mut parser = QueryParser::new(text);
        let mut names: IndexSet<String> = IndexSet::new();

        while !parser.eof() {
            if !parser.in_quote() && parser.current() == '@' && parser.previous() != '@' && parser.peek(1) != '@' {
                parser.next();
                let pivot = parser.position;
                while parser.current().is_alphanumeric() || parser.current() == '_' {
                    parser.next();
                }
                let name = parser.text_from_pivot(pivot);
                if !name.is_empty() {
                    names.insert(name);
                }
                continue;
            }
            parser.advance();
        }

        names.into_iter().collect()
    }

    /// Parameters of a statement, each mapped to the first filter whose value
    /// refers to it.
    pub fn parse(text: &str, filters: &[&QueryFilter]) -> Vec<QueryParameter> {
        Self::names(text)
            .into_iter()
            .map(|name| {
                let sigil = format!("@{name}");
                let mapping_field_name = filters
                    .iter()
                    .find(|filter| Self::refers_to(filter, &sigil))
                    .map(|filter| filter.field_name.clone())
                    .unwrap_or_else(|| name.clone());

                QueryParameter { field_name: name, is_mandatory: true, mapping_field_name }
            })
            .collect()
    }

    fn refers_to(filter: &QueryFilter, sigil: &str) -> bool {
        if !filter.is_parameter() {
            return false;
        }
        if filter.value.eq_ignore_ascii_case(sigil) {
            return true;
        }

        let mut items = filter.value.split(',').map(str::to_string).collect::<Vec<_>>();
        if let Some((low, high)) = filter.between_bounds() {
            items.push(low.to_string());
            items.push(high.to_string());
        }
        items.iter().any(|item| item.trim().eq_ignore_ascii_case(sigil))
    }
}
