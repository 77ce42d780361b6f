use crate::{model::StructuredQuery, synth::FilterRenderer, Config};

/// Renders a [`StructuredQuery`] as SQL, one clause per line, in the fixed
/// order: name comment, SELECT, FROM, JOINs, WHERE, GROUP BY, HAVING,
/// ORDER BY, LIMIT.
pub struct SqlSynthesizer<'a> {
    config: &'a Config,
}

impl<'a> SqlSynthesizer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn render(&self, query: &StructuredQuery) -> String {
        let mut lines: Vec<String> = vec![];

        let name = query.query_name.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.config.name_comment && !name.is_empty() {
            lines.push(format!("-- {}", name));
        }

        lines.push(Self::select_line(query));

        if let Some(from) = &query.from {
            lines.push(format!("FROM {}", from.sql()));
        }

        lines.extend(query.joins.iter().map(|join| join.sql()));

        let where_body = FilterRenderer::render(query.where_filters());
        if !where_body.is_empty() {
            lines.push(format!("WHERE {}", where_body));
        }

        if !query.group_by.is_empty() {
            lines.push(format!("GROUP BY {}", query.group_by.join(", ")));
        }

        let having_body = FilterRenderer::render(query.having_filters());
        if !having_body.is_empty() {
            lines.push(format!("HAVING {}", having_body));
        }

        if !query.sort.is_empty() {
            let sort = query
                .sort
                .iter()
                .map(|sort| format!("{} {}", sort.field_name, sort.direction.sql()))
                .collect::<Vec<_>>();
            lines.push(format!("ORDER BY {}", sort.join(", ")));
        }

        if let Some(pager) = &query.pager {
            match pager.offset() {
                0 => lines.push(format!("LIMIT {}", pager.page_size)),
                offset => lines.push(format!("LIMIT {} OFFSET {}", pager.page_size, offset)),
            }
        }

        lines.join("\n")
    }

    fn select_line(query: &StructuredQuery) -> String {
        let mut line = String::from("SELECT");
        if query.distinct {
            line.push_str(" DISTINCT");
        }
        if let Some(top) = query.top {
            line.push_str(&format!(" TOP {}", top));
        }

        let entries = query.select_entries();
        match entries.is_empty() {
            true => line.push_str(" *"),
            false => {
                line.push(' ');
                line.push_str(&entries.join(", "));
            }
        }

        line
    }
}
