use crate::parser::Splitter;

pub struct GroupByParser;

impl GroupByParser {
    pub fn parse(text: &str) -> Vec<String> {
        Splitter::split_commas(text)
    }
}
