pub mod query_matcher;
pub mod result_formatter;
pub mod search_results;
