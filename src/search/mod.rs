pub mod aggregate;
pub mod fuzzy;
pub mod prefix;
pub mod results;
pub mod searcher;
pub mod snippet;
