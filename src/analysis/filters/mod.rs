pub mod lowercase;
pub mod stemmer;
