pub mod api_connection;
pub mod availability;
pub mod cli;
pub mod config;
pub mod ingredient_parser;
pub mod merge;
pub mod pantry_cache;
pub mod planner;
pub mod recipe_scorer;
pub mod sources;
pub mod substitution;
