pub mod display;
pub mod match_bracket;
pub mod schedule;
pub mod scorers;
pub mod team_card;
pub mod tree;
