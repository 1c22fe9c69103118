mod genre_year;
mod rankings;
mod sentiment;

pub use genre_year::{winning_user_per_genre, winning_year_per_genre};
pub use rankings::{interaction_title_table, rank_reviews};
pub use sentiment::sentiment_histogram;
