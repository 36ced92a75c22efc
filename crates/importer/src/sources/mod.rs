pub mod api_football;
